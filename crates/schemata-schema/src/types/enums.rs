//! Enumerations over a fixed set of strings or integers.
//!
//! Each admitted value carries [`DisplayValue`] metadata. Invalid input is
//! rejected with the full valid set, listed in sorted order.

use std::collections::BTreeMap;

use schemata_core::error::quote_list;
use schemata_core::{ConstraintError, Units, Value};

use super::numeric::coerce_int;
use super::string::coerce_string;
use super::{kind_mismatch, wrong_native, Candidate, CompatState, Descriptor, Type, TypeKind};
use crate::display::DisplayValue;
use crate::native::{Native, NativeKind};

fn not_in_set<K: std::fmt::Display>(given: impl std::fmt::Display, valid: impl Iterator<Item = K>) -> ConstraintError {
    ConstraintError::new(format!(
        "'{given}' is not a valid value, expected one of: {}",
        quote_list(valid)
    ))
}

fn missing_from<K: Ord + std::fmt::Display>(
    expected: &BTreeMap<K, DisplayValue>,
    candidate: &BTreeMap<K, DisplayValue>,
) -> Result<(), ConstraintError> {
    let extra: Vec<&K> = candidate.keys().filter(|k| !expected.contains_key(k)).collect();
    if extra.is_empty() {
        Ok(())
    } else {
        Err(ConstraintError::new(format!(
            "enum values {} are not accepted, expected a subset of: {}",
            quote_list(extra),
            quote_list(expected.keys())
        )))
    }
}

/// A fixed set of strings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringEnumSchema {
    values: BTreeMap<String, DisplayValue>,
}

impl StringEnumSchema {
    /// Build from `(value, display)` pairs.
    pub fn new<K: Into<String>>(values: impl IntoIterator<Item = (K, DisplayValue)>) -> Self {
        Self {
            values: values.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Admitted values and their display metadata.
    pub fn values(&self) -> &BTreeMap<String, DisplayValue> {
        &self.values
    }

    fn check(&self, value: &str) -> Result<(), ConstraintError> {
        if self.values.contains_key(value) {
            Ok(())
        } else {
            Err(not_in_set(value, self.values.keys()))
        }
    }
}

impl Descriptor for StringEnumSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::StringEnum
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::String
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let value = coerce_string(data)?;
        self.check(&value)?;
        Ok(Native::String(value))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::String(s) => self.check(s),
            other => Err(wrong_native("string", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.validate(value)?;
        match value {
            Native::String(s) => Ok(Value::String(s.clone())),
            other => Err(wrong_native("string", other)),
        }
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(data) => self.decode(data).map(|_| ()),
            Candidate::Type(Type::StringEnum(other)) => missing_from(&self.values, &other.values),
            Candidate::Type(other) => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

/// A fixed set of integers, optionally parsed and shown with units.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntEnumSchema {
    values: BTreeMap<i64, DisplayValue>,
    units: Option<Units>,
}

impl IntEnumSchema {
    /// Build from `(value, display)` pairs.
    pub fn new(values: impl IntoIterator<Item = (i64, DisplayValue)>) -> Self {
        Self {
            values: values.into_iter().collect(),
            units: None,
        }
    }

    /// Parse string input with a unit table.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Admitted values and their display metadata.
    pub fn values(&self) -> &BTreeMap<i64, DisplayValue> {
        &self.values
    }

    /// Unit table, if any.
    pub fn units(&self) -> Option<&Units> {
        self.units.as_ref()
    }

    fn check(&self, value: i64) -> Result<(), ConstraintError> {
        if self.values.contains_key(&value) {
            Ok(())
        } else {
            Err(not_in_set(value, self.values.keys()))
        }
    }
}

impl Descriptor for IntEnumSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::IntEnum
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Int
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let value = coerce_int(data, self.units.as_ref())?;
        self.check(value)?;
        Ok(Native::Int(value))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::Int(i) => self.check(*i),
            other => Err(wrong_native("integer", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.validate(value)?;
        match value {
            Native::Int(i) => Ok(Value::Int(*i)),
            other => Err(wrong_native("integer", other)),
        }
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(data) => self.decode(data).map(|_| ()),
            Candidate::Type(Type::IntEnum(other)) => missing_from(&self.values, &other.values),
            Candidate::Type(other) => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}
