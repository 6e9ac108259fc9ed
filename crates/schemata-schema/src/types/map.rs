//! Maps with a restricted key descriptor and size bounds.

use std::collections::BTreeMap;

use schemata_core::{BadArgumentError, ConstraintError, Value};

use super::{check_size, kind_mismatch, wrong_data, wrong_native, Candidate, CompatState, Descriptor, Type, TypeKind};
use crate::native::{Native, NativeKind};

/// Maps with discriminant-capable keys and optional size bounds.
#[derive(Debug, Clone)]
pub struct MapSchema {
    keys: Box<Type>,
    values: Box<Type>,
    min: Option<i64>,
    max: Option<i64>,
}

fn key_at(key: impl std::fmt::Display) -> String {
    format!("{{{key}}}")
}

fn value_at(key: impl std::fmt::Display) -> String {
    format!("[{key}]")
}

impl MapSchema {
    /// A map from `keys` to `values`. Only string, integer and enum kinds
    /// may be used as keys.
    pub fn new(keys: impl Into<Type>, values: impl Into<Type>) -> Result<Self, BadArgumentError> {
        let keys = keys.into();
        if !keys.kind().is_map_key() {
            return Err(BadArgumentError::new(format!(
                "'{}' cannot be used as a map key, expected one of: {}",
                keys.kind(),
                schemata_core::error::quote_list(
                    TypeKind::ALL.into_iter().filter(|kind| kind.is_map_key())
                )
            )));
        }
        Ok(Self {
            keys: Box::new(keys),
            values: Box::new(values.into()),
            min: None,
            max: None,
        })
    }

    /// Set the minimum number of entries.
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum number of entries.
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Key descriptor.
    pub fn keys(&self) -> &Type {
        &self.keys
    }

    /// Value descriptor.
    pub fn values(&self) -> &Type {
        &self.values
    }

    /// Minimum number of entries.
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Maximum number of entries.
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    fn validate_entries<'a>(
        &self,
        entries: impl ExactSizeIterator<Item = (Native, &'a Native)>,
    ) -> Result<(), ConstraintError> {
        check_size("entries", entries.len(), self.min, self.max)?;
        for (key, value) in entries {
            self.keys.validate(&key).map_err(|e| e.at(key_at(&key)))?;
            self.values.validate(value).map_err(|e| e.at(value_at(&key)))?;
        }
        Ok(())
    }
}

impl Descriptor for MapSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Map
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Map(
            Box::new(self.keys.native_kind()),
            Box::new(self.values.native_kind()),
        )
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let Value::Map(entries) = data else {
            return Err(wrong_data("a map", data));
        };
        check_size("entries", entries.len(), self.min, self.max)?;
        let mut decoded = BTreeMap::new();
        for (key, value) in entries {
            let native_key = self.keys.decode(key).map_err(|e| e.at(key_at(key)))?;
            let native_value = self.values.decode(value).map_err(|e| e.at(value_at(key)))?;
            if decoded.insert(native_key, native_value).is_some() {
                return Err(ConstraintError::new("duplicate key after decoding").at(key_at(key)));
            }
        }
        Ok(Native::Map(decoded))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::Map(entries) => {
                self.validate_entries(entries.iter().map(|(k, v)| (k.clone(), v)))
            }
            Native::Object(fields) => self.validate_entries(
                fields.iter().map(|(k, v)| (Native::String(k.clone()), v)),
            ),
            other => Err(wrong_native("map", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.validate(value)?;
        let entries: Vec<(Native, &Native)> = match value {
            Native::Map(entries) => entries.iter().map(|(k, v)| (k.clone(), v)).collect(),
            Native::Object(fields) => fields
                .iter()
                .map(|(k, v)| (Native::String(k.clone()), v))
                .collect(),
            other => return Err(wrong_native("map", other)),
        };
        let mut encoded = BTreeMap::new();
        for (key, value) in entries {
            let data_key = self.keys.encode(&key).map_err(|e| e.at(key_at(&key)))?;
            let data_value = self.values.encode(value).map_err(|e| e.at(value_at(&key)))?;
            encoded.insert(data_key, data_value);
        }
        Ok(Value::Map(encoded))
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(Value::Map(entries)) => {
                for (key, value) in entries {
                    self.keys
                        .compatible_with(Candidate::Value(key), state)
                        .map_err(|e| e.at(key_at(key)))?;
                    self.values
                        .compatible_with(Candidate::Value(value), state)
                        .map_err(|e| e.at(value_at(key)))?;
                }
                Ok(())
            }
            Candidate::Value(other) => Err(wrong_data("a map", other)),
            Candidate::Type(Type::Map(other)) => {
                self.keys
                    .compatible_with(Candidate::Type(&other.keys), state)
                    .map_err(|e| e.at("keys"))?;
                self.values
                    .compatible_with(Candidate::Type(&other.values), state)
                    .map_err(|e| e.at("values"))
            }
            Candidate::Type(other) => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoolSchema, FloatSchema, IntSchema, StringSchema};

    fn scores() -> MapSchema {
        MapSchema::new(StringSchema::new().with_min(1), IntSchema::new().with_min(0))
            .unwrap()
            .with_max(2)
    }

    #[test]
    fn only_discriminant_kinds_are_keys() {
        assert!(MapSchema::new(IntSchema::new(), BoolSchema::new()).is_ok());
        let err = MapSchema::new(FloatSchema::new(), BoolSchema::new()).unwrap_err();
        assert!(err.message.contains("'float' cannot be used as a map key"));
    }

    #[test]
    fn decode_reports_key_and_value_paths() {
        let data: Value = [("alice", Value::Int(-1))].into_iter().collect();
        let err = scores().decode(&data).unwrap_err();
        assert_eq!(err.path, vec!["[alice]"]);

        let data: Value = [("", Value::Int(1))].into_iter().collect();
        let err = scores().decode(&data).unwrap_err();
        assert_eq!(err.path, vec!["{}"]);
    }

    #[test]
    fn size_bounds_apply() {
        let data: Value = [("a", 1_i64), ("b", 2), ("c", 3)].into_iter().collect();
        let err = scores().decode(&data).unwrap_err();
        assert_eq!(err.message, "must have at most 2 entries, 3 given");
    }

    #[test]
    fn validate_accepts_objects() {
        let native = Native::object([("alice", Native::Int(3))]);
        assert!(scores().validate(&native).is_ok());
        let encoded = scores().encode(&native).unwrap();
        assert_eq!(encoded.get("alice"), Some(&Value::Int(3)));
    }

    #[test]
    fn compatibility_checks_both_sides() {
        let other: Type = MapSchema::new(IntSchema::new(), IntSchema::new()).unwrap().into();
        let err = scores().check_compatibility(Candidate::Type(&other)).unwrap_err();
        assert_eq!(err.path, vec!["keys"]);
    }
}
