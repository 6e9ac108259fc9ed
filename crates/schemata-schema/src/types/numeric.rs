//! Integer and float descriptors.
//!
//! Both accept any integer, float, bool or string representation and
//! normalize to 64 bits. Values that do not fit are rejected at decode time,
//! never truncated. Strings go through the descriptor's [`Units`] table when
//! one is set, so `"1kB"` decodes to `1024`.

use schemata_core::{ConstraintError, Units, Value};

use super::{scalar_compatibility, wrong_data, wrong_native, Candidate, CompatState, Descriptor, TypeKind};
use crate::native::{Native, NativeKind};

/// Coerce generic data into an `i64`.
pub(crate) fn coerce_int(data: &Value, units: Option<&Units>) -> Result<i64, ConstraintError> {
    match data {
        Value::Int(i) => Ok(*i),
        Value::Uint(u) => Err(ConstraintError::new(format!(
            "{u} is out of range for a 64-bit signed integer"
        ))),
        Value::Float(x) => {
            if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x <= i64::MAX as f64 {
                Ok(*x as i64)
            } else {
                Err(ConstraintError::new(format!(
                    "{x} cannot be represented as a 64-bit integer"
                )))
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => match units {
            Some(units) => units.parse_int(s).map_err(|e| {
                ConstraintError::new(format!("'{s}' is not a valid integer")).with_cause(e)
            }),
            None => s.trim().parse::<i64>().map_err(|e| {
                ConstraintError::new(format!("'{s}' is not a valid integer")).with_cause(e)
            }),
        },
        other => Err(wrong_data("an integer", other)),
    }
}

/// Coerce generic data into an `f64`.
pub(crate) fn coerce_float(data: &Value, units: Option<&Units>) -> Result<f64, ConstraintError> {
    match data {
        Value::Int(i) => Ok(*i as f64),
        Value::Uint(u) => Ok(*u as f64),
        Value::Float(x) => Ok(*x),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => match units {
            Some(units) => units.parse_float(s).map_err(|e| {
                ConstraintError::new(format!("'{s}' is not a valid number")).with_cause(e)
            }),
            None => s.trim().parse::<f64>().map_err(|e| {
                ConstraintError::new(format!("'{s}' is not a valid number")).with_cause(e)
            }),
        },
        other => Err(wrong_data("a number", other)),
    }
}

/// 64-bit signed integers with optional inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntSchema {
    min: Option<i64>,
    max: Option<i64>,
    units: Option<Units>,
}

impl IntSchema {
    /// An unbounded integer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive lower bound.
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound.
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Parse and display amounts with a unit table.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// Unit table, if any.
    pub fn units(&self) -> Option<&Units> {
        self.units.as_ref()
    }

    fn show(&self, amount: i64) -> String {
        match &self.units {
            Some(units) => units.format_short_int(amount),
            None => amount.to_string(),
        }
    }

    fn check(&self, value: i64) -> Result<(), ConstraintError> {
        if let Some(min) = self.min {
            if value < min {
                return Err(ConstraintError::new(format!(
                    "must be at least {}, {} given",
                    self.show(min),
                    self.show(value)
                )));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(ConstraintError::new(format!(
                    "must be at most {}, {} given",
                    self.show(max),
                    self.show(value)
                )));
            }
        }
        Ok(())
    }
}

impl Descriptor for IntSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Int
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
        scalar_compatibility(self, candidate, &[TypeKind::Int, TypeKind::IntEnum])
    }
}

/// 64-bit floats with optional inclusive bounds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloatSchema {
    min: Option<f64>,
    max: Option<f64>,
    units: Option<Units>,
}

impl FloatSchema {
    /// An unbounded float.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive lower bound.
    pub fn with_min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the inclusive upper bound.
    pub fn with_max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Parse and display amounts with a unit table.
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = Some(units);
        self
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Inclusive upper bound.
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Unit table, if any.
    pub fn units(&self) -> Option<&Units> {
        self.units.as_ref()
    }

    fn show(&self, amount: f64) -> String {
        match &self.units {
            Some(units) => units.format_short_float(amount),
            None => amount.to_string(),
        }
    }

    fn check(&self, value: f64) -> Result<(), ConstraintError> {
        if let Some(min) = self.min {
            if value < min {
                return Err(ConstraintError::new(format!(
                    "must be at least {}, {} given",
                    self.show(min),
                    self.show(value)
                )));
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return Err(ConstraintError::new(format!(
                    "must be at most {}, {} given",
                    self.show(max),
                    self.show(value)
                )));
            }
        }
        Ok(())
    }
}

impl Descriptor for FloatSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Float
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Float
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let value = coerce_float(data, self.units.as_ref())?;
        self.check(value)?;
        Ok(Native::Float(value))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::Float(x) => self.check(*x),
            other => Err(wrong_native("float", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.validate(value)?;
        match value {
            Native::Float(x) => Ok(Value::Float(*x)),
            other => Err(wrong_native("float", other)),
        }
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        scalar_compatibility(self, candidate, &[TypeKind::Float])
    }
}
