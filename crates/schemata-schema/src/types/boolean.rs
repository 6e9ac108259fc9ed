//! Booleans, decoded from the usual human spellings.

use schemata_core::{ConstraintError, Value};

use super::{scalar_compatibility, wrong_data, wrong_native, Candidate, CompatState, Descriptor, TypeKind};
use crate::native::{Native, NativeKind};

const TRUTHY: [&str; 7] = ["1", "yes", "y", "on", "true", "enable", "enabled"];
const FALSY: [&str; 7] = ["0", "no", "n", "off", "false", "disable", "disabled"];

/// Booleans, accepting the usual human spellings on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoolSchema;

impl BoolSchema {
    /// Create a bool descriptor.
    pub fn new() -> Self {
        Self
    }
}

fn invalid(shown: &str) -> ConstraintError {
    let mut valid: Vec<&str> = TRUTHY.iter().chain(FALSY.iter()).copied().collect();
    valid.sort_unstable();
    ConstraintError::new(format!(
        "'{shown}' is not a valid boolean value, expected one of: {}",
        schemata_core::error::quote_list(valid)
    ))
}

impl Descriptor for BoolSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Bool
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Bool
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let decoded = match data {
            Value::Bool(b) => *b,
            Value::Int(0) | Value::Uint(0) => false,
            Value::Int(1) | Value::Uint(1) => true,
            Value::Float(x) if *x == 0.0 => false,
            Value::Float(x) if *x == 1.0 => true,
            Value::Int(_) | Value::Uint(_) | Value::Float(_) => return Err(invalid(&data.to_string())),
            Value::String(s) => {
                let normalized = s.trim().to_lowercase();
                if TRUTHY.contains(&normalized.as_str()) {
                    true
                } else if FALSY.contains(&normalized.as_str()) {
                    false
                } else {
                    return Err(invalid(s));
                }
            }
            other => return Err(wrong_data("a boolean", other)),
        };
        Ok(Native::Bool(decoded))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::Bool(_) => Ok(()),
            other => Err(wrong_native("bool", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        match value {
            Native::Bool(b) => Ok(Value::Bool(*b)),
            other => Err(wrong_native("bool", other)),
        }
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        scalar_compatibility(self, candidate, &[TypeKind::Bool])
    }
}
