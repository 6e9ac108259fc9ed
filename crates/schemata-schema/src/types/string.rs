//! Strings with length and pattern bounds, and compiled regular
//! expressions.

use schemata_core::{ConstraintError, Value};

use super::{check_size, scalar_compatibility, wrong_data, wrong_native, Candidate, CompatState, Descriptor, TypeKind};
use crate::native::{Native, NativeKind, Pattern};

/// Coerce scalar data into a string. Numbers and bools are stringified.
pub(crate) fn coerce_string(data: &Value) -> Result<String, ConstraintError> {
    match data {
        Value::String(s) => Ok(s.clone()),
        Value::Int(_) | Value::Uint(_) | Value::Float(_) | Value::Bool(_) => Ok(data.to_string()),
        other => Err(wrong_data("a string", other)),
    }
}

/// Strings with optional length bounds and an optional pattern.
///
/// Lengths count Unicode scalar values, not bytes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringSchema {
    min: Option<i64>,
    max: Option<i64>,
    pattern: Option<Pattern>,
}

impl StringSchema {
    /// An unconstrained string.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum length.
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum length.
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Require the string to match a pattern.
    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Minimum length.
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Maximum length.
    pub fn max(&self) -> Option<i64> {
        self.max
    }

    /// Required pattern.
    pub fn pattern(&self) -> Option<&Pattern> {
        self.pattern.as_ref()
    }

    fn check(&self, value: &str) -> Result<(), ConstraintError> {
        check_size("characters", value.chars().count(), self.min, self.max)?;
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(ConstraintError::new(format!(
                    "must match the pattern '{pattern}'"
                )));
            }
        }
        Ok(())
    }
}

impl Descriptor for StringSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::String
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
        scalar_compatibility(self, candidate, &[TypeKind::String, TypeKind::StringEnum])
    }
}

/// Regular expressions, compiled on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternSchema;

impl PatternSchema {
    /// Create a pattern descriptor.
    pub fn new() -> Self {
        Self
    }
}

impl Descriptor for PatternSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Pattern
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Pattern
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let source = match data {
            Value::String(s) => s,
            other => return Err(wrong_data("a regular expression string", other)),
        };
        Pattern::new(source).map(Native::Pattern).map_err(|e| {
            ConstraintError::new(format!("'{source}' is not a valid regular expression")).with_cause(e)
        })
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        match value {
            Native::Pattern(_) => Ok(()),
            other => Err(wrong_native("pattern", other)),
        }
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        match value {
            Native::Pattern(pattern) => Ok(Value::String(pattern.as_str().to_string())),
            other => Err(wrong_native("pattern", other)),
        }
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        scalar_compatibility(self, candidate, &[TypeKind::Pattern])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::DisplayValue;
    use crate::types::{StringEnumSchema, Type};

    #[test]
    fn scalars_are_stringified() {
        let schema = StringSchema::new();
        assert_eq!(schema.decode(&Value::Int(5)).unwrap(), Native::String("5".into()));
        assert_eq!(schema.decode(&Value::Bool(true)).unwrap(), Native::String("true".into()));
        assert!(schema.decode(&Value::List(vec![])).is_err());
        assert!(schema.decode(&Value::Null).is_err());
    }

    #[test]
    fn length_counts_characters() {
        let schema = StringSchema::new().with_min(2).with_max(3);
        assert!(schema.decode(&Value::from("é")).is_err());
        assert!(schema.decode(&Value::from("éé")).is_ok());
        assert!(schema.decode(&Value::from("éééé")).is_err());
        let err = schema.decode(&Value::from("a")).unwrap_err();
        assert_eq!(err.message, "must have at least 2 characters, 1 given");
    }

    #[test]
    fn pattern_constraint() {
        let schema = StringSchema::new().with_pattern(Pattern::new("^[a-z]+$").unwrap());
        assert!(schema.decode(&Value::from("abc")).is_ok());
        let err = schema.decode(&Value::from("ABC")).unwrap_err();
        assert!(err.message.starts_with("must match the pattern"));
        assert!(schema.encode(&Native::String("ABC".into())).is_err());
    }

    #[test]
    fn patterns_compile_on_decode() {
        let schema = PatternSchema::new();
        let native = schema.decode(&Value::from("^a.c$")).unwrap();
        assert!(matches!(&native, Native::Pattern(p) if p.is_match("abc")));
        assert_eq!(schema.encode(&native).unwrap(), Value::from("^a.c$"));
        let err = schema.decode(&Value::from("(")).unwrap_err();
        assert!(err.cause.is_some());
        assert!(schema.validate(&Native::String("x".into())).is_err());
    }

    #[test]
    fn string_accepts_string_enum_candidates() {
        let schema = StringSchema::new();
        let candidate: Type = StringEnumSchema::new([("a", DisplayValue::named("A"))]).into();
        assert!(schema.check_compatibility(Candidate::Type(&candidate)).is_ok());
        let pattern: Type = PatternSchema::new().into();
        assert!(schema.check_compatibility(Candidate::Type(&pattern)).is_err());
    }
}
