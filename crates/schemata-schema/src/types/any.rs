//! The untyped descriptor: scalars, lists and maps passed through as they
//! are, with a homogeneity rule for compatibility checks.

use std::collections::BTreeMap;

use schemata_core::{ConstraintError, Value};

use super::{wrong_data, wrong_native, Candidate, CompatState, Descriptor, TypeKind};
use crate::native::{Native, NativeKind};

/// Any scalar, list or map, passed through without coercion.
///
/// Null, compiled patterns and records are not admitted. Data checked for
/// compatibility must be homogeneous: every item of a list, and every key
/// and every value of a map, must have the same shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnySchema;

impl AnySchema {
    /// Create an any descriptor.
    pub fn new() -> Self {
        Self
    }
}

fn out_of_range(u: u64) -> ConstraintError {
    ConstraintError::new(format!("{u} is out of range for a 64-bit signed integer"))
}

fn to_native(data: &Value) -> Result<Native, ConstraintError> {
    match data {
        Value::Null => Err(wrong_data("a non-null value", data)),
        Value::Bool(b) => Ok(Native::Bool(*b)),
        Value::Int(i) => Ok(Native::Int(*i)),
        Value::Uint(u) => Err(out_of_range(*u)),
        Value::Float(x) => Ok(Native::Float(*x)),
        Value::String(s) => Ok(Native::String(s.clone())),
        Value::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| to_native(item).map_err(|e| e.at(format!("[{i}]"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Native::List),
        Value::Map(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                let native_key = to_native(key).map_err(|e| e.at(format!("{{{key}}}")))?;
                let native_value = to_native(value).map_err(|e| e.at(format!("[{key}]")))?;
                map.insert(native_key, native_value);
            }
            Ok(Native::Map(map))
        }
    }
}

fn to_value(native: &Native) -> Result<Value, ConstraintError> {
    match native {
        Native::Bool(b) => Ok(Value::Bool(*b)),
        Native::Int(i) => Ok(Value::Int(*i)),
        Native::Float(x) => Ok(Value::Float(*x)),
        Native::String(s) => Ok(Value::String(s.clone())),
        Native::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| to_value(item).map_err(|e| e.at(format!("[{i}]"))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Native::Map(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                let data_key = to_value(key).map_err(|e| e.at(format!("{{{key}}}")))?;
                let data_value = to_value(value).map_err(|e| e.at(format!("[{key}]")))?;
                map.insert(data_key, data_value);
            }
            Ok(Value::Map(map))
        }
        other => Err(wrong_native("scalar, list or map", other)),
    }
}

/// The inferred shape of a piece of data. Empty containers leave their
/// element shape open.
#[derive(Debug, Clone, PartialEq)]
enum Shape {
    Bool,
    Int,
    Float,
    String,
    List(Option<Box<Shape>>),
    Map(Option<Box<(Shape, Shape)>>),
}

impl Shape {
    fn name(&self) -> String {
        match self {
            Shape::Bool => "bool".into(),
            Shape::Int => "integer".into(),
            Shape::Float => "float".into(),
            Shape::String => "string".into(),
            Shape::List(None) => "list".into(),
            Shape::List(Some(item)) => format!("list[{}]", item.name()),
            Shape::Map(None) => "map".into(),
            Shape::Map(Some(entry)) => format!("map[{}]{}", entry.0.name(), entry.1.name()),
        }
    }

    fn infer(data: &Value) -> Result<Shape, ConstraintError> {
        match data {
            Value::Null => Err(wrong_data("a non-null value", data)),
            Value::Bool(_) => Ok(Shape::Bool),
            Value::Int(_) => Ok(Shape::Int),
            Value::Uint(u) => Err(out_of_range(*u)),
            Value::Float(_) => Ok(Shape::Float),
            Value::String(_) => Ok(Shape::String),
            Value::List(items) => {
                let mut item_shape: Option<Shape> = None;
                for (i, item) in items.iter().enumerate() {
                    let shape = Shape::infer(item).map_err(|e| e.at(format!("[{i}]")))?;
                    item_shape = Some(match item_shape {
                        None => shape,
                        Some(seen) => seen
                            .unify(shape, "list items")
                            .map_err(|e| e.at(format!("[{i}]")))?,
                    });
                }
                Ok(Shape::List(item_shape.map(Box::new)))
            }
            Value::Map(entries) => {
                let mut entry_shape: Option<(Shape, Shape)> = None;
                for (key, value) in entries {
                    let key_shape = Shape::infer(key).map_err(|e| e.at(format!("{{{key}}}")))?;
                    let value_shape = Shape::infer(value).map_err(|e| e.at(format!("[{key}]")))?;
                    entry_shape = Some(match entry_shape {
                        None => (key_shape, value_shape),
                        Some((seen_key, seen_value)) => (
                            seen_key
                                .unify(key_shape, "map keys")
                                .map_err(|e| e.at(format!("{{{key}}}")))?,
                            seen_value
                                .unify(value_shape, "map values")
                                .map_err(|e| e.at(format!("[{key}]")))?,
                        ),
                    });
                }
                Ok(Shape::Map(entry_shape.map(Box::new)))
            }
        }
    }

    /// Merge two shapes seen in the same container, filling in open
    /// element shapes of empty containers.
    fn unify(self, other: Shape, what: &str) -> Result<Shape, ConstraintError> {
        match (self, other) {
            (Shape::List(None), Shape::List(item)) | (Shape::List(item), Shape::List(None)) => {
                Ok(Shape::List(item))
            }
            (Shape::List(Some(a)), Shape::List(Some(b))) => {
                Ok(Shape::List(Some(Box::new(a.unify(*b, "list items")?))))
            }
            (Shape::Map(None), Shape::Map(entry)) | (Shape::Map(entry), Shape::Map(None)) => {
                Ok(Shape::Map(entry))
            }
            (Shape::Map(Some(a)), Shape::Map(Some(b))) => {
                let (a_key, a_value) = *a;
                let (b_key, b_value) = *b;
                Ok(Shape::Map(Some(Box::new((
                    a_key.unify(b_key, "map keys")?,
                    a_value.unify(b_value, "map values")?,
                )))))
            }
            (a, b) if a == b => Ok(a),
            (a, b) => Err(ConstraintError::new(format!(
                "{what} are not homogeneous: found '{}' and '{}'",
                a.name(),
                b.name()
            ))),
        }
    }
}

impl Descriptor for AnySchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Any
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Any
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        to_native(data)
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        to_value(value).map(|_| ())
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        to_value(value)
    }

    fn compatible_with(&self, candidate: Candidate<'_>, _: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(data) => Shape::infer(data).map(|_| ()),
            Candidate::Type(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntSchema, Type};

    fn check(data: Value) -> Result<(), ConstraintError> {
        AnySchema::new().check_compatibility(Candidate::Value(&data))
    }

    #[test]
    fn passes_scalars_and_containers_through() {
        let data = Value::parse_json(r#"{"a": [1, 2], "b": {"c": true}}"#).unwrap();
        let native = AnySchema::new().decode(&data).unwrap();
        assert_eq!(AnySchema::new().encode(&native).unwrap(), data);
    }

    #[test]
    fn rejects_null_patterns_and_records() {
        assert!(AnySchema::new().decode(&Value::Null).is_err());
        let err = AnySchema::new()
            .decode(&Value::List(vec![Value::Int(1), Value::Null]))
            .unwrap_err();
        assert_eq!(err.path, vec!["[1]"]);
        assert!(AnySchema::new().validate(&Native::object([("a", Native::Int(1))])).is_err());
    }

    #[test]
    fn unsigned_overflow_is_incompatible() {
        let data = Value::List(vec![Value::Uint(u64::MAX)]);
        let err = check(data.clone()).unwrap_err();
        assert_eq!(err.path, vec!["[0]"]);
        assert!(err.message.contains("out of range"), "{err}");
        assert!(AnySchema::new().decode(&data).is_err());
    }

    #[test]
    fn heterogeneous_lists_are_incompatible() {
        let err = check(Value::List(vec![Value::Int(1), Value::from("x")])).unwrap_err();
        assert_eq!(
            err.message,
            "list items are not homogeneous: found 'integer' and 'string'"
        );
        assert_eq!(err.path, vec!["[1]"]);
        assert!(check(Value::List(vec![Value::Int(1), Value::Int(2)])).is_ok());
    }

    #[test]
    fn empty_containers_unify_with_anything_of_their_kind() {
        let data = Value::parse_json(r#"[[], [1], []]"#).unwrap();
        assert!(check(data).is_ok());
        let data = Value::parse_json(r#"[{}, {"a": 1}, {"b": "x"}]"#).unwrap();
        let err = check(data).unwrap_err();
        assert!(err.message.starts_with("map values are not homogeneous"));
    }

    #[test]
    fn descriptors_are_always_compatible() {
        let int: Type = IntSchema::new().into();
        assert!(AnySchema::new().check_compatibility(Candidate::Type(&int)).is_ok());
    }
}
