//! Lists of one item descriptor with length bounds.

use schemata_core::{ConstraintError, Value};

use super::{check_size, kind_mismatch, wrong_data, wrong_native, Candidate, CompatState, Descriptor, Type, TypeKind};
use crate::native::{Native, NativeKind};

/// Homogeneous lists with optional size bounds.
#[derive(Debug, Clone)]
pub struct ListSchema {
    items: Box<Type>,
    min: Option<i64>,
    max: Option<i64>,
}

impl ListSchema {
    /// A list of `items`.
    pub fn new(items: impl Into<Type>) -> Self {
        Self {
            items: Box::new(items.into()),
            min: None,
            max: None,
        }
    }

    /// Set the minimum number of items.
    pub fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Set the maximum number of items.
    pub fn with_max(mut self, max: i64) -> Self {
        self.max = Some(max);
        self
    }

    /// Item descriptor.
    pub fn items(&self) -> &Type {
        &self.items
    }

    /// Minimum number of items.
    pub fn min(&self) -> Option<i64> {
        self.min
    }

    /// Maximum number of items.
    pub fn max(&self) -> Option<i64> {
        self.max
    }
}

fn item_at(index: usize) -> String {
    format!("[{index}]")
}

impl Descriptor for ListSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::List
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::List(Box::new(self.items.native_kind()))
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let Value::List(items) = data else {
            return Err(wrong_data("a list", data));
        };
        check_size("items", items.len(), self.min, self.max)?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.items.decode(item).map_err(|e| e.at(item_at(i))))
            .collect::<Result<Vec<_>, _>>()
            .map(Native::List)
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        let Native::List(items) = value else {
            return Err(wrong_native("list", value));
        };
        check_size("items", items.len(), self.min, self.max)?;
        for (i, item) in items.iter().enumerate() {
            self.items.validate(item).map_err(|e| e.at(item_at(i)))?;
        }
        Ok(())
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        let Native::List(items) = value else {
            return Err(wrong_native("list", value));
        };
        check_size("items", items.len(), self.min, self.max)?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| self.items.encode(item).map_err(|e| e.at(item_at(i))))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List)
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.items
                        .compatible_with(Candidate::Value(item), state)
                        .map_err(|e| e.at(item_at(i)))?;
                }
                Ok(())
            }
            Candidate::Value(other) => Err(wrong_data("a list", other)),
            Candidate::Type(Type::List(other)) => self
                .items
                .compatible_with(Candidate::Type(&other.items), state)
                .map_err(|e| e.at("items")),
            Candidate::Type(other) => Err(kind_mismatch(self.kind(), other.kind())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntSchema, StringSchema};

    fn ints() -> ListSchema {
        ListSchema::new(IntSchema::new().with_max(10)).with_min(1)
    }

    #[test]
    fn decodes_items_in_order() {
        let data = Value::List(vec![Value::Int(1), Value::from("2")]);
        assert_eq!(
            ints().decode(&data).unwrap(),
            Native::List(vec![Native::Int(1), Native::Int(2)])
        );
    }

    #[test]
    fn item_errors_carry_their_index() {
        let data = Value::List(vec![Value::Int(1), Value::Int(11)]);
        let err = ints().decode(&data).unwrap_err();
        assert_eq!(err.path, vec!["[1]"]);
        let err = ints().encode(&Native::List(vec![Native::Int(20)])).unwrap_err();
        assert_eq!(err.path, vec!["[0]"]);
    }

    #[test]
    fn size_bounds_apply() {
        assert!(ints().decode(&Value::List(vec![])).is_err());
        assert!(ints().validate(&Native::List(vec![])).is_err());
        assert!(ints().decode(&Value::from("1")).is_err());
    }

    #[test]
    fn compatibility_recurses_into_items() {
        let same: Type = ListSchema::new(IntSchema::new()).into();
        assert!(ints().check_compatibility(Candidate::Type(&same)).is_ok());
        let strings: Type = ListSchema::new(StringSchema::new()).into();
        let err = ints().check_compatibility(Candidate::Type(&strings)).unwrap_err();
        assert_eq!(err.path, vec!["items"]);
        let data = Value::List(vec![Value::Int(1), Value::from("x")]);
        assert!(ints().check_compatibility(Candidate::Value(&data)).is_err());
    }
}
