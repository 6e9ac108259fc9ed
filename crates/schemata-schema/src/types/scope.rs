//! Scopes own a table of objects; refs point into the nearest enclosing one.
//!
//! A scope keeps each object behind an [`Arc`]. A ref holds a [`Weak`]
//! handle to its target, filled in once when the scope is bound, so
//! recursive and mutually recursive objects never form a reference cycle.
//! The scope must outlive every descriptor taken out of it.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use schemata_core::error::quote_list;
use schemata_core::{BadArgumentError, ConstraintError, Value};

use super::{Candidate, CompatState, Descriptor, ObjectSchema, ObjectTable, TypeKind};
use crate::display::DisplayValue;
use crate::native::{Native, NativeKind};

/// A reference to an object of the enclosing scope.
#[derive(Debug)]
pub struct RefSchema {
    id: String,
    display: Option<DisplayValue>,
    target: OnceCell<Weak<ObjectSchema>>,
}

impl Clone for RefSchema {
    /// The copy is unbound: it resolves against whichever scope it ends up in.
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            display: self.display.clone(),
            target: OnceCell::new(),
        }
    }
}

impl RefSchema {
    /// A reference to the object with id `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: None,
            target: OnceCell::new(),
        }
    }

    /// Attach display metadata.
    pub fn with_display(mut self, display: DisplayValue) -> Self {
        self.display = Some(display);
        self
    }

    /// Id of the referenced object.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display metadata.
    pub fn display(&self) -> Option<&DisplayValue> {
        self.display.as_ref()
    }

    /// Whether the reference has been resolved.
    pub fn is_bound(&self) -> bool {
        self.target.get().is_some()
    }

    /// The referenced object.
    ///
    /// # Panics
    ///
    /// Panics if the ref was never bound, or if the scope that owned the
    /// target has been dropped. Both are programming errors.
    pub fn target(&self) -> Arc<ObjectSchema> {
        let Some(target) = self.target.get() else {
            panic!("ref to '{}' used before its scope was bound", self.id);
        };
        match target.upgrade() {
            Some(object) => object,
            None => panic!("ref to '{}' outlived the scope that owns its target", self.id),
        }
    }

    pub(crate) fn bind(&self, objects: &ObjectTable) -> Result<(), BadArgumentError> {
        let Some(object) = objects.get(&self.id) else {
            return Err(BadArgumentError::new(format!(
                "ref points to object '{}', which does not exist in its scope, expected one of: {}",
                self.id,
                quote_list(objects.keys())
            )));
        };
        // A ref shared by two scopes keeps its first binding.
        let _ = self.target.set(Arc::downgrade(object));
        Ok(())
    }
}

impl Descriptor for RefSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Ref
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Object(self.id.clone())
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        self.target().decode(data)
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        self.target().validate(value)
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.target().encode(value)
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        self.target().compatible_with(candidate, state)
    }
}

/// A self-contained graph of objects with a designated root.
#[derive(Debug, Clone)]
pub struct ScopeSchema {
    objects: ObjectTable,
    root: String,
    root_object: Arc<ObjectSchema>,
}

impl ScopeSchema {
    /// Build and bind a scope.
    ///
    /// Fails if two objects share an id, if `root` is not one of them, if a
    /// ref names a missing object, or if a default, example, interdependency
    /// or OneOf discriminator is malformed.
    pub fn new(
        root: impl Into<String>,
        objects: impl IntoIterator<Item = ObjectSchema>,
    ) -> Result<Self, BadArgumentError> {
        let root = root.into();
        let mut table = ObjectTable::new();
        for object in objects {
            let id = object.id().to_string();
            if table.insert(id.clone(), Arc::new(object)).is_some() {
                return Err(BadArgumentError::new(format!(
                    "duplicate object id '{id}' in scope"
                )));
            }
        }
        let Some(root_object) = table.get(&root).cloned() else {
            return Err(BadArgumentError::new(format!(
                "root object '{root}' is not part of the scope, expected one of: {}",
                quote_list(table.keys())
            )));
        };

        for object in table.values() {
            object.bind_refs(&table)?;
        }
        for object in table.values() {
            object.verify()?;
        }
        tracing::debug!(root = %root, objects = table.len(), "scope bound");

        Ok(Self {
            objects: table,
            root,
            root_object,
        })
    }

    /// Id of the root object.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The root object.
    pub fn root_object(&self) -> &Arc<ObjectSchema> {
        &self.root_object
    }

    /// Every object of the scope, by id.
    pub fn objects(&self) -> &BTreeMap<String, Arc<ObjectSchema>> {
        &self.objects
    }

    /// Look up one object.
    pub fn object(&self, id: &str) -> Option<&Arc<ObjectSchema>> {
        self.objects.get(id)
    }
}

impl PartialEq for ScopeSchema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.root_object, &other.root_object)
    }
}

impl Descriptor for ScopeSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Scope
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Object(self.root.clone())
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        self.root_object.decode(data)
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        self.root_object.validate(value)
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        self.root_object.encode(value)
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        self.root_object.compatible_with(candidate, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntSchema, ListSchema, PropertySchema, StringSchema, Type};

    fn tree() -> ScopeSchema {
        ScopeSchema::new(
            "Node",
            [ObjectSchema::new(
                "Node",
                [
                    ("value", PropertySchema::new(IntSchema::new()).required()),
                    ("children", PropertySchema::new(ListSchema::new(RefSchema::new("Node")))),
                ],
            )],
        )
        .unwrap()
    }

    #[test]
    fn recursive_objects_decode() {
        let data = Value::parse_json(r#"{"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]}"#).unwrap();
        let scope = tree();
        let native = scope.decode(&data).unwrap();
        assert_eq!(scope.encode(&native).unwrap(), data);

        let bad = Value::parse_json(r#"{"value": 1, "children": [{"children": []}]}"#).unwrap();
        let err = scope.decode(&bad).unwrap_err();
        assert_eq!(err.path, vec!["children", "[0]", "value"]);
    }

    #[test]
    fn dangling_refs_are_rejected() {
        let err = ScopeSchema::new(
            "A",
            [ObjectSchema::new("A", [("b", PropertySchema::new(RefSchema::new("B")))])],
        )
        .unwrap_err();
        assert!(err.message.contains("'B'"));
        assert!(err.message.contains("expected one of: 'A'"));
    }

    #[test]
    fn root_must_exist_and_ids_must_be_unique() {
        let a = || ObjectSchema::new("A", [("x", PropertySchema::new(StringSchema::new()))]);
        assert!(ScopeSchema::new("B", [a()]).is_err());
        assert!(ScopeSchema::new("A", [a(), a()]).is_err());
    }

    #[test]
    fn recursive_compatibility_terminates() {
        let same: Type = tree().into();
        assert!(tree().check_compatibility(Candidate::Type(&same)).is_ok());
    }

    #[test]
    fn cloned_refs_start_unbound() {
        let scope = tree();
        let children = scope.root_object().property("children").unwrap();
        let Type::List(list) = children.type_() else {
            panic!("expected a list");
        };
        let Type::Ref(reference) = list.items() else {
            panic!("expected a ref");
        };
        assert!(reference.is_bound());
        assert!(!reference.clone().is_bound());
    }

    #[test]
    #[should_panic(expected = "used before its scope was bound")]
    fn unbound_ref_panics() {
        let _ = RefSchema::new("X").decode(&Value::Null);
    }
}
