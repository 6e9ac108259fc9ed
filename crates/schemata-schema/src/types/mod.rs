//! # Descriptor Contract
//!
//! [`Type`] is the closed algebra of descriptors. Each variant wraps one
//! concrete schema struct, and every struct implements [`Descriptor`]:
//!
//! | Operation | Direction | Failure |
//! |---|---|---|
//! | `decode` | [`Value`] → [`Native`] | [`ConstraintError`] |
//! | `validate` | [`Native`] | [`ConstraintError`] |
//! | `encode` | [`Native`] → [`Value`] | [`ConstraintError`] |
//! | `check_compatibility` | [`Candidate`] | [`ConstraintError`] |
//!
//! For any value `x` that decodes successfully, `encode(decode(x))` gives
//! back `x` up to canonical numeric widening and coercion of scalar formats.
//!
//! ## Binding
//!
//! Descriptors are plain data until a [`ScopeSchema`] binds them. Binding is
//! two passes over the graph: [`Type::bind_refs`] resolves every
//! [`RefSchema`] against the nearest enclosing scope, then [`Type::verify`]
//! checks defaults, interdependency targets and OneOf discriminators, which
//! may themselves need resolved references. Nested scopes bind themselves
//! when they are constructed and are skipped by the outer walk.

mod any;
mod boolean;
mod enums;
mod list;
mod map;
mod numeric;
mod object;
mod oneof;
mod property;
mod scope;
mod string;

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Deref;
use std::sync::Arc;

use schemata_core::{BadArgumentError, ConstraintError, Value};

use crate::native::{Native, NativeKind};

pub use any::AnySchema;
pub use boolean::BoolSchema;
pub use enums::{IntEnumSchema, StringEnumSchema};
pub use list::ListSchema;
pub use map::MapSchema;
pub use numeric::{FloatSchema, IntSchema};
pub use object::ObjectSchema;
pub use oneof::{DiscriminatorKey, OneOfIntSchema, OneOfSchema, OneOfStringSchema, DEFAULT_DISCRIMINATOR};
pub use property::PropertySchema;
pub use scope::{RefSchema, ScopeSchema};
pub use string::{PatternSchema, StringSchema};

/// Objects of one scope, indexed by id.
pub type ObjectTable = BTreeMap<String, Arc<ObjectSchema>>;

/// The kind tag of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TypeKind {
    /// [`BoolSchema`]
    Bool,
    /// [`IntSchema`]
    Int,
    /// [`FloatSchema`]
    Float,
    /// [`StringSchema`]
    String,
    /// [`PatternSchema`]
    Pattern,
    /// [`StringEnumSchema`]
    StringEnum,
    /// [`IntEnumSchema`]
    IntEnum,
    /// [`ListSchema`]
    List,
    /// [`MapSchema`]
    Map,
    /// [`ObjectSchema`]
    Object,
    /// [`RefSchema`]
    Ref,
    /// [`ScopeSchema`]
    Scope,
    /// [`OneOfStringSchema`]
    OneOfString,
    /// [`OneOfIntSchema`]
    OneOfInt,
    /// [`AnySchema`]
    Any,
}

impl TypeKind {
    /// Every kind, in declaration order.
    pub const ALL: [TypeKind; 15] = [
        TypeKind::Bool,
        TypeKind::Int,
        TypeKind::Float,
        TypeKind::String,
        TypeKind::Pattern,
        TypeKind::StringEnum,
        TypeKind::IntEnum,
        TypeKind::List,
        TypeKind::Map,
        TypeKind::Object,
        TypeKind::Ref,
        TypeKind::Scope,
        TypeKind::OneOfString,
        TypeKind::OneOfInt,
        TypeKind::Any,
    ];

    /// The value of the `type_id` discriminator in serialized schemas.
    pub fn type_id(self) -> &'static str {
        match self {
            TypeKind::Bool => "bool",
            TypeKind::Int => "integer",
            TypeKind::Float => "float",
            TypeKind::String => "string",
            TypeKind::Pattern => "pattern",
            TypeKind::StringEnum => "enum_string",
            TypeKind::IntEnum => "enum_integer",
            TypeKind::List => "list",
            TypeKind::Map => "map",
            TypeKind::Object => "object",
            TypeKind::Ref => "ref",
            TypeKind::Scope => "scope",
            TypeKind::OneOfString => "one_of_string",
            TypeKind::OneOfInt => "one_of_int",
            TypeKind::Any => "any",
        }
    }

    /// Look a kind up by its `type_id`.
    pub fn from_type_id(type_id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_id() == type_id)
    }

    /// Kinds allowed as map keys.
    pub fn is_map_key(self) -> bool {
        matches!(
            self,
            TypeKind::String | TypeKind::Int | TypeKind::StringEnum | TypeKind::IntEnum
        )
    }

    /// Kinds that stand for an object.
    pub fn is_object_like(self) -> bool {
        matches!(self, TypeKind::Object | TypeKind::Ref | TypeKind::Scope)
    }
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_id())
    }
}

/// What a compatibility check compares against: literal data or another
/// descriptor.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    /// Literal data that would be fed to `decode`.
    Value(&'a Value),
    /// A descriptor whose values would be fed to this one.
    Type(&'a Type),
}

/// Object-id pairs already under comparison. Recursive schemas compare
/// coinductively: a pair seen again is assumed compatible.
#[derive(Debug, Default)]
pub struct CompatState {
    in_progress: BTreeSet<(String, String)>,
}

impl CompatState {
    /// Returns false if the pair was already being compared.
    pub(crate) fn enter(&mut self, expected: &str, candidate: &str) -> bool {
        self.in_progress
            .insert((expected.to_string(), candidate.to_string()))
    }
}

/// The four-operation contract every descriptor fulfils.
pub trait Descriptor {
    /// The kind tag.
    fn kind(&self) -> TypeKind;

    /// The native shape `decode` produces.
    fn native_kind(&self) -> NativeKind;

    /// Convert generic data into a native value, coercing formats and
    /// validating the result.
    fn decode(&self, data: &Value) -> Result<Native, ConstraintError>;

    /// Check a native value against this descriptor.
    fn validate(&self, value: &Native) -> Result<(), ConstraintError>;

    /// Validate a native value and convert it into generic data.
    fn encode(&self, value: &Native) -> Result<Value, ConstraintError>;

    /// Compatibility check with a fresh cycle guard.
    fn check_compatibility(&self, candidate: Candidate<'_>) -> Result<(), ConstraintError> {
        self.compatible_with(candidate, &mut CompatState::default())
    }

    /// Compatibility check sharing a cycle guard with the caller.
    fn compatible_with(
        &self,
        candidate: Candidate<'_>,
        state: &mut CompatState,
    ) -> Result<(), ConstraintError>;
}

/// A descriptor of any kind.
#[derive(Debug, Clone)]
pub enum Type {
    /// Boolean.
    Bool(BoolSchema),
    /// 64-bit integer.
    Int(IntSchema),
    /// 64-bit float.
    Float(FloatSchema),
    /// String.
    String(StringSchema),
    /// Regular expression.
    Pattern(PatternSchema),
    /// Fixed set of strings.
    StringEnum(StringEnumSchema),
    /// Fixed set of integers.
    IntEnum(IntEnumSchema),
    /// List.
    List(ListSchema),
    /// Map.
    Map(MapSchema),
    /// Inline object.
    Object(ObjectSchema),
    /// Reference to an object of the enclosing scope.
    Ref(RefSchema),
    /// Nested scope.
    Scope(ScopeSchema),
    /// Union selected by a string discriminator.
    OneOfString(OneOfStringSchema),
    /// Union selected by an integer discriminator.
    OneOfInt(OneOfIntSchema),
    /// Any scalar, list or map.
    Any(AnySchema),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $body:expr) => {
        match $self {
            Type::Bool($inner) => $body,
            Type::Int($inner) => $body,
            Type::Float($inner) => $body,
            Type::String($inner) => $body,
            Type::Pattern($inner) => $body,
            Type::StringEnum($inner) => $body,
            Type::IntEnum($inner) => $body,
            Type::List($inner) => $body,
            Type::Map($inner) => $body,
            Type::Object($inner) => $body,
            Type::Ref($inner) => $body,
            Type::Scope($inner) => $body,
            Type::OneOfString($inner) => $body,
            Type::OneOfInt($inner) => $body,
            Type::Any($inner) => $body,
        }
    };
}

impl Descriptor for Type {
    fn kind(&self) -> TypeKind {
        dispatch!(self, inner => inner.kind())
    }

    fn native_kind(&self) -> NativeKind {
        dispatch!(self, inner => inner.native_kind())
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        dispatch!(self, inner => inner.decode(data))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        dispatch!(self, inner => inner.validate(value))
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        dispatch!(self, inner => inner.encode(value))
    }

    fn compatible_with(
        &self,
        candidate: Candidate<'_>,
        state: &mut CompatState,
    ) -> Result<(), ConstraintError> {
        dispatch!(self, inner => inner.compatible_with(candidate, state))
    }
}

impl Type {
    /// The object this descriptor stands for, resolving refs and scopes.
    pub fn object(&self) -> Option<ObjectHandle<'_>> {
        match self {
            Type::Object(object) => Some(ObjectHandle::Borrowed(object)),
            Type::Ref(reference) => Some(ObjectHandle::Shared(reference.target())),
            Type::Scope(scope) => Some(ObjectHandle::Shared(Arc::clone(scope.root_object()))),
            _ => None,
        }
    }

    /// Resolve every reference reachable without crossing a nested scope.
    pub(crate) fn bind_refs(&self, objects: &ObjectTable) -> Result<(), BadArgumentError> {
        match self {
            Type::List(list) => list.items().bind_refs(objects),
            Type::Map(map) => {
                map.keys().bind_refs(objects)?;
                map.values().bind_refs(objects)
            }
            Type::Object(object) => object.bind_refs(objects),
            Type::Ref(reference) => reference.bind(objects),
            Type::OneOfString(one_of) => one_of.bind_refs(objects),
            Type::OneOfInt(one_of) => one_of.bind_refs(objects),
            _ => Ok(()),
        }
    }

    /// Check construction-time invariants that need resolved references.
    pub(crate) fn verify(&self) -> Result<(), BadArgumentError> {
        match self {
            Type::List(list) => list.items().verify(),
            Type::Map(map) => {
                map.keys().verify()?;
                map.values().verify()
            }
            Type::Object(object) => object.verify(),
            Type::OneOfString(one_of) => one_of.verify(),
            Type::OneOfInt(one_of) => one_of.verify(),
            _ => Ok(()),
        }
    }
}

/// An object reached through a descriptor: borrowed for inline objects,
/// shared for objects owned by a scope.
#[derive(Debug, Clone)]
pub enum ObjectHandle<'a> {
    /// Inline object owned by the descriptor tree.
    Borrowed(&'a ObjectSchema),
    /// Object owned by a scope.
    Shared(Arc<ObjectSchema>),
}

impl Deref for ObjectHandle<'_> {
    type Target = ObjectSchema;

    fn deref(&self) -> &ObjectSchema {
        match self {
            ObjectHandle::Borrowed(object) => object,
            ObjectHandle::Shared(object) => object,
        }
    }
}

macro_rules! impl_from_schema {
    ($($variant:ident($schema:ty)),* $(,)?) => {
        $(
            impl From<$schema> for Type {
                fn from(schema: $schema) -> Self {
                    Type::$variant(schema)
                }
            }
        )*
    };
}

impl_from_schema!(
    Bool(BoolSchema),
    Int(IntSchema),
    Float(FloatSchema),
    String(StringSchema),
    Pattern(PatternSchema),
    StringEnum(StringEnumSchema),
    IntEnum(IntEnumSchema),
    List(ListSchema),
    Map(MapSchema),
    Object(ObjectSchema),
    Ref(RefSchema),
    Scope(ScopeSchema),
    OneOfString(OneOfStringSchema),
    OneOfInt(OneOfIntSchema),
    Any(AnySchema),
);

/// Compatibility of a scalar descriptor: a descriptor candidate must have one
/// of the accepted kinds, literal data must decode.
pub(crate) fn scalar_compatibility<D: Descriptor + ?Sized>(
    expected: &D,
    candidate: Candidate<'_>,
    accepted: &[TypeKind],
) -> Result<(), ConstraintError> {
    match candidate {
        Candidate::Value(data) => expected.decode(data).map(|_| ()),
        Candidate::Type(other) if accepted.contains(&other.kind()) => Ok(()),
        Candidate::Type(other) => Err(kind_mismatch(expected.kind(), other.kind())),
    }
}

pub(crate) fn kind_mismatch(expected: TypeKind, got: TypeKind) -> ConstraintError {
    ConstraintError::new(format!(
        "incompatible types: expected '{expected}', got '{got}'"
    ))
}

pub(crate) fn wrong_data(expected: &str, got: &Value) -> ConstraintError {
    ConstraintError::new(format!(
        "expected {expected}, got {} ({got})",
        got.type_name()
    ))
}

pub(crate) fn wrong_native(expected: &str, got: &Native) -> ConstraintError {
    ConstraintError::new(format!(
        "expected a native {expected}, got {}",
        got.type_name()
    ))
}

/// Validate optional inclusive bounds on a size or length.
pub(crate) fn check_size(
    what: &str,
    size: usize,
    min: Option<i64>,
    max: Option<i64>,
) -> Result<(), ConstraintError> {
    let size = i64::try_from(size).unwrap_or(i64::MAX);
    if let Some(min) = min {
        if size < min {
            return Err(ConstraintError::new(format!(
                "must have at least {min} {what}, {size} given"
            )));
        }
    }
    if let Some(max) = max {
        if size > max {
            return Err(ConstraintError::new(format!(
                "must have at most {max} {what}, {size} given"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ids_round_trip() {
        for kind in TypeKind::ALL {
            assert_eq!(TypeKind::from_type_id(kind.type_id()), Some(kind));
        }
        assert_eq!(TypeKind::from_type_id("tuple"), None);
    }

    #[test]
    fn only_discriminant_kinds_are_map_keys() {
        let keys: Vec<TypeKind> = TypeKind::ALL.into_iter().filter(|k| k.is_map_key()).collect();
        assert_eq!(
            keys,
            vec![TypeKind::Int, TypeKind::String, TypeKind::StringEnum, TypeKind::IntEnum]
        );
    }

    #[test]
    fn size_bounds() {
        assert!(check_size("items", 2, Some(1), Some(3)).is_ok());
        let err = check_size("items", 0, Some(1), None).unwrap_err();
        assert_eq!(err.message, "must have at least 1 items, 0 given");
        assert!(check_size("items", 4, None, Some(3)).is_err());
    }

    #[test]
    fn dispatch_reports_kind() {
        let t: Type = IntSchema::new().into();
        assert_eq!(t.kind(), TypeKind::Int);
        assert_eq!(t.native_kind(), NativeKind::Int);
        assert_eq!(t.kind().to_string(), "integer");
    }
}
