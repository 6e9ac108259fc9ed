//! Discriminated unions of objects.
//!
//! A OneOf selects one of several object descriptors by the value of a
//! discriminator field. Whether that field belongs to the selected object is
//! fixed at construction time:
//!
//! - **inlined**: every member object declares the discriminator as one of
//!   its own properties, and the payload is passed through untouched;
//! - **external** (the default): no member declares it. The field is taken
//!   out of a private copy of the payload before the member decodes it, and
//!   put back into the result afterwards.
//!
//! Binding the enclosing scope fails if any member disagrees with the flag.
//! In native form the discriminator is always present in the record, so
//! `validate` and `encode` select the member by reading it.

use std::collections::BTreeMap;
use std::fmt;

use schemata_core::error::quote_list;
use schemata_core::{BadArgumentError, ConstraintError, Value};

use super::numeric::coerce_int;
use super::string::coerce_string;
use super::{
    kind_mismatch, wrong_data, wrong_native, Candidate, CompatState, Descriptor, ObjectTable, Type,
    TypeKind,
};
use crate::native::{shape_mismatch, Native, NativeKind};

/// Field name used when a schema does not name its discriminator.
pub const DEFAULT_DISCRIMINATOR: &str = "_type";

/// A value type usable as a OneOf discriminator.
pub trait DiscriminatorKey:
    Clone + Ord + fmt::Display + fmt::Debug + Send + Sync + 'static
{
    /// The kind of the key.
    const KIND: TypeKind;

    /// Coerce a discriminator found in generic data.
    fn decode_key(data: &Value) -> Result<Self, ConstraintError>;

    /// Read a discriminator from a native record.
    fn from_native(value: &Native) -> Result<Self, ConstraintError>;

    /// The native form of the key.
    fn to_native(&self) -> Native;

    /// The generic form of the key.
    fn to_value(&self) -> Value;

    /// Downcast a descriptor to a OneOf keyed by `Self`.
    fn as_one_of(type_: &Type) -> Option<&OneOfSchema<Self>>;
}

impl DiscriminatorKey for String {
    const KIND: TypeKind = TypeKind::String;

    fn decode_key(data: &Value) -> Result<Self, ConstraintError> {
        coerce_string(data)
    }

    fn from_native(value: &Native) -> Result<Self, ConstraintError> {
        match value {
            Native::String(s) => Ok(s.clone()),
            other => Err(shape_mismatch("string", other)),
        }
    }

    fn to_native(&self) -> Native {
        Native::String(self.clone())
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn as_one_of(type_: &Type) -> Option<&OneOfSchema<Self>> {
        match type_ {
            Type::OneOfString(one_of) => Some(one_of),
            _ => None,
        }
    }
}

impl DiscriminatorKey for i64 {
    const KIND: TypeKind = TypeKind::Int;

    fn decode_key(data: &Value) -> Result<Self, ConstraintError> {
        coerce_int(data, None)
    }

    fn from_native(value: &Native) -> Result<Self, ConstraintError> {
        match value {
            Native::Int(i) => Ok(*i),
            other => Err(shape_mismatch("integer", other)),
        }
    }

    fn to_native(&self) -> Native {
        Native::Int(*self)
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn as_one_of(type_: &Type) -> Option<&OneOfSchema<Self>> {
        match type_ {
            Type::OneOfInt(one_of) => Some(one_of),
            _ => None,
        }
    }
}

/// A union of object descriptors keyed by `K`.
#[derive(Debug, Clone)]
pub struct OneOfSchema<K: DiscriminatorKey> {
    types: BTreeMap<K, Type>,
    discriminator_field_name: String,
    discriminator_inlined: bool,
}

/// A union selected by a string discriminator.
pub type OneOfStringSchema = OneOfSchema<String>;

/// A union selected by an integer discriminator.
pub type OneOfIntSchema = OneOfSchema<i64>;

impl<K: DiscriminatorKey> OneOfSchema<K> {
    /// A union with an external discriminator. Every member must be an
    /// object, a ref or a scope.
    pub fn new(
        discriminator_field_name: impl Into<String>,
        types: impl IntoIterator<Item = (K, Type)>,
    ) -> Result<Self, BadArgumentError> {
        let discriminator_field_name = discriminator_field_name.into();
        let types: BTreeMap<K, Type> = types.into_iter().collect();
        if types.is_empty() {
            return Err(BadArgumentError::new(format!(
                "one-of on '{discriminator_field_name}' has no members"
            )));
        }
        for (key, member) in &types {
            if !member.kind().is_object_like() {
                return Err(BadArgumentError::new(format!(
                    "one-of member '{key}' must be an object, ref or scope, got '{}'",
                    member.kind()
                )));
            }
        }
        Ok(Self {
            types,
            discriminator_field_name,
            discriminator_inlined: false,
        })
    }

    /// Set whether members declare the discriminator themselves.
    pub fn with_inlined(mut self, inlined: bool) -> Self {
        self.discriminator_inlined = inlined;
        self
    }

    /// Members by discriminator value.
    pub fn types(&self) -> &BTreeMap<K, Type> {
        &self.types
    }

    /// Name of the discriminator field.
    pub fn discriminator_field_name(&self) -> &str {
        &self.discriminator_field_name
    }

    /// Whether members declare the discriminator themselves.
    pub fn discriminator_inlined(&self) -> bool {
        self.discriminator_inlined
    }

    fn member(&self, key: &K) -> Result<&Type, ConstraintError> {
        self.types.get(key).ok_or_else(|| {
            ConstraintError::new(format!(
                "invalid value '{key}' for discriminator field '{}', expected one of: {}",
                self.discriminator_field_name,
                quote_list(self.types.keys())
            ))
            .at(self.discriminator_field_name.as_str())
        })
    }

    fn missing_discriminator(&self) -> ConstraintError {
        ConstraintError::new(format!(
            "the discriminator field is required, expected one of: {}",
            quote_list(self.types.keys())
        ))
        .at(self.discriminator_field_name.as_str())
    }

    /// Select the member for a generic payload and prepare the payload it
    /// should see.
    fn select_data(&self, data: &Value) -> Result<(K, &Type, Value), ConstraintError> {
        let Value::Map(entries) = data else {
            return Err(wrong_data("a map with a discriminator field", data));
        };
        let field = Value::String(self.discriminator_field_name.clone());
        let raw = entries
            .get(&field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| self.missing_discriminator())?;
        let key = K::decode_key(raw).map_err(|e| e.at(self.discriminator_field_name.as_str()))?;
        let member = self.member(&key)?;
        let mut payload = entries.clone();
        if !self.discriminator_inlined {
            payload.remove(&field);
        }
        Ok((key, member, Value::Map(payload)))
    }

    /// Select the member for a native record and prepare the record it
    /// should see.
    fn select_native(&self, value: &Native) -> Result<(K, &Type, Native), ConstraintError> {
        let Native::Object(fields) = value else {
            return Err(wrong_native("object with a discriminator field", value));
        };
        let raw = fields
            .get(&self.discriminator_field_name)
            .ok_or_else(|| self.missing_discriminator())?;
        let key = K::from_native(raw).map_err(|e| e.at(self.discriminator_field_name.as_str()))?;
        let member = self.member(&key)?;
        let mut payload = fields.clone();
        if !self.discriminator_inlined {
            payload.remove(&self.discriminator_field_name);
        }
        Ok((key, member, Native::Object(payload)))
    }

    pub(crate) fn bind_refs(&self, objects: &ObjectTable) -> Result<(), BadArgumentError> {
        for member in self.types.values() {
            member.bind_refs(objects)?;
        }
        Ok(())
    }

    pub(crate) fn verify(&self) -> Result<(), BadArgumentError> {
        for (key, member) in &self.types {
            member.verify()?;
            let Some(object) = member.object() else {
                continue;
            };
            let declares = object.property(&self.discriminator_field_name).is_some();
            if declares != self.discriminator_inlined {
                let problem = if declares {
                    "declares the discriminator field but the one-of is not inlined"
                } else {
                    "does not declare the discriminator field but the one-of is inlined"
                };
                return Err(BadArgumentError::new(format!(
                    "one-of member '{key}' (object '{}') {problem} ('{}')",
                    object.id(),
                    self.discriminator_field_name
                )));
            }
        }
        Ok(())
    }
}

impl<K: DiscriminatorKey> Descriptor for OneOfSchema<K> {
    fn kind(&self) -> TypeKind {
        match K::KIND {
            TypeKind::Int => TypeKind::OneOfInt,
            _ => TypeKind::OneOfString,
        }
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::OneOf
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let (key, member, payload) = self.select_data(data)?;
        let mut native = member.decode(&payload)?;
        if !self.discriminator_inlined {
            if let Native::Object(fields) = &mut native {
                fields.insert(self.discriminator_field_name.clone(), key.to_native());
            }
        }
        tracing::trace!(discriminator = %key, "one-of member selected");
        Ok(native)
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        let (_, member, payload) = self.select_native(value)?;
        member.validate(&payload)
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        let (key, member, payload) = self.select_native(value)?;
        let mut data = member.encode(&payload)?;
        if !self.discriminator_inlined {
            if let Value::Map(entries) = &mut data {
                entries.insert(
                    Value::String(self.discriminator_field_name.clone()),
                    key.to_value(),
                );
            }
        }
        Ok(data)
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(data) => {
                let (_, member, payload) = self.select_data(data)?;
                member.compatible_with(Candidate::Value(&payload), state)
            }
            Candidate::Type(other_type) => {
                let Some(other) = K::as_one_of(other_type) else {
                    return Err(kind_mismatch(self.kind(), other_type.kind()));
                };
                if other.discriminator_field_name != self.discriminator_field_name {
                    return Err(ConstraintError::new(format!(
                        "discriminator field names differ: expected '{}', got '{}'",
                        self.discriminator_field_name, other.discriminator_field_name
                    )));
                }
                for (key, member) in &self.types {
                    let Some(other_member) = other.types.get(key) else {
                        return Err(ConstraintError::new(format!(
                            "discriminator value '{key}' is missing, the candidate only has: {}",
                            quote_list(other.types.keys())
                        ))
                        .at(self.discriminator_field_name.as_str()));
                    };
                    member
                        .compatible_with(Candidate::Type(other_member), state)
                        .map_err(|e| e.at(format!("{}={key}", self.discriminator_field_name)))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ObjectSchema, PropertySchema, RefSchema, ScopeSchema, StringSchema};

    fn message(id: &str, field: &str) -> ObjectSchema {
        ObjectSchema::new(id, [(field, PropertySchema::new(StringSchema::new()).required())])
    }

    fn external() -> OneOfStringSchema {
        OneOfSchema::new(
            DEFAULT_DISCRIMINATOR,
            [
                ("B".to_string(), message("B", "message").into()),
                ("C".to_string(), message("C", "m").into()),
            ],
        )
        .unwrap()
    }

    fn parse(json: &str) -> Value {
        Value::parse_json(json).unwrap()
    }

    #[test]
    fn external_discriminator_is_stripped_and_reattached() {
        let data = parse(r#"{"_type": "B", "message": "hi"}"#);
        let native = external().decode(&data).unwrap();
        assert_eq!(native.get("_type"), Some(&Native::String("B".into())));
        assert_eq!(native.get("message"), Some(&Native::String("hi".into())));
        assert_eq!(external().encode(&native).unwrap(), data);
        assert!(external().validate(&native).is_ok());
    }

    #[test]
    fn decode_leaves_the_input_untouched() {
        let data = parse(r#"{"_type": "C", "m": "x"}"#);
        let before = data.clone();
        external().decode(&data).unwrap();
        assert_eq!(data, before);
    }

    #[test]
    fn unknown_discriminator_lists_every_key() {
        let err = external().decode(&parse(r#"{"_type": "Z"}"#)).unwrap_err();
        assert_eq!(err.path, vec!["_type"]);
        assert_eq!(
            err.message,
            "invalid value 'Z' for discriminator field '_type', expected one of: 'B', 'C'"
        );
        let err = external().decode(&parse(r#"{"m": "x"}"#)).unwrap_err();
        assert_eq!(err.path, vec!["_type"]);
    }

    #[test]
    fn integer_discriminators_are_coerced() {
        let one_of: OneOfIntSchema = OneOfSchema::new(
            "kind",
            [(1, message("One", "a").into()), (2, message("Two", "b").into())],
        )
        .unwrap();
        let native = one_of.decode(&parse(r#"{"kind": "2", "b": "x"}"#)).unwrap();
        assert_eq!(native.get("kind"), Some(&Native::Int(2)));
        assert_eq!(one_of.kind(), TypeKind::OneOfInt);
    }

    #[test]
    fn members_must_be_objects() {
        let err = OneOfStringSchema::new("_type", [("a".to_string(), StringSchema::new().into())])
            .unwrap_err();
        assert!(err.message.contains("'string'"));
        assert!(OneOfStringSchema::new("_type", []).is_err());
    }

    #[test]
    fn inlined_flag_is_checked_at_bind_time() {
        let inlined_member = ObjectSchema::new(
            "B",
            [
                ("kind", PropertySchema::new(StringSchema::new()).required()),
                ("message", PropertySchema::new(StringSchema::new())),
            ],
        );
        let root = |inlined: bool| {
            ObjectSchema::new(
                "A",
                [(
                    "s",
                    PropertySchema::new(
                        OneOfStringSchema::new("kind", [("B".to_string(), RefSchema::new("B").into())])
                            .unwrap()
                            .with_inlined(inlined),
                    ),
                )],
            )
        };
        assert!(ScopeSchema::new("A", [root(false), inlined_member.clone()]).is_err());
        let scope = ScopeSchema::new("A", [root(true), inlined_member]).unwrap();
        let native = scope.decode(&parse(r#"{"s": {"kind": "B", "message": "m"}}"#)).unwrap();
        let s = native.get("s").unwrap();
        assert_eq!(s.get("kind"), Some(&Native::String("B".into())));
    }

    #[test]
    fn compatibility_requires_matching_discriminators() {
        let same: Type = external().into();
        assert!(external().check_compatibility(Candidate::Type(&same)).is_ok());

        let renamed: Type = OneOfStringSchema::new(
            "kind",
            [("B".to_string(), message("B", "message").into())],
        )
        .unwrap()
        .into();
        assert!(external().check_compatibility(Candidate::Type(&renamed)).is_err());

        let partial: Type = OneOfStringSchema::new(
            DEFAULT_DISCRIMINATOR,
            [("B".to_string(), message("B", "message").into())],
        )
        .unwrap()
        .into();
        let err = external().check_compatibility(Candidate::Type(&partial)).unwrap_err();
        assert!(err.message.contains("'C'"));

        assert!(external()
            .check_compatibility(Candidate::Value(&parse(r#"{"_type": "B", "message": "x"}"#)))
            .is_ok());
    }
}
