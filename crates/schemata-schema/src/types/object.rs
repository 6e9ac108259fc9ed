//! Objects: a named, closed set of properties.
//!
//! Decoding an object runs in three stages:
//!
//! 1. Keys are checked against the declared properties. Unknown keys are
//!    rejected and explicit nulls are dropped, so a null property counts as
//!    absent.
//! 2. Absent properties with a default are back-filled, unless a property
//!    they conflict with was provided.
//! 3. Presence rules (`required`, `required_if`, `required_if_not`,
//!    `conflicts`) are checked in property order, then each present property
//!    is decoded with its own type.
//!
//! `validate` and `encode` apply the same presence rules to the fields of a
//! [`Native::Object`], so `encode(decode(x))` never trips over a back-filled
//! default.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use schemata_core::error::quote_list;
use schemata_core::{BadArgumentError, ConstraintError, Value};

use super::{
    kind_mismatch, wrong_data, wrong_native, Candidate, CompatState, Descriptor, ObjectTable,
    PropertySchema, TypeKind,
};
use crate::native::{Native, NativeKind};

/// An object descriptor.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    id: String,
    properties: BTreeMap<String, PropertySchema>,
}

impl ObjectSchema {
    /// An object with the given id and properties.
    pub fn new<K: Into<String>>(
        id: impl Into<String>,
        properties: impl IntoIterator<Item = (K, PropertySchema)>,
    ) -> Self {
        Self {
            id: id.into(),
            properties: properties.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// The object id, unique within its scope.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Declared properties, in sorted order.
    pub fn properties(&self) -> &BTreeMap<String, PropertySchema> {
        &self.properties
    }

    /// Look up one property.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.get(name)
    }

    fn unknown_field(&self, field: &str) -> ConstraintError {
        ConstraintError::new(format!(
            "invalid parameter '{field}', expected one of: {}",
            quote_list(self.properties.keys())
        ))
        .at(field)
    }

    /// Check presence rules against the set of fields that are set.
    fn check_presence(&self, is_set: impl Fn(&str) -> bool) -> Result<(), ConstraintError> {
        for (name, property) in &self.properties {
            if is_set(name) {
                if let Some(other) = property.conflicting_fields().iter().find(|f| is_set(f)) {
                    return Err(ConstraintError::new(format!(
                        "this field conflicts with '{other}', set one of the two, not both"
                    ))
                    .at(name.as_str()));
                }
                continue;
            }
            if property.is_required() {
                return Err(ConstraintError::new("this field is required").at(name.as_str()));
            }
            if let Some(other) = property.required_if_fields().iter().find(|f| is_set(f)) {
                return Err(ConstraintError::new(format!(
                    "this field is required because '{other}' is set"
                ))
                .at(name.as_str()));
            }
            let fallbacks = property.required_if_not_fields();
            if !fallbacks.is_empty() && !fallbacks.iter().any(|f| is_set(f)) {
                let message = match fallbacks {
                    [only] => format!("this field is required because '{only}' is not set"),
                    _ => format!(
                        "this field is required because none of {} are set",
                        quote_list(fallbacks)
                    ),
                };
                return Err(ConstraintError::new(message).at(name.as_str()));
            }
        }
        Ok(())
    }

    /// Either property declares a conflict with the other.
    fn in_conflict(&self, a: &str, b: &str) -> bool {
        let declares = |from: &str, to: &str| {
            self.properties
                .get(from)
                .is_some_and(|p| p.conflicting_fields().iter().any(|f| f == to))
        };
        declares(a, b) || declares(b, a)
    }

    fn parse_default(name: &str, json: &str) -> Result<Value, ConstraintError> {
        Value::parse_json(json).map_err(|e| {
            ConstraintError::new(format!("the default value of '{name}' is not valid JSON"))
                .with_cause(e)
        })
    }

    /// Resolve every reference of every property type.
    pub(crate) fn bind_refs(&self, objects: &ObjectTable) -> Result<(), BadArgumentError> {
        for property in self.properties.values() {
            property.type_().bind_refs(objects)?;
        }
        Ok(())
    }

    /// Check defaults, examples and interdependency targets.
    pub(crate) fn verify(&self) -> Result<(), BadArgumentError> {
        for (name, property) in &self.properties {
            property.type_().verify().map_err(|e| {
                BadArgumentError::new(format!("{}.{name}: {}", self.id, e.message))
            })?;

            if let Some(json) = property.default_json() {
                let data = Value::parse_json(json).map_err(|e| {
                    BadArgumentError::new(format!(
                        "{}.{name}: default value {json} is not valid JSON ({e})",
                        self.id
                    ))
                })?;
                property.type_().decode(&data).map_err(|e| {
                    BadArgumentError::new(format!(
                        "{}.{name}: default value {json} does not match the property type ({e})",
                        self.id
                    ))
                })?;
                tracing::trace!(object = %self.id, property = %name, "default verified");
            }

            for example in property.examples() {
                Value::parse_json(example).map_err(|e| {
                    BadArgumentError::new(format!(
                        "{}.{name}: example {example} is not valid JSON ({e})",
                        self.id
                    ))
                })?;
            }

            for target in property.interdependencies() {
                if target == name || !self.properties.contains_key(target) {
                    return Err(BadArgumentError::new(format!(
                        "{}.{name}: interdependency on '{target}' does not name another property, expected one of: {}",
                        self.id,
                        quote_list(self.properties.keys().filter(|k| *k != name))
                    )));
                }
            }
        }
        Ok(())
    }

    fn native_fields<'a>(&self, value: &'a Native) -> Result<&'a BTreeMap<String, Native>, ConstraintError> {
        let fields = match value {
            Native::Object(fields) => fields,
            other => return Err(wrong_native(&format!("object '{}'", self.id), other)),
        };
        if let Some(unknown) = fields.keys().find(|k| !self.properties.contains_key(*k)) {
            return Err(self.unknown_field(unknown));
        }
        self.check_presence(|f| fields.contains_key(f))?;
        Ok(fields)
    }
}

impl Descriptor for ObjectSchema {
    fn kind(&self) -> TypeKind {
        TypeKind::Object
    }

    fn native_kind(&self) -> NativeKind {
        NativeKind::Object(self.id.clone())
    }

    fn decode(&self, data: &Value) -> Result<Native, ConstraintError> {
        let Value::Map(entries) = data else {
            return Err(wrong_data(&format!("a map for object '{}'", self.id), data));
        };

        let mut present: BTreeMap<&str, Cow<'_, Value>> = BTreeMap::new();
        for (key, value) in entries {
            let Value::String(key) = key else {
                return Err(ConstraintError::new(format!(
                    "object keys must be strings, got {} ({key})",
                    key.type_name()
                )));
            };
            let Some((name, _)) = self.properties.get_key_value(key) else {
                return Err(self.unknown_field(key));
            };
            if !value.is_null() {
                present.insert(name.as_str(), Cow::Borrowed(value));
            }
        }

        let provided: BTreeSet<&str> = present.keys().copied().collect();
        for (name, property) in &self.properties {
            if provided.contains(name.as_str()) {
                continue;
            }
            let Some(json) = property.default_json() else {
                continue;
            };
            if provided.iter().any(|other| self.in_conflict(name, other)) {
                continue;
            }
            let default = Self::parse_default(name, json)?;
            present.insert(name.as_str(), Cow::Owned(default));
        }

        self.check_presence(|f| present.contains_key(f))?;

        let mut fields = BTreeMap::new();
        for (name, value) in present {
            let property = &self.properties[name];
            let decoded = property.type_().decode(&value).map_err(|e| e.at(name))?;
            fields.insert(name.to_string(), decoded);
        }
        Ok(Native::Object(fields))
    }

    fn validate(&self, value: &Native) -> Result<(), ConstraintError> {
        let fields = self.native_fields(value)?;
        for (name, field) in fields {
            self.properties[name]
                .type_()
                .validate(field)
                .map_err(|e| e.at(name.as_str()))?;
        }
        Ok(())
    }

    fn encode(&self, value: &Native) -> Result<Value, ConstraintError> {
        let fields = self.native_fields(value)?;
        let mut encoded = BTreeMap::new();
        for (name, field) in fields {
            let data = self.properties[name]
                .type_()
                .encode(field)
                .map_err(|e| e.at(name.as_str()))?;
            encoded.insert(Value::String(name.clone()), data);
        }
        Ok(Value::Map(encoded))
    }

    fn compatible_with(&self, candidate: Candidate<'_>, state: &mut CompatState) -> Result<(), ConstraintError> {
        match candidate {
            Candidate::Value(data) => {
                let Value::Map(entries) = data else {
                    return Err(wrong_data(&format!("a map for object '{}'", self.id), data));
                };
                for (key, value) in entries {
                    let name = key.as_str().unwrap_or_default();
                    let Some(property) = self.properties.get(name) else {
                        return Err(self.unknown_field(&key.to_string()));
                    };
                    if !value.is_null() {
                        property
                            .type_()
                            .compatible_with(Candidate::Value(value), state)
                            .map_err(|e| e.at(name))?;
                    }
                }
                for (name, property) in &self.properties {
                    let given = data.get(name).is_some_and(|v| !v.is_null());
                    if !given && property.is_required() && property.default_json().is_none() {
                        return Err(ConstraintError::new("this field is required").at(name.as_str()));
                    }
                }
                Ok(())
            }
            Candidate::Type(other_type) => {
                let Some(other) = other_type.object() else {
                    return Err(kind_mismatch(self.kind(), other_type.kind()));
                };
                if !state.enter(&self.id, other.id()) {
                    return Ok(());
                }
                let expected: BTreeSet<&String> = self.properties.keys().collect();
                let given: BTreeSet<&String> = other.properties().keys().collect();
                if expected != given {
                    let missing: Vec<_> = expected.difference(&given).collect();
                    let extra: Vec<_> = given.difference(&expected).collect();
                    return Err(ConstraintError::new(format!(
                        "object '{}' is not compatible with object '{}': missing properties [{}], unexpected properties [{}]",
                        self.id,
                        other.id(),
                        quote_list(missing),
                        quote_list(extra)
                    )));
                }
                for (name, property) in &self.properties {
                    let other_property = &other.properties()[name];
                    property
                        .type_()
                        .compatible_with(Candidate::Type(other_property.type_()), state)
                        .map_err(|e| e.at(name.as_str()))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntSchema, StringSchema, Type};

    fn server() -> ObjectSchema {
        ObjectSchema::new(
            "Server",
            [
                ("host", PropertySchema::new(StringSchema::new()).required()),
                ("port", PropertySchema::new(IntSchema::new().with_min(1)).with_default("8080")),
                ("socket", PropertySchema::new(StringSchema::new()).conflicts(["port"])),
                ("user", PropertySchema::new(StringSchema::new())),
                ("password", PropertySchema::new(StringSchema::new()).required_if(["user"])),
            ],
        )
    }

    fn parse(json: &str) -> Value {
        Value::parse_json(json).unwrap()
    }

    #[test]
    fn defaults_are_back_filled() {
        let native = server().decode(&parse(r#"{"host": "example.com"}"#)).unwrap();
        assert_eq!(native.get("port"), Some(&Native::Int(8080)));
        assert_eq!(native.get("user"), None);
    }

    #[test]
    fn missing_required_field_reports_its_name() {
        let err = server().decode(&parse(r#"{"port": 1}"#)).unwrap_err();
        assert_eq!(err.path, vec!["host"]);
        assert_eq!(err.message, "this field is required");
    }

    #[test]
    fn null_counts_as_absent() {
        let err = server().decode(&parse(r#"{"host": null}"#)).unwrap_err();
        assert_eq!(err.path, vec!["host"]);
    }

    #[test]
    fn unknown_fields_list_the_valid_ones() {
        let err = server().decode(&parse(r#"{"host": "h", "hots": 1}"#)).unwrap_err();
        assert_eq!(err.path, vec!["hots"]);
        assert_eq!(
            err.message,
            "invalid parameter 'hots', expected one of: 'host', 'password', 'port', 'socket', 'user'"
        );
    }

    #[test]
    fn required_if_and_conflicts() {
        let err = server().decode(&parse(r#"{"host": "h", "user": "u"}"#)).unwrap_err();
        assert_eq!(err.path, vec!["password"]);
        assert_eq!(err.message, "this field is required because 'user' is set");

        let err = server()
            .decode(&parse(r#"{"host": "h", "socket": "/run/s", "port": 1}"#))
            .unwrap_err();
        assert_eq!(err.path, vec!["socket"]);

        let native = server().decode(&parse(r#"{"host": "h", "socket": "/run/s"}"#)).unwrap();
        assert_eq!(native.get("port"), None);
        assert!(server().encode(&native).is_ok());
    }

    #[test]
    fn required_if_not() {
        let object = ObjectSchema::new(
            "Auth",
            [
                ("token", PropertySchema::new(StringSchema::new()).required_if_not(["key", "cert"])),
                ("key", PropertySchema::new(StringSchema::new())),
                ("cert", PropertySchema::new(StringSchema::new())),
            ],
        );
        let err = object.decode(&parse("{}")).unwrap_err();
        assert_eq!(err.message, "this field is required because none of 'key', 'cert' are set");
        assert!(object.decode(&parse(r#"{"cert": "c"}"#)).is_ok());
    }

    #[test]
    fn nested_errors_are_prefixed() {
        let err = server().decode(&parse(r#"{"host": "h", "port": 0}"#)).unwrap_err();
        assert_eq!(err.path, vec!["port"]);
        assert_eq!(err.to_string(), "validation failed for 'port': must be at least 1, 0 given");
    }

    #[test]
    fn encode_round_trips() {
        let data = parse(r#"{"host": "h", "port": 22}"#);
        let native = server().decode(&data).unwrap();
        assert_eq!(server().encode(&native).unwrap(), data);
        let bad = Native::object([("port", Native::Int(1))]);
        assert_eq!(server().validate(&bad).unwrap_err().path, vec!["host"]);
    }

    #[test]
    fn verify_catches_bad_defaults_and_targets() {
        let object = ObjectSchema::new(
            "Bad",
            [("a", PropertySchema::new(IntSchema::new()).with_default("\"x\""))],
        );
        assert!(object.verify().is_err());
        let object = ObjectSchema::new(
            "Bad",
            [("a", PropertySchema::new(IntSchema::new()).conflicts(["b"]))],
        );
        let err = object.verify().unwrap_err();
        assert!(err.message.contains("'b'"));
        assert!(server().verify().is_ok());
    }

    #[test]
    fn compatibility_against_data_and_types() {
        assert!(server()
            .check_compatibility(Candidate::Value(&parse(r#"{"host": "h"}"#)))
            .is_ok());
        assert!(server()
            .check_compatibility(Candidate::Value(&parse(r#"{"port": 1}"#)))
            .is_err());

        let same: Type = server().into();
        assert!(server().check_compatibility(Candidate::Type(&same)).is_ok());

        let smaller: Type = ObjectSchema::new(
            "Server",
            [("host", PropertySchema::new(StringSchema::new()).required())],
        )
        .into();
        let err = server().check_compatibility(Candidate::Type(&smaller)).unwrap_err();
        assert!(err.message.contains("missing properties ['password', 'port', 'socket', 'user']"));
    }
}
