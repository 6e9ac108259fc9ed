//! # Native Record Binding
//!
//! Binds object descriptors to plain Rust structs through a static field
//! table instead of runtime introspection. A struct opts in with
//! [`impl_record!`](crate::impl_record), which generates:
//!
//! - [`Record`]: the table of `(name, tag, get, set)` accessor pairs;
//! - [`ToNative`] / [`FromNative`]: conversion through that table, so records
//!   nest inside lists, maps and other records;
//! - [`RecordField`]: so a record can itself be the type of a field.
//!
//! [`TypedObject`] matches every property of an [`ObjectSchema`] to one
//! field once, at construction, preferring an explicit tag over the field
//! name. Decoding and encoding then walk that index.
//!
//! ```
//! use schemata_schema::{impl_record, IntSchema, ObjectSchema, PropertySchema, StringSchema, TypedObject, Value};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Server {
//!     host: String,
//!     listen_port: i64,
//! }
//!
//! impl_record!(Server { host, listen_port => "port" });
//!
//! let schema = ObjectSchema::new(
//!     "Server",
//!     [
//!         ("host", PropertySchema::new(StringSchema::new()).required()),
//!         ("port", PropertySchema::new(IntSchema::new()).with_default("8080")),
//!     ],
//! );
//! let typed = TypedObject::<Server>::new(schema).unwrap();
//! let server = typed.decode(&Value::parse_json(r#"{"host": "example.com"}"#).unwrap()).unwrap();
//! assert_eq!(server.listen_port, 8080);
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use schemata_core::{BadArgumentError, ConstraintError, Value};

use crate::native::{shape_mismatch, FromNative, Native, Pattern, ToNative};
use crate::types::{Descriptor, ObjectSchema, ObjectTable, ScopeSchema, Type};

/// One entry of a record's field table.
pub struct Field<T> {
    /// Rust field name.
    pub name: &'static str,
    /// Property id overriding the field name, if any.
    pub tag: Option<&'static str>,
    /// Read the field; `None` when it holds no value.
    pub get: fn(&T) -> Option<Native>,
    /// Write the field from its native value.
    pub set: fn(&mut T, Native) -> Result<(), ConstraintError>,
}

impl<T> Field<T> {
    /// The property id this field is stored under.
    pub fn key(&self) -> &'static str {
        self.tag.unwrap_or(self.name)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Field<T> {}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("tag", &self.tag)
            .finish()
    }
}

/// A struct with a static field table. Implement with
/// [`impl_record!`](crate::impl_record).
pub trait Record: Default + 'static {
    /// The field table, in declaration order.
    fn fields() -> Vec<Field<Self>>;
}

/// A type that can be stored in a record field.
///
/// Plain values always read as present. `Option<T>` reads as absent when
/// `None`, so absent optional properties round-trip.
pub trait RecordField: Sized {
    /// The native value of the field, or `None` when it is unset.
    fn read(&self) -> Option<Native>;

    /// Build the field from a native value.
    fn write(value: Native) -> Result<Self, ConstraintError>;
}

macro_rules! plain_record_field {
    ($($ty:ty),* $(,)?) => {
        $(
            impl RecordField for $ty {
                fn read(&self) -> Option<Native> {
                    Some(self.to_native())
                }

                fn write(value: Native) -> Result<Self, ConstraintError> {
                    <$ty as FromNative>::from_native(value)
                }
            }
        )*
    };
}

plain_record_field!(bool, i64, f64, String, Pattern, Native);

impl<T: ToNative + FromNative> RecordField for Vec<T> {
    fn read(&self) -> Option<Native> {
        Some(self.to_native())
    }

    fn write(value: Native) -> Result<Self, ConstraintError> {
        Vec::from_native(value)
    }
}

impl<K, V> RecordField for BTreeMap<K, V>
where
    K: ToNative + FromNative + Ord,
    V: ToNative + FromNative,
{
    fn read(&self) -> Option<Native> {
        Some(self.to_native())
    }

    fn write(value: Native) -> Result<Self, ConstraintError> {
        BTreeMap::from_native(value)
    }
}

impl<T: RecordField> RecordField for Option<T> {
    fn read(&self) -> Option<Native> {
        self.as_ref().and_then(RecordField::read)
    }

    fn write(value: Native) -> Result<Self, ConstraintError> {
        T::write(value).map(Some)
    }
}

/// Convert a record to a [`Native::Object`] keyed by property id.
pub fn record_to_native<T: Record>(record: &T) -> Native {
    Native::Object(
        T::fields()
            .iter()
            .filter_map(|field| (field.get)(record).map(|value| (field.key().to_string(), value)))
            .collect(),
    )
}

/// Build a record from a [`Native::Object`]. Absent fields keep their
/// `Default` value; fields the record does not know are rejected.
pub fn record_from_native<T: Record>(value: Native) -> Result<T, ConstraintError> {
    let mut fields = match value {
        Native::Object(fields) => fields,
        other => return Err(shape_mismatch("object", &other)),
    };
    let mut record = T::default();
    let table = T::fields();
    for field in &table {
        if let Some(value) = fields.remove(field.key()) {
            (field.set)(&mut record, value).map_err(|e| e.at(field.key()))?;
        }
    }
    if let Some(unknown) = fields.keys().next() {
        return Err(ConstraintError::new(format!(
            "'{}' has no field for '{unknown}', expected one of: {}",
            std::any::type_name::<T>(),
            schemata_core::error::quote_list(table.iter().map(Field::key))
        ))
        .at(unknown.as_str()));
    }
    Ok(record)
}

/// Implement [`Record`], [`ToNative`], [`FromNative`] and [`RecordField`]
/// for a struct.
///
/// Each field is listed by name; `field => "tag"` stores it under a
/// different property id. Every listed field must implement
/// [`RecordField`], and the struct must implement `Default`.
#[macro_export]
macro_rules! impl_record {
    ($ty:ty { $($field:ident $(=> $tag:literal)?),* $(,)? }) => {
        impl $crate::record::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::record::Field<Self>> {
                ::std::vec![$(
                    $crate::record::Field {
                        name: ::std::stringify!($field),
                        tag: $crate::__record_tag!($($tag)?),
                        get: |record: &Self| $crate::record::RecordField::read(&record.$field),
                        set: |record: &mut Self, value: $crate::native::Native| {
                            record.$field = $crate::record::RecordField::write(value)?;
                            ::std::result::Result::Ok(())
                        },
                    }
                ),*]
            }
        }

        impl $crate::native::ToNative for $ty {
            fn to_native(&self) -> $crate::native::Native {
                $crate::record::record_to_native(self)
            }
        }

        impl $crate::native::FromNative for $ty {
            fn from_native(
                value: $crate::native::Native,
            ) -> ::std::result::Result<Self, $crate::ConstraintError> {
                $crate::record::record_from_native(value)
            }
        }

        impl $crate::record::RecordField for $ty {
            fn read(&self) -> ::std::option::Option<$crate::native::Native> {
                ::std::option::Option::Some($crate::record::record_to_native(self))
            }

            fn write(
                value: $crate::native::Native,
            ) -> ::std::result::Result<Self, $crate::ConstraintError> {
                $crate::record::record_from_native(value)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_tag {
    () => {
        ::std::option::Option::None
    };
    ($tag:literal) => {
        ::std::option::Option::Some($tag)
    };
}

/// An object descriptor bound to the record type `T`.
#[derive(Debug)]
pub struct TypedObject<T: Record> {
    object: Arc<ObjectSchema>,
    // Keeps the targets of the object's refs alive.
    scope: Option<ScopeSchema>,
    bindings: Vec<(String, Field<T>)>,
}

impl<T: Record> Clone for TypedObject<T> {
    fn clone(&self) -> Self {
        Self {
            object: Arc::clone(&self.object),
            scope: self.scope.clone(),
            bindings: self.bindings.clone(),
        }
    }
}

impl<T: Record> TypedObject<T> {
    /// Bind a standalone object. Its refs may only point at itself.
    pub fn new(object: ObjectSchema) -> Result<Self, BadArgumentError> {
        let object = Arc::new(object);
        let table: ObjectTable = [(object.id().to_string(), Arc::clone(&object))].into();
        object.bind_refs(&table)?;
        object.verify()?;
        Self::bind(object, None)
    }

    /// Bind the root object of a scope.
    pub fn from_scope(scope: ScopeSchema) -> Result<Self, BadArgumentError> {
        let object = Arc::clone(scope.root_object());
        Self::bind(object, Some(scope))
    }

    fn bind(object: Arc<ObjectSchema>, scope: Option<ScopeSchema>) -> Result<Self, BadArgumentError> {
        let fields = T::fields();
        let mut bindings = Vec::with_capacity(object.properties().len());
        for property in object.properties().keys() {
            let field = fields
                .iter()
                .find(|f| f.tag == Some(property.as_str()))
                .or_else(|| fields.iter().find(|f| f.tag.is_none() && f.name == property.as_str()))
                .ok_or_else(|| {
                    BadArgumentError::new(format!(
                        "property '{property}' of object '{}' has no matching field in '{}'",
                        object.id(),
                        std::any::type_name::<T>()
                    ))
                })?;
            bindings.push((property.clone(), *field));
        }
        tracing::debug!(
            object = %object.id(),
            record = std::any::type_name::<T>(),
            fields = bindings.len(),
            "record bound"
        );
        Ok(Self {
            object,
            scope,
            bindings,
        })
    }

    /// The bound object descriptor.
    pub fn object(&self) -> &ObjectSchema {
        &self.object
    }

    /// Decode generic data straight into a record.
    pub fn decode(&self, data: &Value) -> Result<T, ConstraintError> {
        let native = self.object.decode(data)?;
        self.from_native(native)
    }

    /// Validate a record against the object descriptor.
    pub fn validate(&self, record: &T) -> Result<(), ConstraintError> {
        self.object.validate(&self.to_native(record))
    }

    /// Validate a record and convert it into generic data.
    pub fn encode(&self, record: &T) -> Result<Value, ConstraintError> {
        self.object.encode(&self.to_native(record))
    }

    /// Read a record into its native form, keyed by property id.
    pub fn to_native(&self, record: &T) -> Native {
        Native::Object(
            self.bindings
                .iter()
                .filter_map(|(property, field)| (field.get)(record).map(|v| (property.clone(), v)))
                .collect(),
        )
    }

    /// Build a record from a native object.
    pub fn from_native(&self, value: Native) -> Result<T, ConstraintError> {
        let mut fields = match value {
            Native::Object(fields) => fields,
            other => return Err(shape_mismatch("object", &other)),
        };
        let mut record = T::default();
        for (property, field) in &self.bindings {
            if let Some(value) = fields.remove(property) {
                (field.set)(&mut record, value).map_err(|e| e.at(property.as_str()))?;
            }
        }
        if let Some(unknown) = fields.keys().next() {
            return Err(ConstraintError::new(format!(
                "object '{}' has no property '{unknown}', expected one of: {}",
                self.object.id(),
                schemata_core::error::quote_list(self.bindings.iter().map(|(property, _)| property))
            ))
            .at(unknown.as_str()));
        }
        Ok(record)
    }
}

/// Any descriptor bound to the Rust type `T`.
#[derive(Debug, Clone)]
pub struct TypedType<T> {
    type_: Type,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ToNative + FromNative> TypedType<T> {
    /// Bind a descriptor to `T`.
    pub fn new(type_: impl Into<Type>) -> Self {
        Self {
            type_: type_.into(),
            _marker: PhantomData,
        }
    }

    /// The untyped descriptor.
    pub fn type_(&self) -> &Type {
        &self.type_
    }

    /// Decode generic data into a `T`.
    pub fn decode(&self, data: &Value) -> Result<T, ConstraintError> {
        T::from_native(self.type_.decode(data)?)
    }

    /// Validate a `T`.
    pub fn validate(&self, value: &T) -> Result<(), ConstraintError> {
        self.type_.validate(&value.to_native())
    }

    /// Validate a `T` and convert it into generic data.
    pub fn encode(&self, value: &T) -> Result<Value, ConstraintError> {
        self.type_.encode(&value.to_native())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{IntSchema, ListSchema, PropertySchema, RefSchema, StringSchema};

    #[derive(Debug, Default, PartialEq)]
    struct Endpoint {
        host: String,
        listen_port: i64,
        aliases: Vec<String>,
        user: Option<String>,
    }

    crate::impl_record!(Endpoint { host, listen_port => "port", aliases, user });

    fn endpoint_schema() -> ObjectSchema {
        ObjectSchema::new(
            "Endpoint",
            [
                ("host", PropertySchema::new(StringSchema::new()).required()),
                ("port", PropertySchema::new(IntSchema::new()).with_default("80")),
                ("aliases", PropertySchema::new(ListSchema::new(StringSchema::new())).with_default("[]")),
                ("user", PropertySchema::new(StringSchema::new())),
            ],
        )
    }

    #[test]
    fn tags_win_over_names() {
        let fields = Endpoint::fields();
        assert_eq!(fields[1].key(), "port");
        assert_eq!(fields[0].key(), "host");
    }

    #[test]
    fn decode_and_encode_records() {
        let typed = TypedObject::<Endpoint>::new(endpoint_schema()).unwrap();
        let data = Value::parse_json(r#"{"host": "a", "aliases": ["b"]}"#).unwrap();
        let endpoint = typed.decode(&data).unwrap();
        assert_eq!(
            endpoint,
            Endpoint {
                host: "a".into(),
                listen_port: 80,
                aliases: vec!["b".into()],
                user: None,
            }
        );
        let encoded = typed.encode(&endpoint).unwrap();
        assert_eq!(encoded.get("port"), Some(&Value::Int(80)));
        assert_eq!(encoded.get("user"), None);
    }

    #[test]
    fn properties_without_fields_are_rejected() {
        let schema = ObjectSchema::new(
            "Endpoint",
            [("scheme", PropertySchema::new(StringSchema::new()))],
        );
        let err = TypedObject::<Endpoint>::new(schema).unwrap_err();
        assert!(err.message.contains("'scheme'"));
    }

    #[test]
    fn standalone_objects_reject_foreign_refs() {
        let schema = ObjectSchema::new(
            "Endpoint",
            [("host", PropertySchema::new(RefSchema::new("Other")))],
        );
        assert!(TypedObject::<Endpoint>::new(schema).is_err());
    }

    #[test]
    fn records_convert_through_native() {
        let endpoint = Endpoint {
            host: "h".into(),
            ..Endpoint::default()
        };
        let native = endpoint.to_native();
        assert_eq!(native.get("port"), Some(&Native::Int(0)));
        assert_eq!(Endpoint::from_native(native).unwrap(), endpoint);

        let err = Endpoint::from_native(Native::object([("bogus", Native::Int(1))])).unwrap_err();
        assert_eq!(err.path, vec!["bogus"]);
    }

    #[test]
    fn typed_types_wrap_any_descriptor() {
        let typed = TypedType::<Vec<i64>>::new(ListSchema::new(IntSchema::new().with_max(5)));
        assert_eq!(typed.decode(&Value::parse_json("[1, \"2\"]").unwrap()).unwrap(), vec![1, 2]);
        assert!(typed.validate(&vec![6]).is_err());
    }
}
