//! Conversion of descriptors to and from their native description.
//!
//! The native form of a descriptor is the record the bootstrap schema
//! decodes a serialized schema into: every polymorphic position carries a
//! `type_id` field, and everything else mirrors the builder arguments.
//! Conversions in this direction assume the data already passed the
//! bootstrap schema, so they only check shapes; the descriptor builders
//! re-check the schema rules and their failures come back as
//! [`ConstraintError`]s with the builder error attached as the cause.

use std::collections::BTreeMap;

use schemata_core::{BadArgumentError, ConstraintError, Unit, Units};

use crate::display::DisplayValue;
use crate::native::{shape_mismatch, FromNative, Native, Pattern, ToNative};
use crate::types::{
    AnySchema, BoolSchema, DiscriminatorKey, FloatSchema, IntEnumSchema, IntSchema, ListSchema,
    MapSchema, ObjectSchema, OneOfSchema, PatternSchema, PropertySchema, RefSchema, ScopeSchema,
    StringEnumSchema, StringSchema, Type, TypeKind, DEFAULT_DISCRIMINATOR,
};

/// Name of the discriminator field at every polymorphic position.
pub const TYPE_ID_FIELD: &str = "type_id";

type Fields = BTreeMap<String, Native>;

fn into_fields(value: Native, what: &str) -> Result<Fields, ConstraintError> {
    match value {
        Native::Object(fields) => Ok(fields),
        Native::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| match k {
                Native::String(k) => Ok((k, v)),
                other => Err(shape_mismatch("string keys", &other)),
            })
            .collect(),
        other => Err(shape_mismatch(what, &other)),
    }
}

fn take<T: FromNative>(fields: &mut Fields, name: &str) -> Result<Option<T>, ConstraintError> {
    fields
        .remove(name)
        .map(|value| T::from_native(value).map_err(|e| e.at(name)))
        .transpose()
}

fn require<T: FromNative>(fields: &mut Fields, name: &str) -> Result<T, ConstraintError> {
    take(fields, name)?.ok_or_else(|| ConstraintError::new("this field is required").at(name))
}

fn rejected(what: &str, error: BadArgumentError) -> ConstraintError {
    ConstraintError::new(format!("invalid {what}: {}", error.message)).with_cause(error)
}

/// Collects the fields of a native description, skipping unset ones.
#[derive(Default)]
struct Describe(Fields);

impl Describe {
    fn kind(kind: TypeKind) -> Self {
        Self::default().with(TYPE_ID_FIELD, kind.type_id().to_string())
    }

    fn with(mut self, name: &str, value: impl ToNative) -> Self {
        self.0.insert(name.to_string(), value.to_native());
        self
    }

    fn maybe<T: ToNative>(self, name: &str, value: Option<T>) -> Self {
        match value {
            Some(value) => self.with(name, value),
            None => self,
        }
    }

    fn unless_empty(self, name: &str, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.with(name, values.to_vec())
        }
    }

    fn finish(self) -> Native {
        Native::Object(self.0)
    }
}

impl<T: ToNative> ToNative for &T {
    fn to_native(&self) -> Native {
        (**self).to_native()
    }
}

impl ToNative for DisplayValue {
    fn to_native(&self) -> Native {
        Describe::default()
            .maybe("name", self.name.clone())
            .maybe("description", self.description.clone())
            .maybe("icon", self.icon.clone())
            .finish()
    }
}

impl FromNative for DisplayValue {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "display")?;
        Ok(Self {
            name: take(&mut fields, "name")?,
            description: take(&mut fields, "description")?,
            icon: take(&mut fields, "icon")?,
        })
    }
}

impl ToNative for Unit {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("name_short_singular", self.name_short_singular().to_string())
            .with("name_short_plural", self.name_short_plural().to_string())
            .with("name_long_singular", self.name_long_singular().to_string())
            .with("name_long_plural", self.name_long_plural().to_string())
            .finish()
    }
}

impl FromNative for Unit {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "unit")?;
        let short_singular: String = require(&mut fields, "name_short_singular")?;
        let short_plural: String = require(&mut fields, "name_short_plural")?;
        let long_singular: String = require(&mut fields, "name_long_singular")?;
        let long_plural: String = require(&mut fields, "name_long_plural")?;
        Ok(Unit::new(short_singular, short_plural, long_singular, long_plural))
    }
}

impl ToNative for Units {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("base_unit", self.base_unit())
            .with("multipliers", self.multipliers())
            .finish()
    }
}

impl FromNative for Units {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "units")?;
        let base: Unit = require(&mut fields, "base_unit")?;
        let multipliers: BTreeMap<i64, Unit> = take(&mut fields, "multipliers")?.unwrap_or_default();
        Ok(Units::new(base, multipliers))
    }
}

impl ToNative for PropertySchema {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("type", self.type_())
            .maybe("display", self.display())
            .with("required", self.is_required())
            .unless_empty("required_if", self.required_if_fields())
            .unless_empty("required_if_not", self.required_if_not_fields())
            .unless_empty("conflicts", self.conflicting_fields())
            .maybe("default", self.default_json().map(str::to_string))
            .unless_empty("examples", self.examples())
            .finish()
    }
}

impl FromNative for PropertySchema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "property")?;
        let type_: Type = require(&mut fields, "type")?;
        let mut property = PropertySchema::new(type_)
            .with_required(take(&mut fields, "required")?.unwrap_or(false))
            .required_if(take::<Vec<String>>(&mut fields, "required_if")?.unwrap_or_default())
            .required_if_not(take::<Vec<String>>(&mut fields, "required_if_not")?.unwrap_or_default())
            .conflicts(take::<Vec<String>>(&mut fields, "conflicts")?.unwrap_or_default())
            .with_examples(take::<Vec<String>>(&mut fields, "examples")?.unwrap_or_default());
        if let Some(display) = take(&mut fields, "display")? {
            property = property.with_display(display);
        }
        if let Some(default) = take::<String>(&mut fields, "default")? {
            property = property.with_default(default);
        }
        Ok(property)
    }
}

impl ToNative for ObjectSchema {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("id", self.id().to_string())
            .with("properties", self.properties())
            .finish()
    }
}

impl FromNative for ObjectSchema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "object")?;
        let id: String = require(&mut fields, "id")?;
        let properties: BTreeMap<String, PropertySchema> = require(&mut fields, "properties")?;
        Ok(ObjectSchema::new(id, properties))
    }
}

impl ToNative for ScopeSchema {
    fn to_native(&self) -> Native {
        let objects: BTreeMap<String, Native> = self
            .objects()
            .iter()
            .map(|(id, object)| (id.clone(), object.to_native()))
            .collect();
        Describe::default()
            .with("objects", objects)
            .with("root", self.root().to_string())
            .finish()
    }
}

impl FromNative for ScopeSchema {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "scope")?;
        let root: String = require(&mut fields, "root")?;
        let objects: BTreeMap<String, ObjectSchema> = require(&mut fields, "objects")?;
        for (key, object) in &objects {
            if key != object.id() {
                return Err(ConstraintError::new(format!(
                    "object is listed as '{key}' but its id is '{}'",
                    object.id()
                ))
                .at(key.as_str())
                .at("objects"));
            }
        }
        ScopeSchema::new(root, objects.into_values()).map_err(|e| rejected("scope", e))
    }
}

impl ToNative for RefSchema {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("id", self.id().to_string())
            .maybe("display", self.display())
            .finish()
    }
}

impl<K: DiscriminatorKey + ToNative> ToNative for OneOfSchema<K> {
    fn to_native(&self) -> Native {
        Describe::default()
            .with("types", self.types())
            .with("discriminator_field_name", self.discriminator_field_name().to_string())
            .with("discriminator_inlined", self.discriminator_inlined())
            .finish()
    }
}

fn one_of_from_fields<K: DiscriminatorKey + FromNative>(
    mut fields: Fields,
) -> Result<OneOfSchema<K>, ConstraintError> {
    let types: BTreeMap<K, Type> = require(&mut fields, "types")?;
    let field_name: String =
        take(&mut fields, "discriminator_field_name")?.unwrap_or_else(|| DEFAULT_DISCRIMINATOR.to_string());
    let inlined: bool = take(&mut fields, "discriminator_inlined")?.unwrap_or(false);
    OneOfSchema::new(field_name, types)
        .map(|one_of| one_of.with_inlined(inlined))
        .map_err(|e| rejected("one-of", e))
}

/// Add the `type_id` discriminator to a description.
fn tagged(kind: TypeKind, native: Native) -> Native {
    match native {
        Native::Object(mut fields) => {
            fields.insert(TYPE_ID_FIELD.to_string(), Native::String(kind.type_id().to_string()));
            Native::Object(fields)
        }
        other => other,
    }
}

fn bounds<T: FromNative>(fields: &mut Fields) -> Result<(Option<T>, Option<T>), ConstraintError> {
    Ok((take(fields, "min")?, take(fields, "max")?))
}

impl ToNative for Type {
    fn to_native(&self) -> Native {
        match self {
            Type::Bool(_) => Describe::kind(TypeKind::Bool).finish(),
            Type::Pattern(_) => Describe::kind(TypeKind::Pattern).finish(),
            Type::Any(_) => Describe::kind(TypeKind::Any).finish(),
            Type::Int(int) => Describe::kind(TypeKind::Int)
                .maybe("min", int.min())
                .maybe("max", int.max())
                .maybe("units", int.units())
                .finish(),
            Type::Float(float) => Describe::kind(TypeKind::Float)
                .maybe("min", float.min())
                .maybe("max", float.max())
                .maybe("units", float.units())
                .finish(),
            Type::String(string) => Describe::kind(TypeKind::String)
                .maybe("min", string.min())
                .maybe("max", string.max())
                .maybe("pattern", string.pattern())
                .finish(),
            Type::StringEnum(values) => Describe::kind(TypeKind::StringEnum)
                .with("values", values.values())
                .finish(),
            Type::IntEnum(values) => Describe::kind(TypeKind::IntEnum)
                .with("values", values.values())
                .maybe("units", values.units())
                .finish(),
            Type::List(list) => Describe::kind(TypeKind::List)
                .with("items", list.items())
                .maybe("min", list.min())
                .maybe("max", list.max())
                .finish(),
            Type::Map(map) => Describe::kind(TypeKind::Map)
                .with("keys", map.keys())
                .with("values", map.values())
                .maybe("min", map.min())
                .maybe("max", map.max())
                .finish(),
            Type::Object(object) => tagged(TypeKind::Object, object.to_native()),
            Type::Ref(reference) => tagged(TypeKind::Ref, reference.to_native()),
            Type::Scope(scope) => tagged(TypeKind::Scope, scope.to_native()),
            Type::OneOfString(one_of) => tagged(TypeKind::OneOfString, one_of.to_native()),
            Type::OneOfInt(one_of) => tagged(TypeKind::OneOfInt, one_of.to_native()),
        }
    }
}

impl FromNative for Type {
    fn from_native(value: Native) -> Result<Self, ConstraintError> {
        let mut fields = into_fields(value, "type")?;
        let type_id: String = require(&mut fields, TYPE_ID_FIELD)?;
        let Some(kind) = TypeKind::from_type_id(&type_id) else {
            return Err(ConstraintError::new(format!(
                "invalid value '{type_id}', expected one of: {}",
                schemata_core::error::quote_list(TypeKind::ALL.iter().map(|k| k.type_id()))
            ))
            .at(TYPE_ID_FIELD));
        };
        let type_: Type = match kind {
            TypeKind::Bool => BoolSchema::new().into(),
            TypeKind::Pattern => PatternSchema::new().into(),
            TypeKind::Any => AnySchema::new().into(),
            TypeKind::Int => {
                let (min, max) = bounds::<i64>(&mut fields)?;
                let mut int = IntSchema::new();
                if let Some(min) = min {
                    int = int.with_min(min);
                }
                if let Some(max) = max {
                    int = int.with_max(max);
                }
                if let Some(units) = take(&mut fields, "units")? {
                    int = int.with_units(units);
                }
                int.into()
            }
            TypeKind::Float => {
                let (min, max) = bounds::<f64>(&mut fields)?;
                let mut float = FloatSchema::new();
                if let Some(min) = min {
                    float = float.with_min(min);
                }
                if let Some(max) = max {
                    float = float.with_max(max);
                }
                if let Some(units) = take(&mut fields, "units")? {
                    float = float.with_units(units);
                }
                float.into()
            }
            TypeKind::String => {
                let (min, max) = bounds::<i64>(&mut fields)?;
                let mut string = StringSchema::new();
                if let Some(min) = min {
                    string = string.with_min(min);
                }
                if let Some(max) = max {
                    string = string.with_max(max);
                }
                if let Some(pattern) = take::<Pattern>(&mut fields, "pattern")? {
                    string = string.with_pattern(pattern);
                }
                string.into()
            }
            TypeKind::StringEnum => {
                let values: BTreeMap<String, DisplayValue> = require(&mut fields, "values")?;
                StringEnumSchema::new(values).into()
            }
            TypeKind::IntEnum => {
                let values: BTreeMap<i64, DisplayValue> = require(&mut fields, "values")?;
                let mut int_enum = IntEnumSchema::new(values);
                if let Some(units) = take(&mut fields, "units")? {
                    int_enum = int_enum.with_units(units);
                }
                int_enum.into()
            }
            TypeKind::List => {
                let items: Type = require(&mut fields, "items")?;
                let (min, max) = bounds::<i64>(&mut fields)?;
                let mut list = ListSchema::new(items);
                if let Some(min) = min {
                    list = list.with_min(min);
                }
                if let Some(max) = max {
                    list = list.with_max(max);
                }
                list.into()
            }
            TypeKind::Map => {
                let keys: Type = require(&mut fields, "keys")?;
                let values: Type = require(&mut fields, "values")?;
                let (min, max) = bounds::<i64>(&mut fields)?;
                let mut map = MapSchema::new(keys, values).map_err(|e| rejected("map", e))?;
                if let Some(min) = min {
                    map = map.with_min(min);
                }
                if let Some(max) = max {
                    map = map.with_max(max);
                }
                map.into()
            }
            TypeKind::Object => ObjectSchema::from_native(Native::Object(fields))?.into(),
            TypeKind::Scope => ScopeSchema::from_native(Native::Object(fields))?.into(),
            TypeKind::Ref => {
                let id: String = require(&mut fields, "id")?;
                let mut reference = RefSchema::new(id);
                if let Some(display) = take(&mut fields, "display")? {
                    reference = reference.with_display(display);
                }
                reference.into()
            }
            TypeKind::OneOfString => one_of_from_fields::<String>(fields)?.into(),
            TypeKind::OneOfInt => one_of_from_fields::<i64>(fields)?.into(),
        };
        Ok(type_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::units::BYTES;
    use crate::types::Descriptor;

    fn round_trip(type_: Type) -> Type {
        Type::from_native(type_.to_native()).unwrap()
    }

    #[test]
    fn scalars_keep_their_constraints() {
        let Type::Int(int) = round_trip(IntSchema::new().with_min(1).with_units(BYTES.clone()).into()) else {
            panic!("expected an integer");
        };
        assert_eq!(int.min(), Some(1));
        assert_eq!(int.max(), None);
        assert_eq!(int.units(), Some(&*BYTES));

        let Type::String(string) =
            round_trip(StringSchema::new().with_pattern(Pattern::new("^a").unwrap()).into())
        else {
            panic!("expected a string");
        };
        assert_eq!(string.pattern().map(Pattern::as_str), Some("^a"));
    }

    #[test]
    fn type_id_is_recorded() {
        let native = Type::from(ListSchema::new(BoolSchema::new())).to_native();
        assert_eq!(native.get("type_id"), Some(&Native::String("list".into())));
        let items = native.get("items").unwrap();
        assert_eq!(items.get("type_id"), Some(&Native::String("bool".into())));
    }

    #[test]
    fn unknown_type_ids_are_rejected() {
        let err = Type::from_native(Native::object([("type_id", Native::String("tuple".into()))]))
            .unwrap_err();
        assert_eq!(err.path, vec!["type_id"]);
    }

    #[test]
    fn scopes_rebind_after_round_trip() {
        let scope = ScopeSchema::new(
            "A",
            [
                ObjectSchema::new("A", [("b", PropertySchema::new(RefSchema::new("B")).required())]),
                ObjectSchema::new("B", [("x", PropertySchema::new(IntSchema::new()).with_default("1"))]),
            ],
        )
        .unwrap();
        let copy = ScopeSchema::from_native(scope.to_native()).unwrap();
        assert_eq!(copy.root(), "A");
        let decoded = copy
            .decode(&schemata_core::Value::parse_json(r#"{"b": {}}"#).unwrap())
            .unwrap();
        assert_eq!(decoded.get("b").and_then(|b| b.get("x")), Some(&Native::Int(1)));
    }

    #[test]
    fn invalid_map_keys_surface_as_constraint_errors() {
        let native = Native::object([
            ("type_id", Native::String("map".into())),
            ("keys", Type::from(FloatSchema::new()).to_native()),
            ("values", Type::from(BoolSchema::new()).to_native()),
        ]);
        let err = Type::from_native(native).unwrap_err();
        assert!(err.cause.is_some());
    }
}
