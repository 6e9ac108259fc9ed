//! # Self-Describing Bootstrap
//!
//! The descriptor algebra described with itself. [`SCOPE_SCHEMA`] is a scope
//! with one object per descriptor kind (`IntSchema`, `ListSchema`,
//! `OneOfStringSchema`, ...). Every position that can hold an arbitrary
//! descriptor is a string OneOf on `type_id`, with external discriminators,
//! whose members are refs to those objects.
//!
//! [`SCHEMA_SCHEMA`] adds the step-level objects (`Schema`, `StepSchema`,
//! `StepOutputSchema`) on top, and is what [`crate::Schema`] documents are
//! loaded and written with.
//!
//! Both are built once per process. A failure to build them is a defect in
//! this module and panics.

use once_cell::sync::Lazy;
use schemata_core::{BadArgumentError, ConstraintError, Value};

use crate::describe::TYPE_ID_FIELD;
use crate::display::DisplayValue;
use crate::native::{FromNative, ToNative};
use crate::types::{
    BoolSchema, Descriptor, FloatSchema, IntSchema, ListSchema, MapSchema, ObjectSchema,
    OneOfStringSchema, PatternSchema, PropertySchema, RefSchema, ScopeSchema, StringSchema, Type,
    TypeKind,
};

/// The scope describing every descriptor kind, rooted at `ScopeSchema`.
pub static SCOPE_SCHEMA: Lazy<ScopeSchema> = Lazy::new(|| match build_scope_schema() {
    Ok(scope) => scope,
    Err(e) => panic!("built-in scope schema is malformed: {e}"),
});

/// The scope describing a full step schema document, rooted at `Schema`.
pub static SCHEMA_SCHEMA: Lazy<ScopeSchema> = Lazy::new(|| match build_schema_schema() {
    Ok(scope) => scope,
    Err(e) => panic!("built-in step schema is malformed: {e}"),
});

/// Bootstrap object id describing each descriptor kind.
pub fn object_id(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Bool => "BoolSchema",
        TypeKind::Int => "IntSchema",
        TypeKind::Float => "FloatSchema",
        TypeKind::String => "StringSchema",
        TypeKind::Pattern => "PatternSchema",
        TypeKind::StringEnum => "StringEnumSchema",
        TypeKind::IntEnum => "IntEnumSchema",
        TypeKind::List => "ListSchema",
        TypeKind::Map => "MapSchema",
        TypeKind::Object => "ObjectSchema",
        TypeKind::Ref => "RefSchema",
        TypeKind::Scope => "ScopeSchema",
        TypeKind::OneOfString => "OneOfStringSchema",
        TypeKind::OneOfInt => "OneOfIntSchema",
        TypeKind::Any => "AnySchema",
    }
}

/// Serialize a scope through the bootstrap.
pub fn describe_scope(scope: &ScopeSchema) -> Result<Value, ConstraintError> {
    SCOPE_SCHEMA.encode(&scope.to_native())
}

/// Load a scope from its serialized description.
pub fn scope_from_value(data: &Value) -> Result<ScopeSchema, ConstraintError> {
    ScopeSchema::from_native(SCOPE_SCHEMA.decode(data)?)
}

/// The bound bootstrap descriptor for an arbitrary descriptor.
fn type_descriptor() -> &'static Type {
    match SCOPE_SCHEMA
        .object(object_id(TypeKind::List))
        .and_then(|list| list.property("items"))
    {
        Some(items) => items.type_(),
        None => panic!("built-in scope schema has no ListSchema.items property"),
    }
}

/// Serialize any descriptor through the bootstrap.
pub fn describe_type(type_: &Type) -> Result<Value, ConstraintError> {
    type_descriptor().encode(&type_.to_native())
}

/// Load any descriptor from its serialized description.
pub fn type_from_value(data: &Value) -> Result<Type, ConstraintError> {
    Type::from_native(type_descriptor().decode(data)?)
}

fn display(name: &str, description: &str) -> DisplayValue {
    DisplayValue::named(name).with_description(description)
}

fn prop(type_: impl Into<Type>, name: &str, description: &str) -> PropertySchema {
    PropertySchema::new(type_).with_display(display(name, description))
}

fn object<const N: usize>(id: &str, properties: [(&str, PropertySchema); N]) -> ObjectSchema {
    ObjectSchema::new(id, properties)
}

fn by_type_id(kinds: &[TypeKind]) -> Result<Type, BadArgumentError> {
    let members = kinds.iter().map(|kind| -> (String, Type) {
        (kind.type_id().to_string(), RefSchema::new(object_id(*kind)).into())
    });
    Ok(OneOfStringSchema::new(TYPE_ID_FIELD, members)?.into())
}

fn any_type() -> Result<Type, BadArgumentError> {
    by_type_id(&TypeKind::ALL)
}

fn key_type() -> Result<Type, BadArgumentError> {
    by_type_id(&[
        TypeKind::String,
        TypeKind::Int,
        TypeKind::StringEnum,
        TypeKind::IntEnum,
    ])
}

fn object_type() -> Result<Type, BadArgumentError> {
    by_type_id(&[TypeKind::Object, TypeKind::Ref, TypeKind::Scope])
}

fn size_bounds(what: &str) -> [(&'static str, PropertySchema); 2] {
    [
        (
            "min",
            prop(IntSchema::new().with_min(0), "Minimum", &format!("Minimum number of {what}.")),
        ),
        (
            "max",
            prop(IntSchema::new().with_min(0), "Maximum", &format!("Maximum number of {what}.")),
        ),
    ]
}

fn names() -> ListSchema {
    ListSchema::new(StringSchema::new().with_min(1))
}

fn string_map(values: impl Into<Type>) -> Result<MapSchema, BadArgumentError> {
    MapSchema::new(StringSchema::new().with_min(1), values)
}

fn descriptor_objects() -> Result<Vec<ObjectSchema>, BadArgumentError> {
    let display_ref = || RefSchema::new("Display");
    let units_ref = || RefSchema::new("Units");

    let list = ObjectSchema::new(
        "ListSchema",
        [("items", prop(any_type()?, "Items", "Descriptor of every list item.").required())]
            .into_iter()
            .chain(size_bounds("items")),
    );

    let map = ObjectSchema::new(
        "MapSchema",
        [
            ("keys", prop(key_type()?, "Keys", "Descriptor of the map keys.").required()),
            ("values", prop(any_type()?, "Values", "Descriptor of the map values.").required()),
        ]
        .into_iter()
        .chain(size_bounds("entries")),
    );

    Ok(vec![
        object("Display", [
            ("name", prop(StringSchema::new().with_min(1), "Name", "Short human-readable name.")),
            ("description", prop(StringSchema::new().with_min(1), "Description", "Longer description, may contain Markdown.")),
            ("icon", prop(StringSchema::new().with_min(1), "Icon", "SVG icon markup.")),
        ]),
        object("Unit", [
            ("name_short_singular", prop(StringSchema::new().with_min(1), "Short singular", "Short name for one unit, e.g. 'B'.").required()),
            ("name_short_plural", prop(StringSchema::new().with_min(1), "Short plural", "Short name for several units, e.g. 'B'.").required()),
            ("name_long_singular", prop(StringSchema::new().with_min(1), "Long singular", "Long name for one unit, e.g. 'byte'.").required()),
            ("name_long_plural", prop(StringSchema::new().with_min(1), "Long plural", "Long name for several units, e.g. 'bytes'.").required()),
        ]),
        object("Units", [
            ("base_unit", prop(RefSchema::new("Unit"), "Base unit", "The smallest unit amounts are counted in.").required()),
            ("multipliers", prop(
                MapSchema::new(IntSchema::new().with_min(2), RefSchema::new("Unit"))?,
                "Multipliers",
                "Larger units, keyed by how many base units each one is worth.",
            )),
        ]),
        object("AnySchema", []),
        object("BoolSchema", []),
        object("PatternSchema", []),
        object("IntSchema", [
            ("min", prop(IntSchema::new(), "Minimum", "Inclusive lower bound.")),
            ("max", prop(IntSchema::new(), "Maximum", "Inclusive upper bound.")),
            ("units", prop(units_ref(), "Units", "Units used to parse and display amounts.")),
        ]),
        object("FloatSchema", [
            ("min", prop(FloatSchema::new(), "Minimum", "Inclusive lower bound.")),
            ("max", prop(FloatSchema::new(), "Maximum", "Inclusive upper bound.")),
            ("units", prop(units_ref(), "Units", "Units used to parse and display amounts.")),
        ]),
        object("StringSchema", [
            ("min", prop(IntSchema::new().with_min(0), "Minimum", "Minimum length in characters.")),
            ("max", prop(IntSchema::new().with_min(0), "Maximum", "Maximum length in characters.")),
            ("pattern", prop(PatternSchema::new(), "Pattern", "Regular expression the string must match.")),
        ]),
        object("StringEnumSchema", [(
            "values",
            prop(string_map(display_ref())?.with_min(1), "Values", "Accepted values and their display metadata.").required(),
        )]),
        object("IntEnumSchema", [
            ("values", prop(
                MapSchema::new(IntSchema::new(), display_ref())?.with_min(1),
                "Values",
                "Accepted values and their display metadata.",
            ).required()),
            ("units", prop(units_ref(), "Units", "Units used to parse and display values.")),
        ]),
        list,
        map,
        object("ObjectSchema", [
            ("id", prop(StringSchema::new().with_min(1), "ID", "Object id, unique within its scope.").required()),
            ("properties", prop(string_map(RefSchema::new("PropertySchema"))?, "Properties", "Properties by id.").required()),
        ]),
        object("PropertySchema", [
            ("type", prop(any_type()?, "Type", "Descriptor of the property value.").required()),
            ("display", prop(display_ref(), "Display", "Human-readable metadata.")),
            ("required", prop(BoolSchema::new(), "Required", "The property must always be set.").with_default("false")),
            ("required_if", prop(names(), "Required if", "The property must be set when any of these is set.")),
            ("required_if_not", prop(names(), "Required if not", "The property must be set when none of these is set.")),
            ("conflicts", prop(names(), "Conflicts", "The property must not be set together with any of these.")),
            ("default", prop(StringSchema::new(), "Default", "Default value, encoded as JSON.")),
            ("examples", prop(ListSchema::new(StringSchema::new()), "Examples", "Example values, encoded as JSON.")),
        ]),
        object("RefSchema", [
            ("id", prop(StringSchema::new().with_min(1), "ID", "Id of the referenced object.").required()),
            ("display", prop(display_ref(), "Display", "Human-readable metadata.")),
        ]),
        object("ScopeSchema", [
            ("objects", prop(string_map(RefSchema::new("ObjectSchema"))?, "Objects", "Objects of the scope by id.").required()),
            ("root", prop(StringSchema::new().with_min(1), "Root", "Id of the root object.").required()),
        ]),
        one_of_object("OneOfStringSchema", StringSchema::new().with_min(1).into())?,
        one_of_object("OneOfIntSchema", IntSchema::new().into())?,
    ])
}

fn one_of_object(id: &str, key: Type) -> Result<ObjectSchema, BadArgumentError> {
    Ok(object(id, [
        ("types", prop(MapSchema::new(key, object_type()?)?.with_min(1), "Types", "Member objects by discriminator value.").required()),
        ("discriminator_field_name", prop(StringSchema::new().with_min(1), "Discriminator field", "Field holding the discriminator.").with_default("\"_type\"")),
        ("discriminator_inlined", prop(BoolSchema::new(), "Discriminator inlined", "Members declare the discriminator field themselves.").with_default("false")),
    ]))
}

fn step_objects() -> Result<Vec<ObjectSchema>, BadArgumentError> {
    let display_ref = || RefSchema::new("Display");
    Ok(vec![
        object("Schema", [(
            "steps",
            prop(string_map(RefSchema::new("StepSchema"))?, "Steps", "Steps by id.").required(),
        )]),
        object("StepSchema", [
            ("id", prop(StringSchema::new().with_min(1), "ID", "Step id.").required()),
            ("display", prop(display_ref(), "Display", "Human-readable metadata.")),
            ("input", prop(RefSchema::new("ScopeSchema"), "Input", "Schema of the step input.").required()),
            ("outputs", prop(string_map(RefSchema::new("StepOutputSchema"))?.with_min(1), "Outputs", "Possible outputs by id.").required()),
        ]),
        object("StepOutputSchema", [
            ("schema", prop(RefSchema::new("ScopeSchema"), "Schema", "Schema of the output data.").required()),
            ("display", prop(display_ref(), "Display", "Human-readable metadata.")),
            ("error", prop(BoolSchema::new(), "Error", "The output reports a failure.").with_default("false")),
        ]),
    ])
}

fn build_scope_schema() -> Result<ScopeSchema, BadArgumentError> {
    let scope = ScopeSchema::new(object_id(TypeKind::Scope), descriptor_objects()?)?;
    tracing::debug!(objects = scope.objects().len(), "scope bootstrap built");
    Ok(scope)
}

fn build_schema_schema() -> Result<ScopeSchema, BadArgumentError> {
    let mut objects = descriptor_objects()?;
    objects.extend(step_objects()?);
    let scope = ScopeSchema::new("Schema", objects)?;
    tracing::debug!(objects = scope.objects().len(), "step schema bootstrap built");
    Ok(scope)
}
