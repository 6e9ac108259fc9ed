//! # Self-Description
//!
//! A scope serialized through the bootstrap and loaded back behaves like
//! the original, and the bootstrap can describe itself.

use schemata_core::units::BYTES;
use schemata_schema::bootstrap::{describe_scope, scope_from_value, SCOPE_SCHEMA};
use schemata_schema::types::DEFAULT_DISCRIMINATOR;
use schemata_schema::{
    Descriptor, DisplayValue, IntSchema, MapSchema, ObjectSchema, OneOfStringSchema,
    PropertySchema, RefSchema, ScopeSchema, StringEnumSchema, StringSchema, Type, Value,
};

fn volume_scope() -> ScopeSchema {
    let source = OneOfStringSchema::new(
        DEFAULT_DISCRIMINATOR,
        [
            ("host".to_string(), Type::from(RefSchema::new("HostPath"))),
            ("tmpfs".to_string(), Type::from(RefSchema::new("Tmpfs"))),
        ],
    )
    .unwrap();
    ScopeSchema::new(
        "Volume",
        [
            ObjectSchema::new(
                "Volume",
                [
                    ("source", PropertySchema::new(source).required()),
                    (
                        "mode",
                        PropertySchema::new(StringEnumSchema::new([
                            ("ro", DisplayValue::named("Read only")),
                            ("rw", DisplayValue::named("Read write")),
                        ]))
                        .with_default("\"rw\""),
                    ),
                    (
                        "labels",
                        PropertySchema::new(MapSchema::new(StringSchema::new(), StringSchema::new()).unwrap())
                            .conflicts(["mode"]),
                    ),
                ],
            ),
            ObjectSchema::new("HostPath", [("path", PropertySchema::new(StringSchema::new().with_min(1)).required())]),
            ObjectSchema::new(
                "Tmpfs",
                [("size", PropertySchema::new(IntSchema::new().with_units(BYTES.clone()).with_max(1 << 30)))],
            ),
        ],
    )
    .unwrap()
}

#[test]
fn described_scope_decodes_like_the_original() {
    let original = volume_scope();
    let described = describe_scope(&original).unwrap();
    let reloaded = scope_from_value(&described).unwrap();

    let data = Value::parse_json(r#"{"source": {"_type": "tmpfs", "size": "64MB"}}"#).unwrap();
    assert_eq!(original.decode(&data).unwrap(), reloaded.decode(&data).unwrap());

    let too_big = Value::parse_json(r#"{"source": {"_type": "tmpfs", "size": "2GB"}}"#).unwrap();
    let a = original.decode(&too_big).unwrap_err();
    let b = reloaded.decode(&too_big).unwrap_err();
    assert_eq!(a.path, b.path);
    assert_eq!(a.message, b.message);

    assert_eq!(describe_scope(&reloaded).unwrap(), described);
}

#[test]
fn described_scope_is_plain_data() {
    let described = describe_scope(&volume_scope()).unwrap();
    let source_type = described
        .get("objects")
        .and_then(|objects| objects.get("Volume"))
        .and_then(|volume| volume.get("properties"))
        .and_then(|properties| properties.get("source"))
        .and_then(|source| source.get("type"))
        .unwrap();
    assert_eq!(source_type.get("type_id"), Some(&Value::from("one_of_string")));
    assert_eq!(source_type.get("discriminator_field_name"), Some(&Value::from("_type")));
}

#[test]
fn bootstrap_is_a_fixed_point() {
    let described = describe_scope(&SCOPE_SCHEMA).unwrap();
    let reloaded = scope_from_value(&described).unwrap();
    assert_eq!(describe_scope(&reloaded).unwrap(), described);
}
