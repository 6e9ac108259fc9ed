//! # Typed Records
//!
//! Plain Rust structs bound to a scope through `impl_record!`: nested
//! records, optional fields, tagged fields and lists of records.

use schemata_schema::{
    impl_record, BoolSchema, IntSchema, ListSchema, Native, ObjectSchema, PropertySchema,
    RefSchema, ScopeSchema, StringSchema, TypedObject, Value,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Port {
    number: i64,
    public: bool,
}

impl_record!(Port { number, public => "expose" });

#[derive(Debug, Default, Clone, PartialEq)]
struct Container {
    image: String,
    command: Option<String>,
    ports: Vec<Port>,
}

impl_record!(Container { image, command, ports });

fn container_scope() -> ScopeSchema {
    ScopeSchema::new(
        "Container",
        [
            ObjectSchema::new(
                "Container",
                [
                    ("image", PropertySchema::new(StringSchema::new().with_min(1)).required()),
                    ("command", PropertySchema::new(StringSchema::new())),
                    ("ports", PropertySchema::new(ListSchema::new(RefSchema::new("Port"))).with_default("[]")),
                ],
            ),
            ObjectSchema::new(
                "Port",
                [
                    ("number", PropertySchema::new(IntSchema::new().with_min(1).with_max(65535)).required()),
                    ("expose", PropertySchema::new(BoolSchema::new()).with_default("false")),
                ],
            ),
        ],
    )
    .unwrap()
}

#[test]
fn decodes_nested_records() {
    let typed = TypedObject::<Container>::from_scope(container_scope()).unwrap();
    let container = typed
        .decode(
            &Value::parse_json(
                r#"{"image": "nginx", "ports": [{"number": "80", "expose": "yes"}, {"number": 9090}]}"#,
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(
        container,
        Container {
            image: "nginx".into(),
            command: None,
            ports: vec![
                Port { number: 80, public: true },
                Port { number: 9090, public: false },
            ],
        }
    );
}

#[test]
fn encodes_records_without_unset_options() {
    let typed = TypedObject::<Container>::from_scope(container_scope()).unwrap();
    let container = Container {
        image: "redis".into(),
        command: None,
        ports: vec![Port { number: 6379, public: false }],
    };
    let encoded = typed.encode(&container).unwrap();
    assert_eq!(
        encoded,
        Value::parse_json(r#"{"image": "redis", "ports": [{"number": 6379, "expose": false}]}"#)
            .unwrap()
    );
    assert_eq!(typed.decode(&encoded).unwrap(), container);
}

#[test]
fn record_errors_carry_paths() {
    let typed = TypedObject::<Container>::from_scope(container_scope()).unwrap();
    let err = typed
        .encode(&Container {
            image: "nginx".into(),
            command: Some("run".into()),
            ports: vec![Port { number: 70000, public: true }],
        })
        .unwrap_err();
    assert_eq!(err.path, vec!["ports", "[0]", "number"]);
}

#[test]
fn unmatched_property_is_a_bad_argument() {
    let object = ObjectSchema::new(
        "Port",
        [
            ("number", PropertySchema::new(IntSchema::new()).required()),
            ("protocol", PropertySchema::new(StringSchema::new())),
        ],
    );
    let err = TypedObject::<Port>::new(object).unwrap_err();
    assert!(err.message.contains("protocol"), "{err}");
}

#[test]
fn unbound_native_property_is_rejected() {
    let typed = TypedObject::<Container>::from_scope(container_scope()).unwrap();
    let err = typed
        .from_native(Native::object([
            ("image", Native::String("nginx".into())),
            ("extra", Native::Bool(true)),
        ]))
        .unwrap_err();
    assert_eq!(err.path, vec!["extra"]);
    assert!(err.message.contains("'image'"), "{err}");
}
