//! # Step Schema Documents
//!
//! Loads a plugin step schema from disk and drives one run through it:
//! input decoding with defaults, units and a discriminated union, then
//! output encoding.

use std::path::PathBuf;

use schemata_schema::{Native, Schema, SchemataError, Value};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn loads_yaml_document() {
    let schema = Schema::load(fixture("greeter.yaml")).unwrap();
    let step = schema.step("greet").unwrap();
    assert_eq!(step.input.root(), "Input");
    assert_eq!(step.input.objects().len(), 3);
    assert_eq!(step.outputs.keys().collect::<Vec<_>>(), ["error", "success"]);
}

#[test]
fn run_input_is_coerced() {
    let schema = Schema::load(fixture("greeter.yaml")).unwrap();
    let step = schema.step("greet").unwrap();

    let input = step
        .decode_input(
            &Value::parse_json(
                r#"{"name": "Ada", "timeout": "2m", "greeting": {"kind": "casual", "emoji": "yes"}}"#,
            )
            .unwrap(),
        )
        .unwrap();
    assert_eq!(input.get("timeout"), Some(&Native::Int(120)));
    let greeting = input.get("greeting").unwrap();
    assert_eq!(greeting.get("emoji"), Some(&Native::Bool(true)));

    let defaulted = step
        .decode_input(&Value::parse_json(r#"{"name": "Ada"}"#).unwrap())
        .unwrap();
    assert_eq!(defaulted.get("timeout"), Some(&Native::Int(30)));
}

#[test]
fn run_input_errors_point_at_the_field() {
    let schema = Schema::load(fixture("greeter.yaml")).unwrap();
    let step = schema.step("greet").unwrap();
    let err = step
        .decode_input(&Value::parse_json(r#"{"name": ""}"#).unwrap())
        .unwrap_err();
    assert_eq!(err.path, vec!["name"]);

    let err = step
        .decode_input(
            &Value::parse_json(r#"{"name": "Ada", "greeting": {"kind": "rude"}}"#).unwrap(),
        )
        .unwrap_err();
    assert_eq!(err.path, vec!["greeting", "kind"]);
    assert!(err.message.contains("'casual', 'formal'"), "{err}");
}

#[test]
fn outputs_are_encoded_by_id() {
    let schema = Schema::load(fixture("greeter.yaml")).unwrap();
    let step = schema.step("greet").unwrap();
    let output = Native::object([("message", Native::String("Hello Ada".into()))]);
    let encoded = step.encode_output("success", &output).unwrap();
    assert_eq!(encoded, Value::parse_json(r#"{"message": "Hello Ada"}"#).unwrap());

    let err = step.encode_output("error", &output).unwrap_err();
    assert_eq!(err.path.first().map(String::as_str), Some("error"));
}

#[test]
fn document_survives_a_round_trip() {
    let schema = Schema::load(fixture("greeter.yaml")).unwrap();
    let value = schema.to_value().unwrap();
    let reloaded = Schema::from_value(&value).unwrap();
    assert_eq!(reloaded.to_value().unwrap(), value);
}

#[test]
fn malformed_documents_are_rejected() {
    let err = Schema::from_value(&Value::parse_json(r#"{"steps": {"a": {"id": "a"}}}"#).unwrap())
        .unwrap_err();
    assert_eq!(err.path, vec!["steps", "[a]", "input"]);

    let missing = Schema::load(fixture("does-not-exist.yaml")).unwrap_err();
    assert!(matches!(missing, SchemataError::Io(_)));
}
