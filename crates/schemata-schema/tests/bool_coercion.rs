//! # Boolean Coercion Properties
//!
//! Every accepted spelling decodes regardless of case and surrounding
//! whitespace; anything else is rejected.

use proptest::prelude::*;
use schemata_schema::{BoolSchema, Descriptor, Native, Value};

const TRUTHY: [&str; 7] = ["1", "yes", "y", "on", "true", "enable", "enabled"];
const FALSY: [&str; 7] = ["0", "no", "n", "off", "false", "disable", "disabled"];

fn respell(word: &str, upper: &[bool], pad: usize) -> String {
    let cased: String = word
        .chars()
        .zip(upper.iter().cycle())
        .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
        .collect();
    format!("{}{cased}{}", " ".repeat(pad), " ".repeat(pad))
}

proptest! {
    #[test]
    fn truthy_spellings_decode_true(
        word in prop::sample::select(TRUTHY.to_vec()),
        upper in prop::collection::vec(any::<bool>(), 1..8),
        pad in 0usize..3,
    ) {
        let decoded = BoolSchema::new().decode(&Value::from(respell(word, &upper, pad))).unwrap();
        prop_assert_eq!(decoded, Native::Bool(true));
    }

    #[test]
    fn falsy_spellings_decode_false(
        word in prop::sample::select(FALSY.to_vec()),
        upper in prop::collection::vec(any::<bool>(), 1..8),
        pad in 0usize..3,
    ) {
        let decoded = BoolSchema::new().decode(&Value::from(respell(word, &upper, pad))).unwrap();
        prop_assert_eq!(decoded, Native::Bool(false));
    }

    #[test]
    fn other_integers_are_rejected(n in any::<i64>().prop_filter("not 0 or 1", |n| *n != 0 && *n != 1)) {
        prop_assert!(BoolSchema::new().decode(&Value::from(n)).is_err());
        prop_assert!(BoolSchema::new().decode(&Value::from(n.to_string())).is_err());
    }

    #[test]
    fn decoded_values_encode_to_booleans(b in any::<bool>()) {
        let schema = BoolSchema::new();
        let encoded = schema.encode(&schema.decode(&Value::from(b)).unwrap()).unwrap();
        prop_assert_eq!(encoded, Value::Bool(b));
    }
}

#[test]
fn documented_rejections() {
    assert!(BoolSchema::new().decode(&Value::from("2")).is_err());
    assert!(BoolSchema::new().decode(&Value::from(2i64)).is_err());
    assert!(BoolSchema::new().decode(&Value::from("maybe")).is_err());
}
