//! # Units Round-Trip Properties
//!
//! Formatting an integer amount and parsing the result must give the
//! original amount back, for every predefined unit table and in both the
//! short and long forms.

use proptest::prelude::*;
use schemata_core::units::{BYTES, CHARACTERS, DURATION_NANOSECONDS, DURATION_SECONDS, PERCENTAGE};
use schemata_core::Units;

fn tables() -> Vec<&'static Units> {
    vec![&BYTES, &DURATION_NANOSECONDS, &DURATION_SECONDS, &CHARACTERS, &PERCENTAGE]
}

#[test]
fn documented_examples() {
    assert_eq!(BYTES.parse_int("1kB").unwrap(), 1024);
    assert_eq!(BYTES.format_short_int(1024), "1kB");
    assert_eq!(DURATION_SECONDS.format_short_int(330), "5m30s");
    assert_eq!(DURATION_SECONDS.parse_int("5m30s").unwrap(), 330);
}

#[test]
fn zero_round_trips() {
    for table in tables() {
        let short = table.format_short_int(0);
        assert_eq!(table.parse_int(&short).unwrap(), 0, "{short}");
        let long = table.format_long_int(0);
        assert_eq!(table.parse_int(&long).unwrap(), 0, "{long}");
    }
}

proptest! {
    #[test]
    fn short_int_round_trips(amount in -1_000_000_000_000_i64..1_000_000_000_000_i64) {
        for table in tables() {
            let text = table.format_short_int(amount);
            prop_assert_eq!(table.parse_int(&text).unwrap(), amount, "{}", text);
        }
    }

    #[test]
    fn long_int_round_trips(amount in 0_i64..10_000_000_000_i64) {
        for table in tables() {
            let text = table.format_long_int(amount);
            prop_assert_eq!(table.parse_int(&text).unwrap(), amount, "{}", text);
        }
    }

    #[test]
    fn byte_sizes_in_whole_kilobytes_format_without_remainder(kb in 1_i64..1024) {
        let text = BYTES.format_short_int(kb * 1024);
        prop_assert_eq!(text, format!("{kb}kB"));
    }
}
