//! # schemata-core: Foundational Types for schemata
//!
//! This crate is the leaf of the schemata workspace. It defines the pieces
//! every descriptor needs but that know nothing about descriptors:
//!
//! 1. **The generic value model.** [`Value`] is the dynamic shape that comes
//!    off the wire or out of a YAML/JSON document: scalars, lists and maps.
//!    Maps are ordered and may carry non-string keys.
//!
//! 2. **The error taxonomy.** [`ConstraintError`] is the single carrier of
//!    data-dependent validation failures and always knows the path from the
//!    root of the document to the offending node. [`BadArgumentError`] is
//!    reserved for schema-author mistakes discovered at construction time.
//!
//! 3. **The units sub-language.** [`Units`] parses and formats scaled numeric
//!    strings such as `"1kB"` or `"5m30s"`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemata-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod units;
pub mod value;

pub use error::{BadArgumentError, ConstraintError, SchemataError, UnitParseError};
pub use units::{Number, Unit, Units};
pub use value::Value;
