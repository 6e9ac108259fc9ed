//! # schemata-cli: Command-Line Tool for Step Schemas
//!
//! Provides the `schemata` binary. Argument parsing lives in `main.rs`;
//! the handlers here only load documents, call into `schemata-schema` and
//! print results.
//!
//! ## Subcommands
//!
//! - `schemata print`: decode a step schema document and print it in
//!   canonical form.
//! - `schemata describe`: print the scope that describes every descriptor.
//! - `schemata step-schema`: print the schema of a single step (not
//!   supported, exits 2).
//! - `schemata validate`: decode run data against a step input or output.
//! - `schemata compat`: check that one document can stand in for another.
//!
//! ```bash
//! schemata print --file plugin.yaml --format json
//! schemata validate --file plugin.yaml --step greet --input run.json
//! schemata compat --file v1.yaml --against v2.yaml
//! ```

pub mod compat;
pub mod output;
pub mod print;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use schemata_core::Value;

/// Read a JSON or YAML data file, chosen by extension: `.json` is JSON,
/// anything else is YAML.
pub fn read_value(path: &Path) -> Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let value = if path.extension().is_some_and(|ext| ext == "json") {
        Value::parse_json(&text).with_context(|| format!("invalid JSON in {}", path.display()))?
    } else {
        Value::parse_yaml(&text).with_context(|| format!("invalid YAML in {}", path.display()))?
    };
    tracing::debug!(path = %path.display(), kind = value.type_name(), "data file read");
    Ok(value)
}
