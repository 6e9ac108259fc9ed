//! Rendering of results as YAML or JSON.

use anyhow::{Context, Result};
use clap::ValueEnum;
use schemata_core::Value;
use serde::Serialize;

/// Output format for printed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML, keys in canonical order.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}

/// Render a generic value. JSON output stringifies non-string map keys.
pub fn render_value(value: &Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(value).context("failed to render YAML"),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&value.to_json()).context("failed to render JSON")
        }
    }
}

/// Render any serializable report.
pub fn render<T: Serialize>(report: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yaml::to_string(report).context("failed to render YAML"),
        OutputFormat::Json => serde_json::to_string_pretty(report).context("failed to render JSON"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_keys_survive_json() {
        let value: Value = [(1i64, "one"), (2, "two")].into_iter().collect();
        let json = render_value(&value, OutputFormat::Json).unwrap();
        assert!(json.contains("\"1\": \"one\""), "{json}");
        let yaml = render_value(&value, OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("1: one"), "{yaml}");
    }
}
