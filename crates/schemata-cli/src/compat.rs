//! # Compat Subcommand
//!
//! Checks whether the document given with `--against` can replace the one
//! given with `--file`: every step of `--file` must still exist, its input
//! must accept the new input, and every output it declares must still be
//! produced in a compatible shape.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemata_core::ConstraintError;
use schemata_schema::{Candidate, Descriptor, Schema, ScopeSchema, Type};
use serde::Serialize;

use crate::output::{render, OutputFormat};

/// Arguments for the compat subcommand.
#[derive(Args, Debug)]
pub struct CompatArgs {
    /// The document consumers were written against.
    #[arg(long)]
    pub file: PathBuf,

    /// The candidate replacement document.
    #[arg(long)]
    pub against: PathBuf,
}

/// One incompatibility between two documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    /// Step id.
    pub step: String,
    /// `input`, or `output <id>`; empty when the whole step is missing.
    pub part: String,
    /// Why the candidate does not fit.
    pub error: String,
}

impl Finding {
    fn new(step: &str, part: impl Into<String>, error: impl ToString) -> Self {
        Self {
            step: step.to_string(),
            part: part.into(),
            error: error.to_string(),
        }
    }
}

/// Execute the compat subcommand.
pub fn run_compat(args: &CompatArgs, format: OutputFormat) -> Result<u8> {
    let expected = Schema::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let candidate = Schema::load(&args.against)
        .with_context(|| format!("failed to load {}", args.against.display()))?;
    let findings = compare(&expected, &candidate);
    if findings.is_empty() {
        tracing::info!(steps = expected.steps.len(), "documents are compatible");
        return Ok(0);
    }
    print!("{}", render(&findings, format)?);
    Ok(1)
}

/// Every incompatibility of `candidate` with `expected`.
pub fn compare(expected: &Schema, candidate: &Schema) -> Vec<Finding> {
    let mut findings = Vec::new();
    for (id, step) in &expected.steps {
        let Some(other) = candidate.steps.get(id) else {
            findings.push(Finding::new(id, "", "step is missing"));
            continue;
        };
        if let Err(e) = scope_accepts(&step.input, &other.input) {
            findings.push(Finding::new(id, "input", e));
        }
        for (output_id, output) in &step.outputs {
            let part = format!("output {output_id}");
            match other.outputs.get(output_id) {
                Some(other_output) => {
                    if let Err(e) = scope_accepts(&output.schema, &other_output.schema) {
                        findings.push(Finding::new(id, part, e));
                    }
                }
                None => findings.push(Finding::new(id, part, "output is missing")),
            }
        }
    }
    findings
}

fn scope_accepts(expected: &ScopeSchema, candidate: &ScopeSchema) -> Result<(), ConstraintError> {
    expected.check_compatibility(Candidate::Type(&Type::from(candidate.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::Value;

    fn document(message_type: &str, outputs: &[&str]) -> Schema {
        let outputs: String = outputs
            .iter()
            .map(|id| {
                format!(
                    "      {id}:\n        schema:\n          root: Out\n          objects:\n            Out:\n              id: Out\n              properties: {{}}\n"
                )
            })
            .collect();
        let yaml = format!(
            "steps:\n  say:\n    id: say\n    input:\n      root: In\n      objects:\n        In:\n          id: In\n          properties:\n            message:\n              type:\n                type_id: {message_type}\n    outputs:\n{outputs}"
        );
        Schema::from_value(&Value::parse_yaml(&yaml).unwrap()).unwrap()
    }

    #[test]
    fn identical_documents_are_compatible() {
        let a = document("string", &["success"]);
        assert!(compare(&a, &document("string", &["success"])).is_empty());
    }

    #[test]
    fn changed_input_type_is_reported() {
        let findings = compare(
            &document("string", &["success"]),
            &document("integer", &["success"]),
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].part, "input");
        assert!(findings[0].error.contains("message"), "{}", findings[0].error);
    }

    #[test]
    fn missing_output_is_reported() {
        let findings = compare(
            &document("string", &["success", "error"]),
            &document("string", &["success"]),
        );
        assert_eq!(
            findings,
            vec![Finding::new("say", "output error", "output is missing")]
        );
    }
}
