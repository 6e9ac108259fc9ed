//! # Print Subcommands
//!
//! `print` re-serializes a step schema document through the bootstrap,
//! which normalizes it: defaults are filled in and scalar spellings are
//! canonical. `describe` prints the bootstrap scope itself.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemata_schema::bootstrap::{describe_scope, SCOPE_SCHEMA};
use schemata_schema::Schema;

use crate::output::{render_value, OutputFormat};

/// Arguments for the print subcommand.
#[derive(Args, Debug)]
pub struct PrintArgs {
    /// Step schema document (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub file: PathBuf,
}

/// Arguments for the step-schema subcommand.
#[derive(Args, Debug)]
pub struct StepSchemaArgs {
    /// Step schema document.
    #[arg(long)]
    pub file: PathBuf,

    /// Step id.
    #[arg(long)]
    pub step: String,
}

/// Print a step schema document in canonical form.
pub fn run_print(args: &PrintArgs, format: OutputFormat) -> Result<u8> {
    let schema = Schema::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let value = schema.to_value().context("failed to serialize schema")?;
    print!("{}", terminated(render_value(&value, format)?));
    Ok(0)
}

/// Print the scope describing every descriptor kind.
pub fn run_describe(format: OutputFormat) -> Result<u8> {
    let value = describe_scope(&SCOPE_SCHEMA).context("failed to describe the bootstrap")?;
    print!("{}", terminated(render_value(&value, format)?));
    Ok(0)
}

/// Printing one step on its own is not supported.
pub fn run_step_schema(args: &StepSchemaArgs) -> Result<u8> {
    tracing::debug!(file = %args.file.display(), step = %args.step, "step-schema requested");
    eprintln!("printing the schema of a single step is not supported");
    Ok(2)
}

fn terminated(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_schema_is_a_placeholder() {
        let args = StepSchemaArgs {
            file: PathBuf::from("plugin.yaml"),
            step: "greet".into(),
        };
        assert_eq!(run_step_schema(&args).unwrap(), 2);
    }

    #[test]
    fn print_fails_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = PrintArgs {
            file: dir.path().join("missing.yaml"),
        };
        let err = run_print(&args, OutputFormat::Yaml).unwrap_err();
        assert!(format!("{err:#}").contains("missing.yaml"));
    }

    #[test]
    fn json_output_is_newline_terminated() {
        assert_eq!(terminated("{}".into()), "{}\n");
        assert_eq!(terminated("a: 1\n".into()), "a: 1\n");
    }
}
