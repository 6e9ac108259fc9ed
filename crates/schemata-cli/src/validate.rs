//! # Validate Subcommand
//!
//! Decodes one run's data against a step input (or, with `--output`, one of
//! its outputs) and prints the normalized encoding. A constraint violation
//! is reported on stderr and exits 1.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use schemata_core::{ConstraintError, Value};
use schemata_schema::{Descriptor, Schema, ScopeSchema};

use crate::output::{render_value, OutputFormat};
use crate::read_value;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Step schema document.
    #[arg(long)]
    pub file: PathBuf,

    /// Step id.
    #[arg(long)]
    pub step: String,

    /// Data file to validate (YAML, or JSON with a `.json` extension).
    #[arg(long)]
    pub input: PathBuf,

    /// Validate against this output instead of the step input.
    #[arg(long)]
    pub output: Option<String>,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, format: OutputFormat) -> Result<u8> {
    let schema = Schema::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;
    let data = read_value(&args.input)?;
    match normalize(&schema, args, &data)? {
        Ok(value) => {
            let mut text = render_value(&value, format)?;
            if !text.ends_with('\n') {
                text.push('\n');
            }
            print!("{text}");
            Ok(0)
        }
        Err(err) => {
            eprintln!("{}: {err}", args.input.display());
            Ok(1)
        }
    }
}

/// Decode and re-encode `data`. Lookup failures (unknown step or output)
/// are errors of the invocation; constraint violations of the data are
/// returned in the inner result.
pub fn normalize(
    schema: &Schema,
    args: &ValidateArgs,
    data: &Value,
) -> Result<Result<Value, ConstraintError>> {
    let step = schema.step(&args.step)?;
    let scope: &ScopeSchema = match &args.output {
        Some(output_id) => &step.output(output_id)?.schema,
        None => &step.input,
    };
    tracing::info!(step = %step.id, output = ?args.output, "validating");
    Ok(scope.decode(data).and_then(|native| scope.encode(&native)))
}
