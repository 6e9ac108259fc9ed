//! # schemata CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use schemata_cli::compat::{run_compat, CompatArgs};
use schemata_cli::output::OutputFormat;
use schemata_cli::print::{run_describe, run_print, run_step_schema, PrintArgs, StepSchemaArgs};
use schemata_cli::validate::{run_validate, ValidateArgs};

/// Step schema toolchain.
///
/// Prints step schema documents in canonical form, validates run data
/// against them and checks whether a revised document can replace an
/// older one.
#[derive(Parser, Debug)]
#[command(name = "schemata", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a step schema document in canonical form.
    Print(PrintArgs),

    /// Print the scope describing every descriptor kind.
    Describe,

    /// Print the schema of one step.
    StepSchema(StepSchemaArgs),

    /// Validate run data against a step input or output.
    Validate(ValidateArgs),

    /// Check that a revised document can replace the original.
    Compat(CompatArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "schemata CLI starting");

    let result = match &cli.command {
        Commands::Print(args) => run_print(args, cli.format),
        Commands::Describe => run_describe(cli.format),
        Commands::StepSchema(args) => run_step_schema(args),
        Commands::Validate(args) => run_validate(args, cli.format),
        Commands::Compat(args) => run_compat(args, cli.format),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
