//! sandcheck - SAND conformance checker CLI
//!
//! Validate SAND messages, MPDs and SAND HTTP headers.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sandcheck::app::AppContext;
use sandcheck::cli::output::{emit_json, robot_error};
use sandcheck::cli::{Cli, OutputFormat};
use sandcheck::{Result, SandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Findings were already written with the command output.
        Err(SandError::ValidationFailed(msg)) => {
            tracing::debug!(%msg, "validation failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            if cli.robot {
                let code = match &e {
                    SandError::MalformedDocument(_) => "malformed_document",
                    SandError::UnsupportedDocument(_) => "unsupported_document",
                    SandError::NotFound(_) => "not_found",
                    SandError::Config(_) => "config",
                    _ => "error",
                };
                if emit_json(&robot_error(code, e.to_string())).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    tracing::debug!(
        format = ?ctx.output_format,
        robot = ctx.output_format == OutputFormat::Json,
        verbosity = ctx.verbosity,
        "starting"
    );
    sandcheck::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,sandcheck=debug",
        2 => "debug,sandcheck=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.robot {
        // JSON logging for robot mode
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
