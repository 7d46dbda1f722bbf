//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - run() function to execute the command

use clap::Subcommand;

pub mod header;
pub mod rules;
pub mod validate;
pub mod vectors;

use crate::app::AppContext;
use crate::error::Result;

pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Validate(args) => validate::run(ctx, args),
        Commands::Header(args) => header::run(ctx, args),
        Commands::Vectors(args) => vectors::run(ctx, args),
        Commands::Rules(args) => rules::run(ctx, args),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate SAND messages or MPDs against the conformance rules
    Validate(validate::ValidateArgs),

    /// Check SAND messages carried as HTTP headers
    Header(header::HeaderArgs),

    /// Run a test-vector tree and compare verdicts with file names
    Vectors(vectors::VectorsArgs),

    /// List the conformance rules
    Rules(rules::RulesArgs),
}
