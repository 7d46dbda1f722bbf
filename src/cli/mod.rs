//! Command-line interface.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

pub mod commands;
pub mod output;

pub use commands::Commands;
pub use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "sandcheck",
    version,
    about = "Conformance checker for MPEG-DASH SAND messages, MPDs and HTTP headers"
)]
pub struct Cli {
    /// Emit JSON on stdout
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the global and project files)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}
