use crate::cli::{Cli, OutputFormat};
use crate::config::Config;
use crate::error::Result;

pub struct AppContext {
    pub config: Config,
    pub output_format: OutputFormat,
    pub verbosity: u8,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let project_dir = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &project_dir)?;
        let output_format = if cli.robot {
            OutputFormat::Json
        } else {
            config.output.format
        };

        Ok(Self {
            config,
            output_format,
            verbosity: cli.verbose,
        })
    }
}
