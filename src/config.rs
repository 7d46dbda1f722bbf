use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::output::OutputFormat;
use crate::error::{Result, SandError};
use crate::header::HeaderConfig;
use crate::validation::ValidationConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub headers: HeaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration: explicit file (or `SANDCHECK_CONFIG`), otherwise
    /// the global file then `./sandcheck.toml`; environment overrides last.
    pub fn load(explicit_path: Option<&Path>, project_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env_string("SANDCHECK_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_dir.join("sandcheck.toml"))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match dirs::config_dir() {
            Some(dir) => Self::load_patch(&dir.join("sandcheck/config.toml")),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SandError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SandError::Config(format!("parse config {}: {err}", path.display())))?;
        debug!(path = %path.display(), "loaded config file");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.validation {
            if let Some(rules) = patch.disabled_rules {
                self.validation.disabled_rules = merge_unique(rules, &self.validation.disabled_rules);
            }
        }
        if let Some(patch) = patch.headers {
            if let Some(value) = patch.weight_for_strategy {
                self.headers.weight_for_strategy = value;
            }
            if let Some(value) = patch.consistent_operation_points {
                self.headers.consistent_operation_points = value;
            }
        }
        if let Some(patch) = patch.output {
            if let Some(format) = patch.format {
                self.output.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(rules) = env_list("SANDCHECK_DISABLED_RULES") {
            self.validation.disabled_rules = merge_unique(rules, &self.validation.disabled_rules);
        }
        if let Some(value) = env_bool("SANDCHECK_HEADERS_WEIGHT_FOR_STRATEGY")? {
            self.headers.weight_for_strategy = value;
        }
        if let Some(value) = env_bool("SANDCHECK_HEADERS_CONSISTENT_OPERATION_POINTS")? {
            self.headers.consistent_operation_points = value;
        }
        if let Some(value) = env_string("SANDCHECK_OUTPUT_FORMAT") {
            self.output.format = parse_output_format(&value)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    validation: Option<ValidationPatch>,
    headers: Option<HeadersPatch>,
    output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidationPatch {
    disabled_rules: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeadersPatch {
    weight_for_strategy: Option<bool>,
    consistent_operation_points: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputPatch {
    format: Option<OutputFormat>,
}

fn merge_unique(values: Vec<String>, existing: &BTreeSet<String>) -> BTreeSet<String> {
    existing.iter().cloned().chain(values).collect()
}

fn parse_output_format(value: &str) -> Result<OutputFormat> {
    match value.to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        _ => Err(SandError::Config(format!(
            "invalid output format {value} (expected human|json)"
        ))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SandError::Config(format!(
            "invalid value {value} for {key} (expected true|false)"
        ))),
    }
}

fn env_bool(key: &str) -> Result<Option<bool>> {
    env_string(key).map(|value| parse_bool(key, &value)).transpose()
}

fn env_list(key: &str) -> Option<Vec<String>> {
    std::env::var(key).ok().map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}
