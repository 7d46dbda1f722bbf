use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::style;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SandError};

/// How command results are written to stdout.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Styled text for terminals
    #[default]
    Human,
    /// JSON envelope for programmatic consumption
    Json,
}

#[derive(Serialize)]
pub struct RobotResponse<T> {
    pub status: RobotStatus,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub data: T,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotStatus {
    Ok,
    Error { code: String, message: String },
    /// Some inputs passed, others did not.
    Partial { completed: usize, failed: usize },
}

pub fn robot_ok<T: Serialize>(data: T) -> RobotResponse<T> {
    robot_response(RobotStatus::Ok, data)
}

/// Response whose status reflects how many inputs failed.
pub fn robot_partial<T: Serialize>(data: T, completed: usize, failed: usize) -> RobotResponse<T> {
    let status = if failed == 0 {
        RobotStatus::Ok
    } else {
        RobotStatus::Partial { completed, failed }
    };
    robot_response(status, data)
}

pub fn robot_error(
    code: impl Into<String>,
    message: impl Into<String>,
) -> RobotResponse<serde_json::Value> {
    robot_response(
        RobotStatus::Error {
            code: code.into(),
            message: message.into(),
        },
        serde_json::Value::Null,
    )
}

fn robot_response<T>(status: RobotStatus, data: T) -> RobotResponse<T> {
    RobotResponse {
        status,
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data,
    }
}

pub fn emit_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).map_err(SandError::Serialization)?;
    println!("{payload}");
    Ok(())
}

/// Line-oriented builder for human-readable output.
pub struct HumanLayout {
    lines: Vec<String>,
    key_width: usize,
}

impl HumanLayout {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            key_width: 14,
        }
    }

    pub fn title(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push(String::new());
        self
    }

    pub fn section(&mut self, text: &str) -> &mut Self {
        self.lines.push(style(text).bold().to_string());
        self.lines.push("-".repeat(text.len().max(3)));
        self
    }

    pub fn kv(&mut self, key: &str, value: &str) -> &mut Self {
        let key_style = style(key).dim().to_string();
        self.lines.push(format!(
            "{key_style:width$} {value}",
            width = self.key_width
        ));
        self
    }

    pub fn bullet(&mut self, text: &str) -> &mut Self {
        self.lines.push(format!("- {text}"));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    pub fn push_line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    /// A `✓`/`✗` line for one checked input.
    pub fn status(&mut self, passed: bool, text: &str) -> &mut Self {
        let line = if passed {
            format!("{} {}", style("✓").green(), style(text).dim())
        } else {
            format!("{} {}", style("✗").red(), style(text).bold())
        };
        self.lines.push(line);
        self
    }

    pub fn build(self) -> String {
        self.lines.join("\n")
    }
}

impl Default for HumanLayout {
    fn default() -> Self {
        Self::new()
    }
}

pub fn emit_human(layout: HumanLayout) {
    println!("{}", layout.build());
}
