//! sandcheck header - Check SAND messages carried as HTTP headers
//!
//! All given lines form one HTTP header block, so a
//! `SAND-DeliveredAlternative` is checked together with its `Warning`,
//! `ContentLocation` and `Vary` companions.

use std::path::PathBuf;

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, robot_partial};
use crate::error::{Result, SandError};
use crate::header::{HeaderReport, check_header_block};

#[derive(Args, Debug)]
pub struct HeaderArgs {
    /// Header lines, e.g. "SAND-MaxRTT: maxRTT=50"
    #[arg(value_name = "LINE", required_unless_present = "file", conflicts_with = "file")]
    pub lines: Vec<String>,

    /// Read header lines from a file
    #[arg(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Serialize)]
struct HeaderOutput {
    headers: Vec<HeaderReport>,
    valid: bool,
}

pub fn run(ctx: &AppContext, args: &HeaderArgs) -> Result<()> {
    let headers = match &args.file {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            check_header_block(content.lines(), &ctx.config.headers)
        }
        None => check_header_block(args.lines.iter().map(String::as_str), &ctx.config.headers),
    };
    let failed = headers.iter().filter(|h| !h.is_valid()).count();
    let output = HeaderOutput {
        valid: failed == 0,
        headers,
    };

    if ctx.output_format == OutputFormat::Human {
        output_human(&output);
    } else {
        emit_json(&robot_partial(&output, output.headers.len() - failed, failed))?;
    }

    if failed > 0 {
        Err(SandError::ValidationFailed(format!(
            "{failed} invalid SAND header(s)"
        )))
    } else {
        Ok(())
    }
}

fn output_human(output: &HeaderOutput) {
    let mut layout = HumanLayout::new();

    if output.headers.is_empty() {
        layout.push_line(style("No SAND header found").dim().to_string());
    }
    for report in &output.headers {
        layout.status(report.is_valid(), &report.name);
        for error in &report.errors {
            layout.push_line(format!("  {} {error}", style("error").red()));
        }
    }

    emit_human(layout);
}
