//! sandcheck validate - Check SAND messages and MPDs against the rule catalog

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use console::style;
use serde::Serialize;
use tracing::debug;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, robot_partial};
use crate::document::{Document, DocumentKind};
use crate::error::{Result, SandError};
use crate::validation::{Report, RuleSet, ValidationEngine};

/// Which rule set to apply
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum KindArg {
    /// Detect from the root element's namespace
    #[default]
    Auto,
    /// MPD with SAND extensions
    Mpd,
    /// SAND message envelope
    SandMessage,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Documents to validate
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Document kind
    #[arg(long, value_enum, default_value_t = KindArg::Auto)]
    pub kind: KindArg,

    /// Skip specific rules (comma-separated codes)
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<DocumentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileResult {
    fn passed(&self) -> bool {
        self.error.is_none() && self.report.as_ref().is_some_and(Report::is_conformant)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidateOutput {
    files: Vec<FileResult>,
    conformant: usize,
    violations: usize,
}

pub fn run(ctx: &AppContext, args: &ValidateArgs) -> Result<()> {
    let mut config = ctx.config.validation.clone();
    for code in &args.skip {
        config = config.disable_rule(code);
    }
    let engine = ValidationEngine::new(config);

    let files: Vec<FileResult> = args
        .files
        .iter()
        .map(|path| validate_file(&engine, path, args.kind))
        .collect();

    let total = files.len();
    let conformant = files.iter().filter(|f| f.passed()).count();
    let violations = files
        .iter()
        .filter_map(|f| f.report.as_ref())
        .map(Report::violation_count)
        .sum();
    let output = ValidateOutput {
        files,
        conformant,
        violations,
    };

    if ctx.output_format == OutputFormat::Human {
        output_human(&output);
    } else {
        emit_json(&robot_partial(&output, conformant, total - conformant))?;
    }

    if conformant < total {
        Err(SandError::ValidationFailed(format!(
            "{} of {total} document(s) not conformant",
            total - conformant
        )))
    } else {
        Ok(())
    }
}

fn validate_file(engine: &ValidationEngine, path: &Path, kind: KindArg) -> FileResult {
    let mut result = FileResult {
        path: path.display().to_string(),
        kind: None,
        report: None,
        error: None,
    };
    let checked = Document::from_path(path).and_then(|document| {
        let kind = match kind {
            KindArg::Auto => DocumentKind::detect(&document)?,
            KindArg::Mpd => DocumentKind::Mpd,
            KindArg::SandMessage => DocumentKind::SandMessage,
        };
        debug!(path = %path.display(), %kind, "validating document");
        Ok((kind, engine.validate(&document, &RuleSet::for_kind(kind))))
    });
    match checked {
        Ok((kind, report)) => {
            result.kind = Some(kind);
            result.report = Some(report);
        }
        Err(err) => result.error = Some(err.to_string()),
    }
    result
}

fn output_human(output: &ValidateOutput) {
    let mut layout = HumanLayout::new();

    for file in &output.files {
        layout.status(file.passed(), &file.path);
        if let Some(error) = &file.error {
            layout.push_line(format!("  {} {error}", style("error").red().bold()));
        }
        if let Some(report) = &file.report {
            for violation in report.violations() {
                layout.push_line(format!(
                    "  {} {}: {}",
                    style(&violation.rule_code).yellow(),
                    style(&violation.path).dim(),
                    violation.message
                ));
            }
        }
    }

    layout.blank();
    layout.section("Summary");
    layout.kv("Files", &output.files.len().to_string());
    layout.kv("Conformant", &output.conformant.to_string());
    layout.kv("Violations", &output.violations.to_string());

    emit_human(layout);
}
