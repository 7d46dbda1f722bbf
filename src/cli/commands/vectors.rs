//! sandcheck vectors - Run a conformance test-vector tree

use std::path::PathBuf;

use clap::Args;
use console::style;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, robot_partial};
use crate::error::{Result, SandError};
use crate::validation::ValidationEngine;
use crate::vectors::{Expectation, VectorRunner, VectorSummary};

#[derive(Args, Debug)]
pub struct VectorsArgs {
    /// Root of the test-vector tree (holding mpd/, per/, metrics/, status/)
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Also list vectors that behave as named
    #[arg(long)]
    pub all: bool,
}

pub fn run(ctx: &AppContext, args: &VectorsArgs) -> Result<()> {
    let engine = ValidationEngine::new(ctx.config.validation.clone());
    let summary = VectorRunner::new(&engine, &ctx.config.headers).run(&args.dir)?;

    let passed = summary.passed();
    let failed = summary.total() - passed;
    if ctx.output_format == OutputFormat::Human {
        output_human(&summary, args.all);
    } else {
        emit_json(&robot_partial(&summary, passed, failed))?;
    }

    if failed > 0 {
        Err(SandError::ValidationFailed(format!(
            "{failed} test vector(s) contradict their name"
        )))
    } else {
        Ok(())
    }
}

fn output_human(summary: &VectorSummary, all: bool) {
    let mut layout = HumanLayout::new();

    for outcome in &summary.outcomes {
        let as_expected = outcome.as_expected();
        if as_expected && !all {
            continue;
        }
        let verdict = if outcome.conformant { "conformant" } else { "not conformant" };
        let expected = match outcome.expected {
            Expectation::Conformant => "OK",
            Expectation::NonConformant => "KO",
        };
        layout.status(
            as_expected,
            &format!(
                "{} [{}] expected {expected}, {verdict}",
                outcome.path.display(),
                outcome.kind
            ),
        );
        if !as_expected {
            for detail in &outcome.details {
                layout.push_line(format!("    {}", style(detail).dim()));
            }
        }
    }

    layout.blank();
    layout.section("Summary");
    layout.kv("Vectors", &summary.total().to_string());
    layout.kv("As expected", &summary.passed().to_string());
    layout.kv("Mismatched", &(summary.total() - summary.passed()).to_string());

    emit_human(layout);
}
