//! sandcheck rules - List and explain the conformance rules

use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::cli::output::{HumanLayout, OutputFormat, emit_human, emit_json, robot_ok};
use crate::document::DocumentKind;
use crate::error::{Result, SandError};
use crate::validation::{RuleInfo, RuleSet, ValidationEngine};

#[derive(Args, Debug)]
pub struct RulesArgs {
    /// Show detailed documentation for one rule code
    #[arg(long, value_name = "CODE")]
    pub explain: Option<String>,
}

#[derive(Serialize)]
struct KindRules {
    kind: DocumentKind,
    rules: Vec<RuleInfo>,
}

pub fn run(ctx: &AppContext, args: &RulesArgs) -> Result<()> {
    let engine = ValidationEngine::new(ctx.config.validation.clone());
    let catalog: Vec<KindRules> = [DocumentKind::SandMessage, DocumentKind::Mpd]
        .into_iter()
        .map(|kind| KindRules {
            kind,
            rules: engine.list_rules(&RuleSet::for_kind(kind)),
        })
        .collect();

    if let Some(code) = &args.explain {
        return explain_rule(ctx, &catalog, code);
    }

    if ctx.output_format != OutputFormat::Human {
        return emit_json(&robot_ok(&catalog));
    }

    let mut layout = HumanLayout::new();
    layout.title("Conformance Rules");
    for group in &catalog {
        let heading = match group.kind {
            DocumentKind::SandMessage => "SAND messages",
            DocumentKind::Mpd => "MPD",
        };
        layout.section(heading);
        for rule in &group.rules {
            let badge = if rule.disabled { " [disabled]" } else { "" };
            layout.bullet(&format!("{} - {}{badge}", rule.id, rule.name));
        }
        layout.blank();
    }
    emit_human(layout);
    Ok(())
}

fn explain_rule(ctx: &AppContext, catalog: &[KindRules], code: &str) -> Result<()> {
    let (kind, rule) = catalog
        .iter()
        .flat_map(|group| group.rules.iter().map(move |rule| (group.kind, rule)))
        .find(|(_, rule)| rule.id == code)
        .ok_or_else(|| SandError::NotFound(format!("Rule '{code}' not found")))?;

    if ctx.output_format != OutputFormat::Human {
        return emit_json(&robot_ok(rule));
    }

    let mut layout = HumanLayout::new();
    layout.title(&format!("Rule: {}", rule.id));
    layout.kv("Name", &rule.name);
    layout.kv("Applies to", &kind.to_string());
    layout.kv("Context", &rule.context);
    layout.kv("Category", &rule.category.to_string());
    layout.kv("Enabled", if rule.disabled { "No" } else { "Yes" });
    layout.blank();
    layout.section("Description");
    layout.push_line(rule.description.as_str());
    emit_human(layout);
    Ok(())
}
