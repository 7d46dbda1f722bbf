//! Validation engine for running rule sets against documents.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, trace};

use super::config::{ValidationConfig, ValidationContext};
use super::report::{Report, Violation};
use super::rule::{RuleCategory, ValidationRule, Verdict};
use super::rules::RuleSet;
use crate::document::{Document, Element};

/// Runs rule sets against documents.
///
/// The engine holds no per-run state: a single engine, document and rule set
/// can serve any number of concurrent `validate` calls.
pub struct ValidationEngine {
    config: ValidationConfig,
}

impl ValidationEngine {
    #[must_use]
    pub const fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ValidationConfig::default())
    }

    #[must_use]
    pub const fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate `document` against every enabled rule of `rules`.
    ///
    /// Rules run in rule-set order; each rule visits every element in
    /// pre-order. All failures are collected, nothing stops the pass early.
    #[must_use]
    pub fn validate(&self, document: &Document, rules: &RuleSet) -> Report {
        let ctx = ValidationContext::new(document, &self.config);
        let mut report = Report::new();

        for rule in rules.rules() {
            if self.config.is_rule_disabled(rule.id()) {
                debug!(rule = rule.id(), "rule disabled, skipping");
                continue;
            }
            report.record_rule_run();

            let mut matched = 0;
            for element in document.elements().filter(|e| rule.matches(e)) {
                matched += 1;
                if let Verdict::Fail(message) = evaluate_guarded(rule.as_ref(), element, &ctx) {
                    let path = document.path(element);
                    trace!(rule = rule.id(), path = %path, "rule failed");
                    report.push(Violation::new(rule.id(), path, message));
                }
            }
            report.record_checked(rule.context().to_string(), matched);
        }

        debug!(
            kind = %rules.kind(),
            rules = report.rules_run(),
            violations = report.violation_count(),
            "validation complete"
        );
        report
    }

    /// Describe the rules of `rules` as seen by this engine's config.
    #[must_use]
    pub fn list_rules(&self, rules: &RuleSet) -> Vec<RuleInfo> {
        rules
            .rules()
            .iter()
            .map(|r| RuleInfo {
                id: r.id().to_string(),
                name: r.name().to_string(),
                description: r.description().to_string(),
                category: r.category(),
                context: r.context().to_string(),
                disabled: self.config.is_rule_disabled(r.id()),
            })
            .collect()
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Validate with the default configuration.
#[must_use]
pub fn validate(document: &Document, rules: &RuleSet) -> Report {
    ValidationEngine::with_defaults().validate(document, rules)
}

/// A predicate that panics fails its element instead of aborting the pass.
fn evaluate_guarded(
    rule: &dyn ValidationRule,
    element: &Element,
    ctx: &ValidationContext<'_>,
) -> Verdict {
    panic::catch_unwind(AssertUnwindSafe(|| rule.evaluate(element, ctx))).unwrap_or_else(
        |payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown cause".to_string());
            Verdict::Fail(format!("rule evaluation aborted: {reason}"))
        },
    )
}

/// Information about a registered rule
#[derive(Debug, Clone, serde::Serialize)]
pub struct RuleInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: RuleCategory,
    /// Element type the rule fires on
    pub context: String,
    pub disabled: bool,
}
