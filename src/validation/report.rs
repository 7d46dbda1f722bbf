//! Conformance report types.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

/// A single rule failure on one element.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    /// Code of the rule that failed
    pub rule_code: String,
    /// Location of the offending element from the root
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        rule_code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_code: rule_code.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.rule_code, self.path, self.message)
    }
}

/// Result of validating one document against one rule set.
///
/// An empty report means the document is conformant.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Report {
    violations: Vec<Violation>,
    checked: BTreeMap<String, usize>,
    rules_run: usize,
}

impl Report {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub(crate) fn record_checked(&mut self, context: String, count: usize) {
        self.checked.insert(context, count);
    }

    pub(crate) fn record_rule_run(&mut self) {
        self.rules_run += 1;
    }

    /// Violations in evaluation order (rule order, then document order).
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    #[must_use]
    pub fn is_conformant(&self) -> bool {
        self.violations.is_empty()
    }

    #[must_use]
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    pub fn by_rule<'a>(&'a self, rule_code: &'a str) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.rule_code == rule_code)
    }

    /// Number of elements examined for a rule context.
    #[must_use]
    pub fn checked(&self, context: &str) -> usize {
        self.checked.get(context).copied().unwrap_or(0)
    }

    #[must_use]
    pub const fn checked_contexts(&self) -> &BTreeMap<String, usize> {
        &self.checked
    }

    #[must_use]
    pub const fn rules_run(&self) -> usize {
        self.rules_run
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Report", 4)?;
        state.serialize_field("conformant", &self.is_conformant())?;
        state.serialize_field("rulesRun", &self.rules_run)?;
        state.serialize_field("checked", &self.checked)?;
        state.serialize_field("violations", &self.violations)?;
        state.end()
    }
}
