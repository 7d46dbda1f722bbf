//! Built-in rule catalog.
//!
//! - **SAND message rules** (`sand_message`): 5.B.1, 5.B.4, 5.B.5, 5.B.6
//! - **MPD rules** (`mpd`): Channel-ws, Channel-http, Channel-header, 5.H.3
//!
//! # Usage
//!
//! ```
//! use sandcheck::document::Document;
//! use sandcheck::validation::{validate, RuleSet};
//!
//! let doc = Document::parse(
//!     r#"<SANDMessage xmlns="urn:mpeg:dash:schema:sandmessage:2016"><QoSInformation/></SANDMessage>"#,
//! ).unwrap();
//! let report = validate(&doc, &RuleSet::for_sand_messages());
//! assert_eq!(report.violation_count(), 1);
//! assert_eq!(report.violations()[0].rule_code, "5.B.4");
//! assert_eq!(report.violations()[0].path, "/SANDMessage[1]/QoSInformation[1]");
//! ```

pub mod mpd;
pub mod sand_message;

use crate::document::DocumentKind;
use crate::validation::rule::BoxedRule;

pub use mpd::{ChannelEndpointRule, HeaderChannelRule, ReportingChannelRule, mpd_rules};
pub use sand_message::{
    AvailabilityTargetRule, QosMetricRule, ResourceValidityRule, ThroughputTargetRule,
    sand_message_rules,
};

/// An ordered set of rules for one document kind.
///
/// Insertion order is evaluation order. Rule sets are built once and never
/// mutated while validating.
pub struct RuleSet {
    kind: DocumentKind,
    rules: Vec<BoxedRule>,
}

impl RuleSet {
    #[must_use]
    pub const fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            rules: Vec::new(),
        }
    }

    /// Rules for SAND message envelopes.
    #[must_use]
    pub fn for_sand_messages() -> Self {
        Self {
            kind: DocumentKind::SandMessage,
            rules: sand_message_rules(),
        }
    }

    /// Rules for MPDs with SAND extensions.
    #[must_use]
    pub fn for_mpd() -> Self {
        Self {
            kind: DocumentKind::Mpd,
            rules: mpd_rules(),
        }
    }

    #[must_use]
    pub fn for_kind(kind: DocumentKind) -> Self {
        match kind {
            DocumentKind::SandMessage => Self::for_sand_messages(),
            DocumentKind::Mpd => Self::for_mpd(),
        }
    }

    /// Add a rule (builder pattern)
    #[must_use]
    pub fn with_rule(mut self, rule: BoxedRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    #[must_use]
    pub fn rules(&self) -> &[BoxedRule] {
        &self.rules
    }

    #[must_use]
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.iter().any(|r| r.id() == rule_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Every built-in rule, SAND message rules first.
pub fn all_rules() -> Vec<BoxedRule> {
    let mut rules = sand_message_rules();
    rules.extend(mpd_rules());
    rules
}
