//! Validation configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, SandError};

/// Configuration for validation
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Rules to skip, by code
    #[serde(default)]
    pub disabled_rules: BTreeSet<String>,
}

impl ValidationConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Disable a rule
    #[must_use]
    pub fn disable_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.disabled_rules.insert(rule_id.into());
        self
    }

    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.contains(rule_id)
    }
}

/// Context provided to validation rules during evaluation
pub struct ValidationContext<'a> {
    /// The document being validated
    pub document: &'a Document,

    pub config: &'a ValidationConfig,
}

impl<'a> ValidationContext<'a> {
    #[must_use]
    pub const fn new(document: &'a Document, config: &'a ValidationConfig) -> Self {
        Self { document, config }
    }

    /// Fails with `UnknownNamespace` when no declaration in the document binds `namespace`.
    ///
    /// Rules that depend on such a namespace decide locally how to report it.
    pub fn require_namespace(&self, namespace: &str) -> Result<()> {
        if self.document.binds_namespace(namespace) {
            Ok(())
        } else {
            Err(SandError::UnknownNamespace(format!(
                "'{namespace}' is not bound in the document"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ValidationConfig::new();
        assert!(config.disabled_rules.is_empty());
        assert!(!config.is_rule_disabled("5.B.1"));
    }

    #[test]
    fn test_disable_rule() {
        let config = ValidationConfig::new().disable_rule("5.H.3");
        assert!(config.is_rule_disabled("5.H.3"));
        assert!(!config.is_rule_disabled("Channel-ws"));
    }

    #[test]
    fn test_config_from_toml() {
        let config: ValidationConfig =
            toml::from_str(r#"disabled_rules = ["5.B.4", "Channel-http"]"#).unwrap();
        assert!(config.is_rule_disabled("5.B.4"));
        assert!(config.is_rule_disabled("Channel-http"));
    }

    #[test]
    fn test_require_namespace() {
        let doc = Document::parse(
            r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" xmlns:sand="urn:mpeg:dash:schema:sand:2016"/>"#,
        )
        .unwrap();
        let config = ValidationConfig::new();
        let ctx = ValidationContext::new(&doc, &config);
        assert!(ctx.require_namespace("urn:mpeg:dash:schema:sand:2016").is_ok());
        assert!(matches!(
            ctx.require_namespace("urn:example:missing"),
            Err(SandError::UnknownNamespace(_))
        ));
    }
}
