//! Validation rule trait and helpers.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::config::ValidationContext;
use crate::document::{Element, QName};

/// Grouping used when listing rules.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    /// Required attributes on a single element
    Structure,
    /// Attributes of one element that must agree with each other
    Consistency,
    /// References between elements
    Reference,
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structure => write!(f, "structure"),
            Self::Consistency => write!(f, "consistency"),
            Self::Reference => write!(f, "reference"),
        }
    }
}

/// The element type a rule fires on.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct RuleContext {
    pub namespace: &'static str,
    pub local: &'static str,
}

impl RuleContext {
    #[must_use]
    pub const fn new(namespace: &'static str, local: &'static str) -> Self {
        Self { namespace, local }
    }

    #[must_use]
    pub fn matches(&self, name: &QName) -> bool {
        name.local == self.local && name.namespace.as_deref() == Some(self.namespace)
    }

    #[must_use]
    pub fn to_qname(&self) -> QName {
        QName::new(self.namespace, self.local)
    }
}

impl fmt::Display for RuleContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

/// Outcome of evaluating a rule on one element.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Verdict {
    Pass,
    /// Failed, with the rendered message
    Fail(String),
}

impl Verdict {
    /// `Pass` when `passed`, otherwise `Fail(message)`.
    pub fn require(passed: bool, message: impl Into<String>) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail(message.into())
        }
    }

    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// A single named constraint over document elements.
///
/// Rules are stateless and must not mutate the document. Everything needed
/// for evaluation, including document-wide lookups, comes through the
/// [`ValidationContext`].
pub trait ValidationRule: Send + Sync {
    /// Stable rule code, e.g. "5.B.1"
    fn id(&self) -> &str;

    /// Human-readable name
    fn name(&self) -> &str;

    /// What the rule checks
    fn description(&self) -> &str;

    fn category(&self) -> RuleCategory;

    /// Element type this rule applies to
    fn context(&self) -> RuleContext;

    /// Whether the rule fires on `element`.
    fn matches(&self, element: &Element) -> bool {
        self.context().matches(element.name())
    }

    /// Evaluate the predicate on an element matching [`Self::context`].
    fn evaluate(&self, element: &Element, ctx: &ValidationContext<'_>) -> Verdict;
}

/// A boxed validation rule for dynamic dispatch
pub type BoxedRule = Box<dyn ValidationRule>;

/// Declare a unit-struct rule from its metadata and predicate body.
#[macro_export]
macro_rules! impl_rule {
    (
        $struct_name:ident,
        id: $id:expr,
        name: $name:expr,
        description: $desc:expr,
        category: $cat:expr,
        context: ($ns:expr, $local:expr),
        evaluate: |$element:ident, $ctx:ident| $evaluate_body:expr
    ) => {
        pub struct $struct_name;

        impl $crate::validation::rule::ValidationRule for $struct_name {
            fn id(&self) -> &str {
                $id
            }

            fn name(&self) -> &str {
                $name
            }

            fn description(&self) -> &str {
                $desc
            }

            fn category(&self) -> $crate::validation::rule::RuleCategory {
                $cat
            }

            fn context(&self) -> $crate::validation::rule::RuleContext {
                $crate::validation::rule::RuleContext::new($ns, $local)
            }

            fn evaluate(
                &self,
                $element: &$crate::document::Element,
                $ctx: &$crate::validation::config::ValidationContext<'_>,
            ) -> $crate::validation::rule::Verdict {
                $evaluate_body
            }
        }
    };
}

pub use impl_rule;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::validation::config::ValidationConfig;

    const TEST_NS: &str = "urn:example:test";

    impl_rule!(
        NamedRule,
        id: "test-named",
        name: "Named",
        description: "Item must carry a name",
        category: RuleCategory::Structure,
        context: (TEST_NS, "Item"),
        evaluate: |element, _ctx| Verdict::require(element.has_attribute("name"), "Item has no name")
    );

    #[test]
    fn test_rule_metadata() {
        let rule = NamedRule;
        assert_eq!(rule.id(), "test-named");
        assert_eq!(rule.name(), "Named");
        assert_eq!(rule.category(), RuleCategory::Structure);
        assert_eq!(rule.context().to_qname(), QName::new(TEST_NS, "Item"));
    }

    #[test]
    fn test_rule_matches_namespace_and_local_name() {
        let doc = Document::parse(
            r#"<r xmlns="urn:example:test" xmlns:o="urn:example:other"><Item/><o:Item/></r>"#,
        )
        .unwrap();
        let rule = NamedRule;
        let matched: Vec<bool> = doc.elements().map(|e| rule.matches(e)).collect();
        assert_eq!(matched, vec![false, true, false]);
    }

    #[test]
    fn test_rule_evaluate() {
        let doc = Document::parse(
            r#"<r xmlns="urn:example:test"><Item name="a"/><Item/></r>"#,
        )
        .unwrap();
        let config = ValidationConfig::new();
        let ctx = ValidationContext::new(&doc, &config);
        let rule = NamedRule;
        let verdicts: Vec<Verdict> = doc
            .elements()
            .filter(|e| rule.matches(e))
            .map(|e| rule.evaluate(e, &ctx))
            .collect();
        assert_eq!(
            verdicts,
            vec![Verdict::Pass, Verdict::Fail("Item has no name".to_string())]
        );
    }

    #[test]
    fn test_context_display() {
        let ctx = RuleContext::new(TEST_NS, "Item");
        assert_eq!(ctx.to_string(), "{urn:example:test}Item");
    }
}
