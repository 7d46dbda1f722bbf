//! Rules for MPDs carrying the SAND extension.
//!
//! Channel rules check that a `sand:Channel` endpoint agrees with its
//! transport scheme. The reporting rule checks that an MPD `Reporting`
//! descriptor routed to a SAND channel points at a Channel that exists
//! somewhere in the document.

use crate::document::namespaces::{
    CHANNEL_HEADER_SCHEME, CHANNEL_HTTP_SCHEME, CHANNEL_WEBSOCKET_SCHEME, MPD_NS,
    REPORTING_SAND_CHANNEL_SCHEME, SAND_NS,
};
use crate::document::{Element, QName};
use crate::validation::config::ValidationContext;
use crate::validation::rule::{BoxedRule, RuleCategory, RuleContext, ValidationRule, Verdict};

const CHANNEL: RuleContext = RuleContext::new(SAND_NS, "Channel");
const REPORTING: RuleContext = RuleContext::new(MPD_NS, "Reporting");

/// A Channel with a given scheme must use an endpoint with one of the listed URL prefixes.
pub struct ChannelEndpointRule {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    scheme: &'static str,
    prefixes: &'static [&'static str],
}

impl ChannelEndpointRule {
    #[must_use]
    pub const fn websocket() -> Self {
        Self {
            id: "Channel-ws",
            name: "WebSocket channel endpoint",
            description: "A Channel using the websocket scheme must have a ws:// or wss:// endpoint",
            scheme: CHANNEL_WEBSOCKET_SCHEME,
            prefixes: &["ws://", "wss://"],
        }
    }

    #[must_use]
    pub const fn http() -> Self {
        Self {
            id: "Channel-http",
            name: "HTTP channel endpoint",
            description: "A Channel using the http scheme must have an http:// or https:// endpoint",
            scheme: CHANNEL_HTTP_SCHEME,
            prefixes: &["http://", "https://"],
        }
    }
}

impl ValidationRule for ChannelEndpointRule {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Consistency
    }

    fn context(&self) -> RuleContext {
        CHANNEL
    }

    fn evaluate(&self, element: &Element, _ctx: &ValidationContext<'_>) -> Verdict {
        if element.attribute("schemeIdUri") != Some(self.scheme) {
            return Verdict::Pass;
        }
        let expected = self.prefixes.join(" or ");
        match element.attribute("endpoint") {
            Some(endpoint) if self.prefixes.iter().any(|p| endpoint.starts_with(p)) => {
                Verdict::Pass
            }
            Some(endpoint) => Verdict::Fail(format!(
                "Channel with scheme {} has endpoint '{endpoint}', expected a URL starting with {expected}",
                self.scheme
            )),
            None => Verdict::Fail(format!(
                "Channel with scheme {} has no endpoint, expected a URL starting with {expected}",
                self.scheme
            )),
        }
    }
}

/// A header-based Channel is implicit in regular requests and carries no endpoint.
pub struct HeaderChannelRule;

impl ValidationRule for HeaderChannelRule {
    fn id(&self) -> &'static str {
        "Channel-header"
    }

    fn name(&self) -> &'static str {
        "Header channel has no endpoint"
    }

    fn description(&self) -> &'static str {
        "A Channel using the header scheme must not declare an endpoint"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Consistency
    }

    fn context(&self) -> RuleContext {
        CHANNEL
    }

    fn evaluate(&self, element: &Element, _ctx: &ValidationContext<'_>) -> Verdict {
        if element.attribute("schemeIdUri") != Some(CHANNEL_HEADER_SCHEME) {
            return Verdict::Pass;
        }
        Verdict::require(
            !element.has_attribute("endpoint"),
            format!("Channel with scheme {CHANNEL_HEADER_SCHEME} must not have an endpoint attribute"),
        )
    }
}

/// `Reporting@value` must name the id of a declared SAND Channel.
pub struct ReportingChannelRule;

impl ValidationRule for ReportingChannelRule {
    fn id(&self) -> &'static str {
        "5.H.3"
    }

    fn name(&self) -> &'static str {
        "Reporting channel reference"
    }

    fn description(&self) -> &'static str {
        "A Reporting descriptor using the SAND channel scheme must reference, in its value attribute, \
         the id of a Channel declared anywhere in the MPD"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Reference
    }

    fn context(&self) -> RuleContext {
        REPORTING
    }

    fn evaluate(&self, element: &Element, ctx: &ValidationContext<'_>) -> Verdict {
        if element.attribute("schemeIdUri") != Some(REPORTING_SAND_CHANNEL_SCHEME) {
            return Verdict::Pass;
        }
        let Some(value) = element.attribute("value") else {
            return Verdict::Fail(
                "Reporting with the SAND channel scheme has no value referencing a Channel id"
                    .to_string(),
            );
        };

        let channel = QName::new(SAND_NS, "Channel");
        if !ctx.document.find_by_id(&channel, value).is_empty() {
            return Verdict::Pass;
        }
        match ctx.require_namespace(SAND_NS) {
            Err(err) => Verdict::Fail(format!("cannot resolve Channel '{value}': {err}")),
            Ok(()) => Verdict::Fail(format!(
                "Reporting value '{value}' does not match the id of any Channel in the MPD"
            )),
        }
    }
}

/// Returns the MPD rules in evaluation order.
pub fn mpd_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(ChannelEndpointRule::websocket()),
        Box::new(ChannelEndpointRule::http()),
        Box::new(HeaderChannelRule),
        Box::new(ReportingChannelRule),
    ]
}
