//! Rules for SAND message envelopes.
//!
//! Each rule checks one message element for the attributes ISO/IEC 23009-5
//! requires beyond what the XML schema can express.

use crate::document::namespaces::SAND_MESSAGE_NS;
use crate::impl_rule;
use crate::validation::rule::{BoxedRule, RuleCategory, Verdict};

/// Attributes of which a QoSInformation message must carry at least one.
const QOS_METRICS: [&str; 4] = ["gbr", "mbr", "delay", "pl"];

impl_rule!(
    ResourceValidityRule,
    id: "5.B.1",
    name: "Resource assignment expiry",
    description: "A SharedResourceAssignment must declare its expiry through the validityTime attribute",
    category: RuleCategory::Structure,
    context: (SAND_MESSAGE_NS, "SharedResourceAssignment"),
    evaluate: |element, _ctx| Verdict::require(
        element.has_attribute("validityTime"),
        "SharedResourceAssignment must carry a validityTime attribute",
    )
);

impl_rule!(
    QosMetricRule,
    id: "5.B.4",
    name: "QoS metric present",
    description: "A QoSInformation message must carry at least one of gbr, mbr, delay or pl",
    category: RuleCategory::Structure,
    context: (SAND_MESSAGE_NS, "QoSInformation"),
    evaluate: |element, _ctx| Verdict::require(
        QOS_METRICS.iter().any(|metric| element.has_attribute(metric)),
        "QoSInformation must carry at least one of gbr, mbr, delay or pl",
    )
);

impl_rule!(
    AvailabilityTargetRule,
    id: "5.B.5",
    name: "Availability time offset target",
    description: "An AvailabilityTimeOffset must identify its target with repId or baseUrl",
    category: RuleCategory::Structure,
    context: (SAND_MESSAGE_NS, "AvailabilityTimeOffset"),
    evaluate: |element, _ctx| Verdict::require(
        has_target(element),
        "AvailabilityTimeOffset must carry a repId or a baseUrl attribute",
    )
);

impl_rule!(
    ThroughputTargetRule,
    id: "5.B.6",
    name: "Throughput target",
    description: "A Throughput message must identify its target with repId or baseUrl",
    category: RuleCategory::Structure,
    context: (SAND_MESSAGE_NS, "Throughput"),
    evaluate: |element, _ctx| Verdict::require(
        has_target(element),
        "Throughput must carry a repId or a baseUrl attribute",
    )
);

fn has_target(element: &crate::document::Element) -> bool {
    element.has_attribute("repId") || element.has_attribute("baseUrl")
}

/// Returns the SAND message rules in evaluation order.
pub fn sand_message_rules() -> Vec<BoxedRule> {
    vec![
        Box::new(ResourceValidityRule),
        Box::new(QosMetricRule),
        Box::new(AvailabilityTargetRule),
        Box::new(ThroughputTargetRule),
    ]
}
