//! SAND messages that may be carried as HTTP headers.

use std::fmt;

use super::HeaderConfig;
use super::syntax::{ObjectSyntax, SandObject};
use super::value::ValueType;

/// Message set covering every SAND message type, codes 1 to 21.
const ALL_MESSAGES_URN: &str = "\"urn:mpeg:dash:sand:messageset:all:2016\"";
const ALL_MESSAGES_CODES: std::ops::RangeInclusive<u32> = 1..=21;
/// Message code of ClientCapabilities itself.
const CLIENT_CAPABILITIES_CODE: &str = "12";

/// Allocation strategies that need a weight.
const WEIGHTED_STRATEGIES: [&str; 3] = [
    "\"urn:mpeg:dash:sand:allocation:premium-privileged:2016\"",
    "\"urn:mpeg:dash:sand:allocation:everybody-served:2016\"",
    "\"urn:mpeg:dash:sand:allocation:weighted:2016\"",
];

static REQUEST: ObjectSyntax = ObjectSyntax {
    mandatory: &["sourceUrl", "targetTime"],
    attributes: &[
        ("sourceUrl", ValueType::QuotedUri),
        ("range", ValueType::ByteRange),
        ("targetTime", ValueType::DateTime),
    ],
    list: None,
    list_required: false,
};

static OPERATION_POINT: ObjectSyntax = ObjectSyntax {
    mandatory: &["bandwidth"],
    attributes: &[
        ("bandwidth", ValueType::Int),
        ("quality", ValueType::Int),
        ("minBufferTime", ValueType::Int),
    ],
    list: None,
    list_required: false,
};

static ALTERNATIVE: ObjectSyntax = ObjectSyntax {
    mandatory: &["sourceUrl"],
    attributes: &[
        ("sourceUrl", ValueType::QuotedUri),
        ("range", ValueType::ByteRange),
        ("bandwidth", ValueType::Int),
        ("deliveryScope", ValueType::Int),
    ],
    list: None,
    list_required: false,
};

static ANTICIPATED_REQUESTS: ObjectSyntax = ObjectSyntax {
    mandatory: &[],
    attributes: &[],
    list: Some(&REQUEST),
    list_required: true,
};

static SHARED_RESOURCE_ALLOCATION: ObjectSyntax = ObjectSyntax {
    mandatory: &[],
    attributes: &[
        ("weight", ValueType::Int),
        ("allocationStrategy", ValueType::QuotedUrn),
        ("mpdUrl", ValueType::QuotedUri),
    ],
    list: Some(&OPERATION_POINT),
    list_required: true,
};

static ALTERNATIVES: ObjectSyntax = ObjectSyntax {
    mandatory: &[],
    attributes: &[],
    list: Some(&ALTERNATIVE),
    list_required: true,
};

static ABSOLUTE_DEADLINE: ObjectSyntax = ObjectSyntax {
    mandatory: &["deadline"],
    attributes: &[("deadline", ValueType::DateTime)],
    list: None,
    list_required: false,
};

static MAX_RTT: ObjectSyntax = ObjectSyntax {
    mandatory: &["maxRTT"],
    attributes: &[("maxRTT", ValueType::Int)],
    list: None,
    list_required: false,
};

static CLIENT_CAPABILITIES: ObjectSyntax = ObjectSyntax {
    mandatory: &[],
    attributes: &[
        ("supportedMessage", ValueType::List),
        ("messageSetUri", ValueType::QuotedUrn),
    ],
    list: None,
    list_required: false,
};

static DELIVERED_ALTERNATIVE: ObjectSyntax = ObjectSyntax {
    mandatory: &["contentLocation"],
    attributes: &[
        ("initialUrl", ValueType::QuotedUri),
        ("contentLocation", ValueType::QuotedUri),
    ],
    list: None,
    list_required: false,
};

/// A SAND message that has an HTTP header form.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum MessageKind {
    AnticipatedRequests,
    SharedResourceAllocation,
    AcceptedAlternatives,
    AbsoluteDeadline,
    MaxRtt,
    NextAlternatives,
    ClientCapabilities,
    DeliveredAlternative,
}

impl MessageKind {
    pub const ALL: [Self; 8] = [
        Self::AnticipatedRequests,
        Self::SharedResourceAllocation,
        Self::AcceptedAlternatives,
        Self::AbsoluteDeadline,
        Self::MaxRtt,
        Self::NextAlternatives,
        Self::ClientCapabilities,
        Self::DeliveredAlternative,
    ];

    /// Header name, e.g. `SAND-MaxRTT`.
    #[must_use]
    pub const fn header_name(self) -> &'static str {
        match self {
            Self::AnticipatedRequests => "SAND-AnticipatedRequests",
            Self::SharedResourceAllocation => "SAND-SharedResourceAllocation",
            Self::AcceptedAlternatives => "SAND-AcceptedAlternatives",
            Self::AbsoluteDeadline => "SAND-AbsoluteDeadline",
            Self::MaxRtt => "SAND-MaxRTT",
            Self::NextAlternatives => "SAND-NextAlternatives",
            Self::ClientCapabilities => "SAND-ClientCapabilities",
            Self::DeliveredAlternative => "SAND-DeliveredAlternative",
        }
    }

    /// Look up a message by header name; HTTP header names are case-insensitive.
    #[must_use]
    pub fn from_header_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.header_name().eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn syntax(self) -> &'static ObjectSyntax {
        match self {
            Self::AnticipatedRequests => &ANTICIPATED_REQUESTS,
            Self::SharedResourceAllocation => &SHARED_RESOURCE_ALLOCATION,
            Self::AcceptedAlternatives | Self::NextAlternatives => &ALTERNATIVES,
            Self::AbsoluteDeadline => &ABSOLUTE_DEADLINE,
            Self::MaxRtt => &MAX_RTT,
            Self::ClientCapabilities => &CLIENT_CAPABILITIES,
            Self::DeliveredAlternative => &DELIVERED_ALTERNATIVE,
        }
    }

    /// Message-level constraints checked once the syntax is parsed.
    pub(crate) fn check_constraints(
        self,
        object: &SandObject,
        config: &HeaderConfig,
        errors: &mut Vec<String>,
    ) {
        match self {
            Self::AnticipatedRequests => {
                if !object.has_items() {
                    errors.push("At least one request must be specified.".to_string());
                }
            }
            Self::AcceptedAlternatives | Self::NextAlternatives => {
                if !object.has_items() {
                    errors.push("At least one alternative must be specified.".to_string());
                }
            }
            Self::SharedResourceAllocation => check_allocation(object, config, errors),
            Self::ClientCapabilities => check_capabilities(object, errors),
            Self::AbsoluteDeadline | Self::MaxRtt | Self::DeliveredAlternative => {}
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

fn check_allocation(object: &SandObject, config: &HeaderConfig, errors: &mut Vec<String>) {
    if !object.has_items() {
        errors.push("At least one operation point must be specified.".to_string());
    }

    if config.weight_for_strategy {
        if let Some(strategy) = object.get("allocationStrategy") {
            if WEIGHTED_STRATEGIES.contains(&strategy) && !object.has("weight") {
                errors.push(format!(
                    "Attribute weight is mandatory for strategy {strategy}."
                ));
            }
        }
    }

    if config.consistent_operation_points {
        let Some(list) = object.list.as_ref() else {
            return;
        };
        let Some((first, rest)) = list.items.split_first() else {
            return;
        };
        let expected = OPERATION_POINT.optional_attributes(first);
        if rest
            .iter()
            .any(|point| OPERATION_POINT.optional_attributes(point) != expected)
        {
            errors.push(
                "Optional attributes are not consistent through the list of operationPoints"
                    .to_string(),
            );
        }
    }
}

fn check_capabilities(object: &SandObject, errors: &mut Vec<String>) {
    let message_set = object.get("messageSetUri");
    let supported = object.get("supportedMessage");
    let mut codes: Vec<String> = Vec::new();

    if let Some(urn) = message_set {
        if urn == ALL_MESSAGES_URN {
            codes.extend(ALL_MESSAGES_CODES.map(|code| code.to_string()));
        } else {
            errors.push(format!("messageSetUri {urn} is not a known urn"));
            // An unknown set is assumed to list ClientCapabilities.
            codes.push(CLIENT_CAPABILITIES_CODE.to_string());
        }
    }
    if let Some(list) = supported {
        let inner = list
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or("");
        codes.extend(inner.split(',').map(str::to_string));
    }

    if message_set.is_none() && supported.is_none() {
        errors.push(
            "At least one of supportedMessage or messageSetUri should be specified.".to_string(),
        );
    }
    if codes.iter().any(|code| code == "0") {
        errors.push("supportedMessage should not include reserved code 0".to_string());
    }
    if !codes.iter().any(|code| code == CLIENT_CAPABILITIES_CODE) {
        errors.push(
            "At least one of the parameters must include code 12 (ClientCapabilities)"
                .to_string(),
        );
    }
}
