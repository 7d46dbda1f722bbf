//! Syntax checker for SAND messages carried as HTTP headers.
//!
//! Each supported header (`SAND-MaxRTT`, `SAND-ClientCapabilities`, ...)
//! carries one SAND message written in the sand-object grammar. The checker
//! parses the value, reports every syntax error it can find, then applies
//! the message-level constraints.
//!
//! # Example
//!
//! ```
//! use sandcheck::header::{HeaderConfig, check_header};
//!
//! let config = HeaderConfig::default();
//! assert!(check_header("SAND-MaxRTT", "maxRTT=50", &config).is_empty());
//! assert!(!check_header("SAND-MaxRTT", "maxRTT=abc", &config).is_empty());
//! ```

pub mod messages;
pub mod syntax;
pub mod value;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use messages::MessageKind;
pub use syntax::{ObjectSyntax, SandList, SandObject};
pub use value::ValueType;

/// Header that must accompany a delivered alternative.
const TRANSFORMATION_WARNING: &str = "214 Transformation Applied";
/// Request header a delivered alternative varies on.
const ALTERNATIVES_HEADER: &str = "sand-acceptedalternatives";

pub const MISSING_SEPARATOR: &str = "Expecting a 'Name: value' header line.";

/// Checks beyond strict MPEG conformance. All off by default.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeaderConfig {
    /// SharedResourceAllocation must carry `weight` for weighted strategies.
    pub weight_for_strategy: bool,
    /// Operation points of a SharedResourceAllocation share the same optional attributes.
    pub consistent_operation_points: bool,
}

/// Errors found in one header.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HeaderReport {
    pub name: String,
    pub errors: Vec<String>,
}

impl HeaderReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

fn unsupported(name: &str) -> String {
    format!("Header {name} is not supported by this conformance checker.")
}

/// Parse and check one header value of a known message.
fn check_message(
    kind: MessageKind,
    value: &str,
    config: &HeaderConfig,
) -> (Option<SandObject>, Vec<String>) {
    let outcome = syntax::parse(kind.syntax(), value.trim());
    let mut errors = outcome.errors;
    if let Some(object) = &outcome.object {
        kind.check_constraints(object, config, &mut errors);
    }
    debug!(header = %kind, errors = errors.len(), "checked header");
    (outcome.object, errors)
}

/// Check a single header. An empty result means the header is valid.
pub fn check_header(name: &str, value: &str, config: &HeaderConfig) -> Vec<String> {
    match MessageKind::from_header_name(name) {
        Some(kind) => check_message(kind, value, config).1,
        None => {
            warn!(header = name, "unsupported header");
            vec![unsupported(name.trim())]
        }
    }
}

/// Split a raw `Name: value` header line.
#[must_use]
pub fn parse_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.trim_end_matches(['\r', '\n']).split_once(':')?;
    Some((name.trim(), value.trim()))
}

/// Check a raw `Name: value` header line.
pub fn check_header_line(line: &str, config: &HeaderConfig) -> HeaderReport {
    match parse_header_line(line) {
        Some((name, value)) => HeaderReport {
            name: name.to_string(),
            errors: check_header(name, value, config),
        },
        None => HeaderReport {
            name: line.trim().to_string(),
            errors: vec![MISSING_SEPARATOR.to_string()],
        },
    }
}

/// Check every SAND header of an HTTP request or response.
///
/// Headers that are not SAND headers are skipped. For a
/// `SAND-DeliveredAlternative`, the companion `Warning`, `ContentLocation`
/// and `Vary` headers are checked too.
pub fn check_headers(headers: &[(&str, &str)], config: &HeaderConfig) -> Vec<HeaderReport> {
    let mut reports = Vec::new();
    for (name, value) in headers {
        let (object, mut errors) = match MessageKind::from_header_name(name) {
            Some(kind) => check_message(kind, value, config),
            None if name.trim().to_ascii_lowercase().starts_with("sand-") => {
                warn!(header = name, "unsupported header");
                (None, vec![unsupported(name.trim())])
            }
            None => continue,
        };
        if MessageKind::from_header_name(name) == Some(MessageKind::DeliveredAlternative) {
            check_delivery_headers(object.as_ref(), headers, &mut errors);
        }
        reports.push(HeaderReport {
            name: name.trim().to_string(),
            errors,
        });
    }
    reports
}

/// Check raw header lines as one HTTP header block.
///
/// Blank lines are skipped. A line without a `Name: value` separator gets a
/// report of its own, after the reports of the well-formed lines.
pub fn check_header_block<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    config: &HeaderConfig,
) -> Vec<HeaderReport> {
    let mut malformed = Vec::new();
    let mut pairs = Vec::new();
    for line in lines.into_iter().filter(|l| !l.trim().is_empty()) {
        match parse_header_line(line) {
            Some(pair) => pairs.push(pair),
            None => malformed.push(HeaderReport {
                name: line.trim().to_string(),
                errors: vec![MISSING_SEPARATOR.to_string()],
            }),
        }
    }
    let mut reports = check_headers(&pairs, config);
    reports.extend(malformed);
    reports
}

#[derive(Eq, PartialEq)]
enum Vary {
    Missing,
    Alternatives,
    Other,
}

fn check_delivery_headers(
    object: Option<&SandObject>,
    headers: &[(&str, &str)],
    errors: &mut Vec<String>,
) {
    let mut warning = "";
    let mut location = "";
    let mut vary = Vary::Missing;

    // Repeated headers are not assumed to be grouped.
    for (name, value) in headers {
        match name.trim().to_ascii_lowercase().as_str() {
            "warning" => {
                if warning != TRANSFORMATION_WARNING {
                    warning = value.trim();
                }
            }
            "contentlocation" => location = value.trim(),
            "vary" => {
                if vary != Vary::Alternatives {
                    let value = value.trim();
                    vary = if value == "*"
                        || value
                            .split(',')
                            .any(|field| field.trim().eq_ignore_ascii_case(ALTERNATIVES_HEADER))
                    {
                        Vary::Alternatives
                    } else {
                        Vary::Other
                    };
                }
            }
            _ => {}
        }
    }

    if warning.is_empty() {
        errors.push("Mandatory Warning header missing for DeliveredAlternative.".to_string());
    } else if warning != TRANSFORMATION_WARNING {
        errors.push(format!(
            "A Warning header with \"{TRANSFORMATION_WARNING}\" is expected."
        ));
    }

    if location.is_empty() {
        errors.push(
            "Mandatory ContentLocation header missing for DeliveredAlternative.".to_string(),
        );
    } else if let Some(content_location) = object.and_then(|o| o.get("contentLocation")) {
        if content_location.trim_matches('"') != location {
            errors.push(
                "ContentLocation header and contentLocation@DeliveredAlternative are not consistent."
                    .to_string(),
            );
        }
    }

    match vary {
        Vary::Missing => {
            errors.push("Mandatory Vary header missing for DeliveredAlternative.".to_string());
        }
        Vary::Other => errors.push(format!(
            "The Vary header should mention {ALTERNATIVES_HEADER} for a DeliveredAlternative."
        )),
        Vary::Alternatives => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(name: &str, value: &str) -> Vec<String> {
        check_header(name, value, &HeaderConfig::default())
    }

    #[test]
    fn test_max_rtt() {
        assert!(errors("SAND-MaxRTT", "maxRTT=50").is_empty());
        assert!(errors("sand-maxrtt", "  maxRTT=50 ").is_empty());
        assert!(!errors("SAND-MaxRTT", "maxRTT=abc").is_empty());
        assert!(!errors("SAND-MaxRTT", "").is_empty());
    }

    #[test]
    fn test_unknown_header() {
        let errors = errors("SAND-Foo", "a=1");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("SAND-Foo"));
    }

    #[test]
    fn test_absolute_deadline_requires_basic_format() {
        assert!(errors("SAND-AbsoluteDeadline", "deadline=20160601T120000Z").is_empty());
        let errs = errors("SAND-AbsoluteDeadline", "deadline=2016-06-01T12:00:00Z");
        assert_eq!(errs, vec!["Wrong or missing DATETIME specification."]);
    }

    #[test]
    fn test_anticipated_requests() {
        assert!(errors(
            "SAND-AnticipatedRequests",
            r#"[sourceUrl="http://a.com/s1.mp4",range=0-100,targetTime=20160601T120000Z;sourceUrl="http://a.com/s2.mp4",targetTime=20160601T120002Z]"#
        )
        .is_empty());
        let errs = errors("SAND-AnticipatedRequests", "[]");
        assert_eq!(errs, vec!["At least one request must be specified."]);
    }

    #[test]
    fn test_alternatives() {
        assert!(errors("SAND-AcceptedAlternatives", r#"[sourceUrl="seg1.mp4",bandwidth=100]"#).is_empty());
        assert!(errors("SAND-NextAlternatives", r#"[sourceUrl="seg1.mp4";sourceUrl="seg2.mp4"]"#).is_empty());
        let errs = errors("SAND-NextAlternatives", "deliveryScope=1");
        assert!(!errs.is_empty());
    }

    #[test]
    fn test_client_capabilities() {
        assert!(errors("SAND-ClientCapabilities", "supportedMessage=[1,12]").is_empty());
        assert!(errors(
            "SAND-ClientCapabilities",
            r#"messageSetUri="urn:mpeg:dash:sand:messageset:all:2016""#
        )
        .is_empty());

        assert_eq!(
            errors("SAND-ClientCapabilities", "supportedMessage=[1,2]"),
            vec!["At least one of the parameters must include code 12 (ClientCapabilities)"]
        );
        assert_eq!(
            errors("SAND-ClientCapabilities", "supportedMessage=[0,12]"),
            vec!["supportedMessage should not include reserved code 0"]
        );
        assert_eq!(
            errors("SAND-ClientCapabilities", r#"messageSetUri="urn:example:set""#),
            vec![r#"messageSetUri "urn:example:set" is not a known urn"#]
        );
    }

    #[test]
    fn test_client_capabilities_requires_a_parameter() {
        let errs = errors("SAND-ClientCapabilities", "messageId=1");
        assert_eq!(
            errs,
            vec![
                "At least one of supportedMessage or messageSetUri should be specified.",
                "At least one of the parameters must include code 12 (ClientCapabilities)",
            ]
        );
    }

    #[test]
    fn test_shared_resource_allocation() {
        assert!(errors(
            "SAND-SharedResourceAllocation",
            r#"weight=2,allocationStrategy="urn:mpeg:dash:sand:allocation:weighted:2016",[bandwidth=1000,quality=1;bandwidth=2000,quality=2]"#
        )
        .is_empty());
    }

    #[test]
    fn test_extended_checks_off_by_default() {
        let value = r#"allocationStrategy="urn:mpeg:dash:sand:allocation:weighted:2016",[bandwidth=1000,quality=1;bandwidth=2000]"#;
        assert!(errors("SAND-SharedResourceAllocation", value).is_empty());

        let config = HeaderConfig {
            weight_for_strategy: true,
            consistent_operation_points: true,
        };
        let errs = check_header("SAND-SharedResourceAllocation", value, &config);
        assert_eq!(
            errs,
            vec![
                r#"Attribute weight is mandatory for strategy "urn:mpeg:dash:sand:allocation:weighted:2016"."#,
                "Optional attributes are not consistent through the list of operationPoints",
            ]
        );
    }

    #[test]
    fn test_header_line() {
        let report = check_header_line("SAND-MaxRTT: maxRTT=50\r\n", &HeaderConfig::default());
        assert_eq!(report.name, "SAND-MaxRTT");
        assert!(report.is_valid());

        let report = check_header_line("no separator", &HeaderConfig::default());
        assert!(!report.is_valid());
    }

    #[test]
    fn test_delivered_alternative_with_companions() {
        let headers = [
            ("SAND-DeliveredAlternative", r#"contentLocation="http://a.com/alt.mp4""#),
            ("Warning", "214 Transformation Applied"),
            ("ContentLocation", "http://a.com/alt.mp4"),
            ("Vary", "Accept, SAND-AcceptedAlternatives"),
            ("Host", "a.com"),
        ];
        let reports = check_headers(&headers, &HeaderConfig::default());
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_valid(), "{:?}", reports[0].errors);
    }

    #[test]
    fn test_delivered_alternative_without_companions() {
        let headers = [(
            "SAND-DeliveredAlternative",
            r#"contentLocation="http://a.com/alt.mp4""#,
        )];
        let reports = check_headers(&headers, &HeaderConfig::default());
        assert_eq!(
            reports[0].errors,
            vec![
                "Mandatory Warning header missing for DeliveredAlternative.",
                "Mandatory ContentLocation header missing for DeliveredAlternative.",
                "Mandatory Vary header missing for DeliveredAlternative.",
            ]
        );
    }

    #[test]
    fn test_delivered_alternative_inconsistent_companions() {
        let headers = [
            ("SAND-DeliveredAlternative", r#"contentLocation="http://a.com/alt.mp4""#),
            ("Warning", "199 Miscellaneous"),
            ("ContentLocation", "http://a.com/other.mp4"),
            ("Vary", "Accept"),
        ];
        let reports = check_headers(&headers, &HeaderConfig::default());
        assert_eq!(
            reports[0].errors,
            vec![
                "A Warning header with \"214 Transformation Applied\" is expected.",
                "ContentLocation header and contentLocation@DeliveredAlternative are not consistent.",
                "The Vary header should mention sand-acceptedalternatives for a DeliveredAlternative.",
            ]
        );
    }

    #[test]
    fn test_vary_star_and_repeated_warnings() {
        let headers = [
            ("Warning", "214 Transformation Applied"),
            ("Warning", "199 Miscellaneous"),
            ("SAND-DeliveredAlternative", r#"contentLocation="alt.mp4""#),
            ("ContentLocation", "alt.mp4"),
            ("Vary", "*"),
        ];
        let reports = check_headers(&headers, &HeaderConfig::default());
        assert!(reports[0].is_valid(), "{:?}", reports[0].errors);
    }

    #[test]
    fn test_header_block_keeps_companions_together() {
        let block = "SAND-DeliveredAlternative: contentLocation=\"http://a.com/alt.mp4\"\n\
                     Warning: 214 Transformation Applied\n\
                     \n\
                     ContentLocation: http://a.com/alt.mp4\n\
                     Vary: SAND-AcceptedAlternatives\n";
        let reports = check_header_block(block.lines(), &HeaderConfig::default());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "SAND-DeliveredAlternative");
        assert!(reports[0].is_valid(), "{:?}", reports[0].errors);
    }

    #[test]
    fn test_header_block_reports_lines_without_separator() {
        let reports = check_header_block(
            ["SAND-MaxRTT: maxRTT=50", "garbage"],
            &HeaderConfig::default(),
        );
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_valid());
        assert_eq!(reports[1].name, "garbage");
        assert_eq!(reports[1].errors, vec![MISSING_SEPARATOR]);
    }

    #[test]
    fn test_check_headers_reports_unknown_sand_headers_only() {
        let headers = [("SAND-Unknown", "a=1"), ("Accept", "*/*")];
        let reports = check_headers(&headers, &HeaderConfig::default());
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].name, "SAND-Unknown");
        assert!(!reports[0].is_valid());
    }
}
