//! Parser for the sand-object grammar of SAND HTTP headers.
//!
//! A header value is one top-level sand-object: `,`-separated
//! sand-attributes (`name=value`) and at most one sand-list
//! (`[object;object;...]`). Parsing goes as far as it can and collects every
//! error on the way; only a handful of errors make further parsing
//! meaningless and stop it.

use std::collections::BTreeSet;

use tracing::trace;

use super::value::{ValueType, scan_value};

/// Grammar of one sand-object.
#[derive(Debug)]
pub struct ObjectSyntax {
    /// Attributes that must be present.
    pub mandatory: &'static [&'static str],
    pub attributes: &'static [(&'static str, ValueType)],
    /// Grammar of the sand-list items, when a list is allowed.
    pub list: Option<&'static ObjectSyntax>,
    /// Whether the sand-list must be present.
    pub list_required: bool,
}

impl ObjectSyntax {
    fn value_type(&self, name: &str) -> Option<ValueType> {
        self.attributes
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, ty)| *ty)
    }

    /// Optional attributes present on `object`.
    #[must_use]
    pub fn optional_attributes<'a>(&self, object: &'a SandObject) -> BTreeSet<&'a str> {
        object
            .attributes
            .iter()
            .map(|(name, _)| name.as_str())
            .filter(|name| !self.mandatory.contains(name) && self.value_type(name).is_some())
            .collect()
    }
}

/// Attributes of the SAND envelope, repeated in every header.
const ENVELOPE_ATTRIBUTES: &[(&str, ValueType)] = &[
    ("senderId", ValueType::QuotedString),
    ("generationTime", ValueType::DateTime),
];

/// Attributes shared by every SAND message.
const COMMON_ATTRIBUTES: &[(&str, ValueType)] = &[
    ("messageId", ValueType::Int),
    ("validityTime", ValueType::DateTime),
];

fn lookup(table: &[(&str, ValueType)], name: &str) -> Option<ValueType> {
    table.iter().find(|(attr, _)| *attr == name).map(|(_, ty)| *ty)
}

/// A parsed sand-object. Attribute values are kept verbatim, quotes included.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SandObject {
    pub attributes: Vec<(String, String)>,
    pub list: Option<SandList>,
}

impl SandObject {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr, _)| attr == name)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether a non-empty sand-list was found.
    #[must_use]
    pub fn has_items(&self) -> bool {
        self.list.as_ref().is_some_and(|list| !list.items.is_empty())
    }
}

/// A parsed sand-list.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct SandList {
    pub items: Vec<SandObject>,
    /// False when the input ended before the closing `]`.
    pub closed: bool,
}

/// Result of parsing one header value.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// `None` when parsing stopped on a fatal error.
    pub object: Option<SandObject>,
    pub errors: Vec<String>,
}

/// Parsing hit an error after which nothing sensible can be read.
struct Stopped;

type Step<T> = std::result::Result<T, Stopped>;

/// Parse `input` as the value of a header whose message grammar is `syntax`.
#[must_use]
pub fn parse(syntax: &ObjectSyntax, input: &str) -> ParseOutcome {
    let mut parser = Parser {
        errors: Vec::new(),
        envelope_done: false,
        common_done: false,
    };
    let object = parser
        .object(syntax, input, true, None)
        .ok()
        .map(|(object, _)| object);
    trace!(
        stopped = object.is_none(),
        errors = parser.errors.len(),
        "parsed header value"
    );
    ParseOutcome {
        object,
        errors: parser.errors,
    }
}

struct Parser {
    errors: Vec<String>,
    // Envelope and common attributes must precede the message attributes.
    envelope_done: bool,
    common_done: bool,
}

impl Parser {
    fn error(&mut self, message: String) {
        self.errors.push(message);
    }

    fn stop(&mut self, message: String) -> Stopped {
        self.errors.push(message);
        Stopped
    }

    /// Parse a sand-object at the start of `input`, returning it with the
    /// number of bytes consumed.
    fn object(
        &mut self,
        syntax: &ObjectSyntax,
        mut input: &str,
        top_level: bool,
        position: Option<usize>,
    ) -> Step<(SandObject, usize)> {
        let suffix = position.map_or_else(String::new, |n| format!(" for object at position {n}"));
        let mut result = SandObject::default();
        let mut consumed = 0;

        while !input.is_empty() {
            let item_len = if input.starts_with('[') {
                self.nested_list(syntax, &mut result, input, &suffix)?
            } else {
                self.attribute(syntax, &mut result, input, top_level, &suffix)?
            };

            input = &input[item_len..];
            consumed += item_len;
            match input.chars().next() {
                None => {}
                Some(',') => {
                    consumed += 1;
                    input = &input[1..];
                }
                Some(other) if top_level => {
                    return Err(self.stop(format!(
                        "Expecting ',', found '{other}'{suffix}. Stopping parsing."
                    )));
                }
                // ';' or ']' ends a list item; anything else is caught by the list.
                Some(_) => break,
            }
        }

        if syntax.list_required && result.list.is_none() {
            self.error(format!("Mandatory sand-list is missing{suffix}."));
        }
        for name in syntax.mandatory {
            if !result.has(name) {
                self.error(format!(
                    "Mandatory sand-attribute '{name}' is missing{suffix}."
                ));
            }
        }
        Ok((result, consumed))
    }

    fn nested_list(
        &mut self,
        syntax: &ObjectSyntax,
        result: &mut SandObject,
        input: &str,
        suffix: &str,
    ) -> Step<usize> {
        let Some(item_syntax) = syntax.list else {
            return Err(self.stop(format!(
                "Unexpected sand-list found{suffix}. Stopping parsing."
            )));
        };
        if result.list.is_some() {
            // Still parsed, its content may be well-formed.
            self.error(format!("Only one list is allowed{suffix}."));
        }
        let (list, len) = self.list(item_syntax, input)?;
        if !list.closed {
            self.error(format!("Unmatched '[' to close sand-list{suffix}."));
        }
        result.list = Some(list);
        Ok(len)
    }

    fn attribute(
        &mut self,
        syntax: &ObjectSyntax,
        result: &mut SandObject,
        input: &str,
        top_level: bool,
        suffix: &str,
    ) -> Step<usize> {
        let (raw_name, value_part) = match input.split_once('=') {
            Some((name, rest)) => (name, Some(rest)),
            None => {
                self.error(format!("Expecting '=' for sand-attribute{suffix}."));
                (input, None)
            }
        };
        let mut len = raw_name.len() + usize::from(value_part.is_some());

        if !is_alphabetic(raw_name) {
            if is_alphabetic(raw_name.trim()) {
                self.error(format!(
                    "no space allowed around sand-attribute name{suffix}."
                ));
            } else {
                self.error(format!(
                    "sand-attribute name should be alphabetic{suffix}."
                ));
            }
        }
        if value_part.is_some_and(|rest| rest.trim().is_empty()) {
            self.error(format!(
                "Empty value for sand-attribute after '='{suffix}."
            ));
        }

        let name = raw_name.trim();
        let envelope = lookup(ENVELOPE_ATTRIBUTES, name);
        let common = lookup(COMMON_ATTRIBUTES, name);
        let value_type = if top_level {
            syntax.value_type(name).or(envelope).or(common)
        } else {
            syntax.value_type(name)
        };
        let Some(value_type) = value_type else {
            return Err(self.stop(format!(
                "Unexpected sand-attribute name '{name}'{suffix}. Stopping parsing."
            )));
        };

        let value = match value_part {
            Some(rest) if rest.trim().is_empty() => {
                len += rest.len();
                ""
            }
            Some(rest) => {
                let scanned = scan_value(value_type, rest, suffix);
                if let Some(error) = scanned.error {
                    self.error(error);
                }
                len += scanned.text.len();
                scanned.text
            }
            None => "",
        };

        if result.has(name) {
            self.error(format!(
                "sand-attribute {name} should occur only once{suffix}."
            ));
        }
        if envelope.is_some() {
            if self.envelope_done || !top_level {
                self.error(format!(
                    "Envelope attributes ({name}) should appear first in the message."
                ));
            }
        } else if common.is_some() {
            if self.common_done || !top_level {
                self.error(format!(
                    "Common attributes ({name}) should appear first in the message."
                ));
            }
        } else {
            self.envelope_done = true;
            self.common_done = true;
        }

        result.attributes.push((name.to_string(), value.to_string()));
        Ok(len)
    }

    /// Parse a sand-list; `input` starts with `[`.
    fn list(&mut self, syntax: &ObjectSyntax, input: &str) -> Step<(SandList, usize)> {
        let mut result = SandList::default();
        let mut consumed = 1;
        let mut input = &input[1..];
        let mut position = 0;

        while !input.is_empty() && !input.starts_with(']') {
            position += 1;
            let (item, len) = self.object(syntax, input, false, Some(position))?;
            result.items.push(item);
            consumed += len;
            input = &input[len..];

            match input.chars().next() {
                None | Some(']') => {}
                Some(';') => {
                    consumed += 1;
                    input = &input[1..];
                    if input.starts_with(']') {
                        self.error("Empty element at end of sand-list.".to_string());
                    }
                }
                Some(other) => {
                    return Err(self.stop(format!(
                        "Expecting ';' or ']', found '{other}'. Stopping parsing."
                    )));
                }
            }
        }

        if !input.is_empty() {
            result.closed = true;
            consumed += 1;
        }
        Ok((result, consumed))
    }
}

fn is_alphabetic(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    static ITEM: ObjectSyntax = ObjectSyntax {
        mandatory: &["sourceUrl"],
        attributes: &[
            ("sourceUrl", ValueType::QuotedUri),
            ("range", ValueType::ByteRange),
            ("bandwidth", ValueType::Int),
        ],
        list: None,
        list_required: false,
    };

    static MESSAGE: ObjectSyntax = ObjectSyntax {
        mandatory: &[],
        attributes: &[("weight", ValueType::Int)],
        list: Some(&ITEM),
        list_required: true,
    };

    static FLAT: ObjectSyntax = ObjectSyntax {
        mandatory: &["maxRTT"],
        attributes: &[("maxRTT", ValueType::Int)],
        list: None,
        list_required: false,
    };

    #[test]
    fn test_flat_object() {
        let outcome = parse(&FLAT, "maxRTT=50");
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        assert_eq!(outcome.object.unwrap().get("maxRTT"), Some("50"));
    }

    #[test]
    fn test_envelope_and_common_attributes() {
        let outcome = parse(
            &FLAT,
            r#"senderId="abc",messageId=3,generationTime=20160601T120000Z,maxRTT=50"#,
        );
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let object = outcome.object.unwrap();
        assert_eq!(object.get("senderId"), Some(r#""abc""#));
        assert_eq!(object.get("messageId"), Some("3"));
    }

    #[test]
    fn test_envelope_after_message_attribute() {
        let outcome = parse(&FLAT, "maxRTT=50,messageId=3");
        assert_eq!(
            outcome.errors,
            vec!["Common attributes (messageId) should appear first in the message."]
        );
    }

    #[test]
    fn test_list_of_objects() {
        let outcome = parse(
            &MESSAGE,
            r#"weight=2,[sourceUrl="a.mp4",range=0-99;sourceUrl="b.mp4",bandwidth=1000]"#,
        );
        assert!(outcome.errors.is_empty(), "{:?}", outcome.errors);
        let list = outcome.object.unwrap().list.unwrap();
        assert!(list.closed);
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[1].get("bandwidth"), Some("1000"));
    }

    #[test]
    fn test_missing_mandatory_in_item() {
        let outcome = parse(&MESSAGE, "[bandwidth=10]");
        assert_eq!(
            outcome.errors,
            vec!["Mandatory sand-attribute 'sourceUrl' is missing for object at position 1."]
        );
    }

    #[test]
    fn test_missing_list() {
        let outcome = parse(&MESSAGE, "weight=1");
        assert_eq!(outcome.errors, vec!["Mandatory sand-list is missing."]);
    }

    #[test]
    fn test_unclosed_list() {
        let outcome = parse(&MESSAGE, r#"[sourceUrl="a.mp4""#);
        assert_eq!(outcome.errors, vec!["Unmatched '[' to close sand-list."]);
        assert!(!outcome.object.unwrap().list.unwrap().closed);
    }

    #[test]
    fn test_trailing_semicolon() {
        let outcome = parse(&MESSAGE, r#"[sourceUrl="a.mp4";]"#);
        assert_eq!(outcome.errors, vec!["Empty element at end of sand-list."]);
    }

    #[test]
    fn test_two_lists() {
        let outcome = parse(&MESSAGE, r#"[sourceUrl="a"],[sourceUrl="b"]"#);
        assert_eq!(outcome.errors, vec!["Only one list is allowed."]);
    }

    #[test]
    fn test_unexpected_list_stops() {
        let outcome = parse(&FLAT, "[maxRTT=1]");
        assert!(outcome.object.is_none());
        assert_eq!(
            outcome.errors,
            vec!["Unexpected sand-list found. Stopping parsing."]
        );
    }

    #[test]
    fn test_unexpected_attribute_stops() {
        let outcome = parse(&FLAT, "maxRTT=1,foo=2,bar=3");
        assert!(outcome.object.is_none());
        assert_eq!(
            outcome.errors,
            vec!["Unexpected sand-attribute name 'foo'. Stopping parsing."]
        );
    }

    #[test]
    fn test_wrong_value_then_bad_separator() {
        let outcome = parse(&FLAT, "maxRTT=abc");
        assert!(outcome.object.is_none());
        assert_eq!(
            outcome.errors,
            vec![
                "Wrong or missing INT specification.",
                "Expecting ',', found 'a'. Stopping parsing.",
            ]
        );
    }

    #[test]
    fn test_name_with_spaces() {
        let outcome = parse(&FLAT, "maxRTT =5");
        assert_eq!(
            outcome.errors,
            vec!["no space allowed around sand-attribute name."]
        );
    }

    #[test]
    fn test_empty_value() {
        let outcome = parse(&FLAT, "maxRTT=");
        assert_eq!(
            outcome.errors,
            vec!["Empty value for sand-attribute after '='."]
        );
    }

    #[test]
    fn test_missing_equals() {
        let outcome = parse(&FLAT, "maxRTT");
        assert_eq!(outcome.errors, vec!["Expecting '=' for sand-attribute."]);
    }

    #[test]
    fn test_duplicate_attribute() {
        let outcome = parse(&FLAT, "maxRTT=1,maxRTT=2");
        assert_eq!(
            outcome.errors,
            vec!["sand-attribute maxRTT should occur only once."]
        );
    }

    #[test]
    fn test_bad_list_separator_stops() {
        let outcome = parse(&MESSAGE, r#"[sourceUrl="a" x]"#);
        assert!(outcome.object.is_none());
        assert_eq!(
            outcome.errors,
            vec!["Expecting ';' or ']', found ' '. Stopping parsing."]
        );
    }

    #[test]
    fn test_optional_attributes() {
        let outcome = parse(&MESSAGE, r#"[sourceUrl="a",bandwidth=5,range=1-2]"#);
        let object = outcome.object.unwrap();
        let item = &object.list.as_ref().unwrap().items[0];
        let optional: Vec<&str> = ITEM.optional_attributes(item).into_iter().collect();
        assert_eq!(optional, vec!["bandwidth", "range"]);
    }
}
