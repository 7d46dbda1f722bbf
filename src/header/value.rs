//! Value types of sand-attributes carried in HTTP headers.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Characters allowed in the body of a URI (RFC 3986).
const URI_ALLOWED: &str = r"[A-Za-z0-9.\-_~:/?#\[\]@!$&'()*+,;=]";
/// Percent-encoded octet.
const URI_ENCODED: &str = r"%[A-Fa-f0-9]{2}";

static QUOTED_STRING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(\\"|[^"])*""#).expect("valid regex"));

static QUOTED_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^(?:"[A-Za-z][A-Za-z0-9+.\-]*:(?:{URI_ALLOWED}|{URI_ENCODED})+"|"(?:{URI_ALLOWED}|{URI_ENCODED})+")"#
    ))
    .expect("valid regex")
});

static QUOTED_URN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"^"urn:(?:{URI_ALLOWED}|{URI_ENCODED})+""#)).expect("valid regex")
});

static INT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+").expect("valid regex"));

static BYTE_RANGE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[0-9]+-[0-9]*|-[0-9]+)").expect("valid regex"));

static DATETIME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{8}T[0-9]{6}(?:\.[0-9]{0,6})?Z").expect("valid regex")
});

static LIST_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(?:[0-9]+(?:,[0-9]+)*)?\]").expect("valid regex"));

/// Characters that may belong to a misspelled date-time, such as the
/// extended ISO 8601 form `2016-06-01T12:00:00Z`.
static DATETIME_CHARS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9\-T:.Z]+").expect("valid regex"));

/// Type of a sand-attribute value.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ValueType {
    QuotedString,
    QuotedUri,
    QuotedUrn,
    Int,
    ByteRange,
    /// Basic ISO 8601 UTC form, e.g. `20160601T120000Z`.
    DateTime,
    /// Bracketed list of integer codes, e.g. `[1,12]`.
    List,
}

impl ValueType {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::QuotedString => "QUOTEDSTRING",
            Self::QuotedUri => "QUOTEDURI",
            Self::QuotedUrn => "QUOTEDURN",
            Self::Int => "INT",
            Self::ByteRange => "BYTERANGE",
            Self::DateTime => "DATETIME",
            Self::List => "LIST",
        }
    }

    fn pattern(self) -> &'static Regex {
        match self {
            Self::QuotedString => &QUOTED_STRING_REGEX,
            Self::QuotedUri => &QUOTED_URI_REGEX,
            Self::QuotedUrn => &QUOTED_URN_REGEX,
            Self::Int => &INT_REGEX,
            Self::ByteRange => &BYTE_RANGE_REGEX,
            Self::DateTime => &DATETIME_REGEX,
            Self::List => &LIST_REGEX,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of reading one value at the start of some input.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ScannedValue<'a> {
    /// The consumed text, quotes included.
    pub text: &'a str,
    pub error: Option<String>,
}

/// Read a value of type `expected` at the start of `input`.
///
/// On mismatch nothing is consumed, except for date-times where the
/// plausible date-time characters are skipped so parsing can resume after
/// them.
pub fn scan_value<'a>(expected: ValueType, input: &'a str, suffix: &str) -> ScannedValue<'a> {
    if let Some(found) = expected.pattern().find(input) {
        let text = found.as_str();
        let error = if expected == ValueType::ByteRange {
            check_byte_range(text, suffix)
        } else {
            None
        };
        return ScannedValue { text, error };
    }

    let text = if expected == ValueType::DateTime {
        DATETIME_CHARS_REGEX.find(input).map_or("", |m| m.as_str())
    } else {
        ""
    };
    ScannedValue {
        text,
        error: Some(format!("Wrong or missing {expected} specification{suffix}.")),
    }
}

fn check_byte_range(text: &str, suffix: &str) -> Option<String> {
    let (first, last) = text.split_once('-')?;
    if first.is_empty() || last.is_empty() {
        return None;
    }
    (compare_decimal(first, last) == Ordering::Greater)
        .then(|| format!("Inconsistent byte range ({first} > {last}){suffix}."))
}

/// Numeric comparison of two digit strings of any length.
fn compare_decimal(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepts(expected: ValueType, input: &str) -> Option<&str> {
        let scanned = scan_value(expected, input, "");
        scanned.error.is_none().then_some(scanned.text)
    }

    #[test]
    fn test_int() {
        assert_eq!(accepts(ValueType::Int, "50"), Some("50"));
        assert_eq!(accepts(ValueType::Int, "50,x=1"), Some("50"));
        assert_eq!(accepts(ValueType::Int, "abc"), None);
        assert_eq!(accepts(ValueType::Int, " 5"), None);
    }

    #[test]
    fn test_datetime() {
        assert_eq!(
            accepts(ValueType::DateTime, "20160601T120000Z"),
            Some("20160601T120000Z")
        );
        assert_eq!(
            accepts(ValueType::DateTime, "20160601T120000.123Z,"),
            Some("20160601T120000.123Z")
        );
        assert_eq!(accepts(ValueType::DateTime, "20160601T120000.1234567Z"), None);
    }

    #[test]
    fn test_extended_datetime_is_consumed_but_rejected() {
        let scanned = scan_value(ValueType::DateTime, "2016-06-01T12:00:00Z,foo=1", "");
        assert_eq!(scanned.text, "2016-06-01T12:00:00Z");
        assert_eq!(
            scanned.error.as_deref(),
            Some("Wrong or missing DATETIME specification.")
        );
    }

    #[test]
    fn test_quoted_uri() {
        assert_eq!(
            accepts(ValueType::QuotedUri, r#""http://a.com/seg%201.mp4""#),
            Some(r#""http://a.com/seg%201.mp4""#)
        );
        assert_eq!(accepts(ValueType::QuotedUri, r#""seg1.mp4""#), Some(r#""seg1.mp4""#));
        assert_eq!(accepts(ValueType::QuotedUri, r#""a b""#), None);
        assert_eq!(accepts(ValueType::QuotedUri, "http://a.com"), None);
    }

    #[test]
    fn test_quoted_urn() {
        assert!(accepts(ValueType::QuotedUrn, r#""urn:mpeg:dash:sand:messageset:all:2016""#).is_some());
        assert_eq!(accepts(ValueType::QuotedUrn, r#""http://a""#), None);
    }

    #[test]
    fn test_quoted_string_with_escape() {
        assert_eq!(
            accepts(ValueType::QuotedString, r#""a\"b",x"#),
            Some(r#""a\"b""#)
        );
        assert_eq!(accepts(ValueType::QuotedString, "abc"), None);
    }

    #[test]
    fn test_byte_range() {
        assert_eq!(accepts(ValueType::ByteRange, "0-499"), Some("0-499"));
        assert_eq!(accepts(ValueType::ByteRange, "500-"), Some("500-"));
        assert_eq!(accepts(ValueType::ByteRange, "-500"), Some("-500"));
        let scanned = scan_value(ValueType::ByteRange, "500-20", " for object at position 1");
        assert_eq!(scanned.text, "500-20");
        assert_eq!(
            scanned.error.as_deref(),
            Some("Inconsistent byte range (500 > 20) for object at position 1.")
        );
    }

    #[test]
    fn test_byte_range_large_numbers() {
        assert!(accepts(ValueType::ByteRange, "99999999999999999999999-100000000000000000000000").is_some());
        assert!(accepts(ValueType::ByteRange, "0010-9").is_none());
    }

    #[test]
    fn test_list() {
        assert_eq!(accepts(ValueType::List, "[]"), Some("[]"));
        assert_eq!(accepts(ValueType::List, "[1,12,21]"), Some("[1,12,21]"));
        assert_eq!(accepts(ValueType::List, "[1;2]"), None);
    }
}
