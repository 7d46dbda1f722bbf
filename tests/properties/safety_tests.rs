use proptest::prelude::*;

use sandcheck::document::Document;
use sandcheck::header::{HeaderConfig, MessageKind, check_header, check_header_line};
use sandcheck::validation::{RuleSet, validate};

fn arb_header_name() -> impl Strategy<Value = &'static str> {
    prop::sample::select(MessageKind::ALL.map(MessageKind::header_name).to_vec())
}

proptest! {
    // =========================================================================
    // Document Parser Safety Tests
    // =========================================================================

    #[test]
    fn test_parse_never_panics(input in ".*") {
        let _ = Document::parse(&input);
    }

    #[test]
    fn test_parse_arbitrary_bytes(bytes in prop::collection::vec(any::<u8>(), 0..1000)) {
        let input = String::from_utf8_lossy(&bytes);
        if let Ok(doc) = Document::parse(&input) {
            let _ = validate(&doc, &RuleSet::for_mpd());
            let _ = validate(&doc, &RuleSet::for_sand_messages());
        }
    }

    // =========================================================================
    // Header Checker Safety Tests
    // =========================================================================

    #[test]
    fn test_check_header_never_panics(name in arb_header_name(), value in ".*") {
        let _ = check_header(name, &value, &HeaderConfig::default());
    }

    #[test]
    fn test_check_header_grammar_chars(
        name in arb_header_name(),
        value in r#"[a-zA-Z0-9=,;\[\]" :.\-]{0,60}"#,
    ) {
        let config = HeaderConfig {
            weight_for_strategy: true,
            consistent_operation_points: true,
        };
        let _ = check_header(name, &value, &config);
    }

    #[test]
    fn test_check_header_line_never_panics(line in ".*") {
        let report = check_header_line(&line, &HeaderConfig::default());
        prop_assert!(report.errors.iter().all(|e| !e.is_empty()));
    }

    #[test]
    fn test_valid_max_rtt_accepted(rtt in 0u64..1_000_000) {
        let errors = check_header("SAND-MaxRTT", &format!("maxRTT={rtt}"), &HeaderConfig::default());
        prop_assert!(errors.is_empty(), "{:?}", errors);
    }
}
