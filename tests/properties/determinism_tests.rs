use proptest::prelude::*;

use sandcheck::document::Document;
use sandcheck::validation::{RuleSet, ValidationEngine, validate};

/// One SAND message element with a random subset of its optional attributes.
fn arb_message_element() -> impl Strategy<Value = String> {
    let names = prop::sample::select(vec![
        "QoSInformation",
        "Throughput",
        "AvailabilityTimeOffset",
        "SharedResourceAssignment",
        "DaneCapabilities",
    ]);
    let attrs = prop::collection::vec(
        prop::sample::select(vec![
            "gbr", "mbr", "delay", "pl", "repId", "baseUrl", "validityTime", "offset",
        ]),
        0..4,
    );
    (names, attrs).prop_map(|(name, mut attrs)| {
        attrs.sort_unstable();
        attrs.dedup();
        let rendered: String = attrs.iter().map(|a| format!(r#" {a}="1""#)).collect();
        format!("<{name}{rendered}/>")
    })
}

fn arb_message() -> impl Strategy<Value = String> {
    prop::collection::vec(arb_message_element(), 0..12).prop_map(|elements| {
        format!(
            r#"<SANDMessage xmlns="urn:mpeg:dash:schema:sandmessage:2016">{}</SANDMessage>"#,
            elements.concat()
        )
    })
}

proptest! {
    #[test]
    fn test_validate_deterministic(xml in arb_message()) {
        let doc = Document::parse(&xml).unwrap();
        let rules = RuleSet::for_sand_messages();
        let engine = ValidationEngine::with_defaults();
        let first = engine.validate(&doc, &rules);
        let second = engine.validate(&doc, &rules);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_violation_codes_come_from_rule_set(xml in arb_message()) {
        let doc = Document::parse(&xml).unwrap();
        let rules = RuleSet::for_sand_messages();
        let report = validate(&doc, &rules);
        for violation in report.violations() {
            prop_assert!(rules.contains(&violation.rule_code));
            prop_assert!(violation.path.starts_with("/SANDMessage[1]/"));
        }
    }

    #[test]
    fn test_violations_bounded_by_checked_elements(xml in arb_message()) {
        let doc = Document::parse(&xml).unwrap();
        let report = validate(&doc, &RuleSet::for_sand_messages());
        let checked: usize = report.checked_contexts().values().sum();
        prop_assert!(report.violation_count() <= checked);
        prop_assert!(checked < doc.len());
    }

    #[test]
    fn test_reparse_gives_same_report(xml in arb_message()) {
        let rules = RuleSet::for_sand_messages();
        let first = validate(&Document::parse(&xml).unwrap(), &rules);
        let second = validate(&Document::parse(&xml).unwrap(), &rules);
        prop_assert_eq!(first, second);
    }
}
