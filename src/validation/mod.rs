//! Rule-driven conformance validation.
//!
//! This module provides:
//!
//! - `ValidationRule` trait for the compiled rule predicates
//! - `RuleSet` catalogs for SAND messages and MPDs
//! - `ValidationEngine` for running a rule set against a document
//! - `Report` / `Violation` types for the findings
//!
//! # Example
//!
//! ```
//! use sandcheck::document::Document;
//! use sandcheck::validation::{RuleSet, ValidationConfig, ValidationEngine};
//!
//! let mpd = Document::parse(r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011"
//!      xmlns:sand="urn:mpeg:dash:schema:sand:2016">
//!   <sand:Channel id="0" schemeIdUri="urn:mpeg:dash:sand:channel:websocket:2016"
//!                 endpoint="ws://cdn3.example.com"/>
//! </MPD>"#).unwrap();
//!
//! let engine = ValidationEngine::new(ValidationConfig::new());
//! let report = engine.validate(&mpd, &RuleSet::for_mpd());
//! assert!(report.is_conformant());
//! ```

pub mod config;
pub mod engine;
pub mod report;
pub mod rule;
pub mod rules;

pub use config::{ValidationConfig, ValidationContext};
pub use engine::{RuleInfo, ValidationEngine, validate};
pub use report::{Report, Violation};
pub use rule::{BoxedRule, RuleCategory, RuleContext, ValidationRule, Verdict};
pub use rules::{RuleSet, all_rules};
