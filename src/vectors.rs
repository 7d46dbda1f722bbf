//! Runner for SAND conformance test vectors.
//!
//! A test-vector tree holds documents whose file names state the expected
//! verdict (`*-OK-*` must be conformant, `*-KO-*` must not be):
//!
//! - `mpd/<group>/*.mpd`: MPDs
//! - `per/*.xml`, `metrics/*.xml`: SAND messages
//! - `status/*.txt`, `per/*.txt`: HTTP header blocks

use std::fmt;
use std::path::{Path, PathBuf};

use glob::{Pattern, glob};
use serde::Serialize;
use tracing::{debug, info};

use crate::document::Document;
use crate::error::{Result, SandError};
use crate::header::{HeaderConfig, check_header_block};
use crate::validation::{RuleSet, ValidationEngine};

/// What a vector file contains.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VectorKind {
    Mpd,
    SandMessage,
    Headers,
}

impl fmt::Display for VectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mpd => write!(f, "mpd"),
            Self::SandMessage => write!(f, "sand-message"),
            Self::Headers => write!(f, "headers"),
        }
    }
}

/// Verdict a vector's name announces.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum Expectation {
    #[serde(rename = "OK")]
    Conformant,
    #[serde(rename = "KO")]
    NonConformant,
}

impl Expectation {
    const fn tag(self) -> &'static str {
        match self {
            Self::Conformant => "OK",
            Self::NonConformant => "KO",
        }
    }
}

/// Vector locations relative to the tree root.
const LAYOUT: [(VectorKind, &str, &str); 5] = [
    (VectorKind::Mpd, "mpd/*", "mpd"),
    (VectorKind::SandMessage, "per", "xml"),
    (VectorKind::SandMessage, "metrics", "xml"),
    (VectorKind::Headers, "status", "txt"),
    (VectorKind::Headers, "per", "txt"),
];

/// Verdict on one vector.
#[derive(Debug, Clone, Serialize)]
pub struct VectorOutcome {
    pub path: PathBuf,
    pub kind: VectorKind,
    pub expected: Expectation,
    pub conformant: bool,
    /// Violations or errors found in the vector.
    pub details: Vec<String>,
}

impl VectorOutcome {
    /// Whether the checker agrees with the vector's name.
    #[must_use]
    pub fn as_expected(&self) -> bool {
        self.conformant == (self.expected == Expectation::Conformant)
    }
}

/// Every outcome of a run, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VectorSummary {
    pub outcomes: Vec<VectorOutcome>,
}

impl VectorSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.as_expected()).count()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &VectorOutcome> {
        self.outcomes.iter().filter(|o| !o.as_expected())
    }

    #[must_use]
    pub fn all_as_expected(&self) -> bool {
        self.outcomes.iter().all(VectorOutcome::as_expected)
    }
}

/// Checks a test-vector tree with one engine and header configuration.
pub struct VectorRunner<'a> {
    engine: &'a ValidationEngine,
    headers: &'a HeaderConfig,
    mpd_rules: RuleSet,
    message_rules: RuleSet,
}

impl<'a> VectorRunner<'a> {
    #[must_use]
    pub fn new(engine: &'a ValidationEngine, headers: &'a HeaderConfig) -> Self {
        Self {
            engine,
            headers,
            mpd_rules: RuleSet::for_mpd(),
            message_rules: RuleSet::for_sand_messages(),
        }
    }

    /// Check every vector under `root`.
    pub fn run(&self, root: &Path) -> Result<VectorSummary> {
        if !root.is_dir() {
            return Err(SandError::NotFound(format!(
                "test vector directory {}",
                root.display()
            )));
        }
        let base = root.to_str().ok_or_else(|| {
            SandError::Config(format!("non UTF-8 vector path: {}", root.display()))
        })?;
        let base = Pattern::escape(base);

        let mut summary = VectorSummary::default();
        for (kind, dir, extension) in LAYOUT {
            for expected in [Expectation::Conformant, Expectation::NonConformant] {
                let pattern = format!("{base}/{dir}/*-{}-*.{extension}", expected.tag());
                let paths: Vec<PathBuf> = glob(&pattern)
                    .map_err(|e| SandError::Config(format!("Invalid glob pattern: {e}")))?
                    .filter_map(std::result::Result::ok)
                    .filter(|p| p.is_file())
                    .collect();
                debug!(pattern = %pattern, found = paths.len(), "collected vectors");
                for path in paths {
                    summary.outcomes.push(self.check(kind, expected, path));
                }
            }
        }

        info!(
            total = summary.total(),
            passed = summary.passed(),
            "test vectors checked"
        );
        Ok(summary)
    }

    /// Check a single vector.
    #[must_use]
    pub fn check(&self, kind: VectorKind, expected: Expectation, path: PathBuf) -> VectorOutcome {
        let result = match kind {
            VectorKind::Mpd => self.check_document(&path, &self.mpd_rules),
            VectorKind::SandMessage => self.check_document(&path, &self.message_rules),
            VectorKind::Headers => self.check_headers(&path, expected),
        };
        let (conformant, details) = result.unwrap_or_else(|err| (false, vec![err.to_string()]));
        VectorOutcome {
            path,
            kind,
            expected,
            conformant,
            details,
        }
    }

    fn check_document(&self, path: &Path, rules: &RuleSet) -> Result<(bool, Vec<String>)> {
        let document = Document::from_path(path)?;
        let report = self.engine.validate(&document, rules);
        let details = report.violations().iter().map(ToString::to_string).collect();
        Ok((report.is_conformant(), details))
    }

    /// An OK header vector is conformant when every SAND header in it is
    /// valid. A KO vector holds invalid messages only, so it is
    /// non-conformant only when every one of them is rejected.
    fn check_headers(&self, path: &Path, expected: Expectation) -> Result<(bool, Vec<String>)> {
        let content = std::fs::read_to_string(path)?;
        let reports = check_header_block(content.lines(), self.headers);
        let mut details = Vec::new();
        for report in &reports {
            if report.is_valid() {
                if expected == Expectation::NonConformant {
                    details.push(format!("{}: accepted", report.name));
                }
                continue;
            }
            details.extend(
                report
                    .errors
                    .iter()
                    .map(|error| format!("{}: {error}", report.name)),
            );
        }
        let conformant = match expected {
            Expectation::Conformant => reports.iter().all(|r| r.is_valid()),
            Expectation::NonConformant => reports.iter().any(|r| r.is_valid()),
        };
        Ok((conformant, details))
    }
}
