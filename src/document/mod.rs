//! Read-only XML document model used by the validation rules.
//!
//! Documents are parsed once with `quick-xml` into an arena tree that owns
//! every element. Elements link to their parent by index, so navigation
//! never involves shared ownership. An id index (element name → `id`
//! value → elements) is built at construction for cross-reference rules.

pub mod model;
pub mod namespaces;
mod parse;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use model::{Attribute, Document, Element, ElementId, QName};

use crate::error::{Result, SandError};

/// The two families of documents the rule catalog covers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    /// A SAND message envelope.
    SandMessage,
    /// An MPD manifest with SAND extensions.
    Mpd,
}

impl DocumentKind {
    /// Detect the kind from the root element's namespace.
    pub fn detect(document: &Document) -> Result<Self> {
        match document.root().name().namespace.as_deref() {
            Some(namespaces::SAND_MESSAGE_NS) => Ok(Self::SandMessage),
            Some(namespaces::MPD_NS) => Ok(Self::Mpd),
            Some(other) => Err(SandError::UnsupportedDocument(format!(
                "root element <{}> is in namespace '{other}'",
                document.root().display_name()
            ))),
            None => Err(SandError::UnsupportedDocument(format!(
                "root element <{}> has no namespace",
                document.root().display_name()
            ))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SandMessage => write!(f, "sand-message"),
            Self::Mpd => write!(f, "mpd"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_kind() {
        let mpd = Document::parse(r#"<MPD xmlns="urn:mpeg:dash:schema:mpd:2011"/>"#).unwrap();
        assert_eq!(DocumentKind::detect(&mpd).unwrap(), DocumentKind::Mpd);

        let msg = Document::parse(
            r#"<SANDMessage xmlns="urn:mpeg:dash:schema:sandmessage:2016"/>"#,
        )
        .unwrap();
        assert_eq!(DocumentKind::detect(&msg).unwrap(), DocumentKind::SandMessage);

        let other = Document::parse("<html/>").unwrap();
        assert!(matches!(
            DocumentKind::detect(&other),
            Err(SandError::UnsupportedDocument(_))
        ));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(DocumentKind::Mpd.to_string(), "mpd");
        assert_eq!(DocumentKind::SandMessage.to_string(), "sand-message");
    }
}
