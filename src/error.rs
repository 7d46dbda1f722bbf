//! Error types for sandcheck.

use thiserror::Error;

/// Errors surfaced by the validator and its CLI.
///
/// Rule violations are never errors: they are accumulated in a
/// [`Report`](crate::validation::Report). Only [`SandError::MalformedDocument`]
/// stops a validation run.
#[derive(Debug, Error)]
pub enum SandError {
    /// Input is not well-formed XML.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A namespace prefix is not bound in the document.
    #[error("unknown namespace: {0}")]
    UnknownNamespace(String),

    /// The root element belongs to no supported document kind.
    #[error("unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Validation completed with findings; used by the CLI to signal exit status.
    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SandError::MalformedDocument("unexpected EOF".to_string());
        assert_eq!(err.to_string(), "malformed document: unexpected EOF");

        let err = SandError::UnknownNamespace("sand".to_string());
        assert_eq!(err.to_string(), "unknown namespace: sand");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.mpd");
        let err: SandError = io.into();
        assert!(matches!(err, SandError::Io(_)));
    }
}
