//! Error types for studynotes.

use thiserror::Error;

/// Library-level error type for studynotes operations.
#[derive(Error, Debug)]
pub enum StudyNotesError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not read PDF '{name}': {reason}")]
    DocumentParse { name: String, reason: String },

    #[error("Remote model error: {0}")]
    Remote(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl StudyNotesError {
    /// Build a document-parse error for the named document.
    pub fn document_parse(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::DocumentParse {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure came from the remote model endpoint.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

/// Result type alias for studynotes operations.
pub type Result<T> = std::result::Result<T, StudyNotesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_parse_message() {
        let err = StudyNotesError::document_parse("notes.pdf", "invalid file header");
        assert_eq!(
            err.to_string(),
            "Could not read PDF 'notes.pdf': invalid file header"
        );
        assert!(!err.is_remote());
    }

    #[test]
    fn test_remote_classification() {
        assert!(StudyNotesError::Remote("connection refused".into()).is_remote());
        assert!(!StudyNotesError::Config("missing key".into()).is_remote());
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(!StudyNotesError::from(io).is_remote());
    }
}
