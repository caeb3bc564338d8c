//! Error types for the vectorless engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while indexing or querying a document.
#[derive(Error, Debug)]
pub enum Error {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A deterministic input error: retrying cannot change the outcome.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The artifact file does not exist.
    #[error("Index artifact not found at '{0}'")]
    IndexNotFound(PathBuf),

    /// The artifact is structurally invalid (missing root, dangling ids).
    #[error("Index artifact is corrupt: {0}")]
    ArtifactCorrupt(String),

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM navigation was requested but the capability is not configured.
    #[error("LLM navigation is disabled")]
    LlmUnavailable,

    /// LLM API error.
    #[error("LLM API error: {0}")]
    LlmApi(String),

    /// LLM response parsing error.
    #[error("Failed to parse LLM response: {0}")]
    LlmParse(String),

    /// HTTP request error.
    #[error("HTTP request failed: {0}")]
    Http(String),
}

impl Error {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a corrupt-artifact error.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::ArtifactCorrupt(message.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_messages() {
        assert_eq!(
            Error::invalid_input("top_k must be at least 1").to_string(),
            "Invalid input: top_k must be at least 1"
        );
        assert_eq!(
            Error::corrupt("artifact has no root node").to_string(),
            "Index artifact is corrupt: artifact has no root node"
        );
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(
            Error::IndexNotFound(PathBuf::from("data/index.json")).to_string(),
            "Index artifact not found at 'data/index.json'"
        );
        assert_eq!(
            Error::Serialization("unexpected end of input".to_string()).to_string(),
            "Serialization error: unexpected end of input"
        );
        assert_eq!(
            Error::Config("api_key is required".to_string()).to_string(),
            "Configuration error: api_key is required"
        );
        assert_eq!(
            Error::LlmParse("no node_id field".to_string()).to_string(),
            "Failed to parse LLM response: no node_id field"
        );
    }
}
