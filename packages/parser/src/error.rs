//! Error types for the dictamen parser.
//!
//! Parsing itself never fails on malformed document content: unresolvable
//! laws become `UNKNOWN` and unresolvable targets stay empty. Only loading
//! inputs (files, JSON, YAML) and validating overlays can fail.

use thiserror::Error;

/// Main error type for the parser library.
#[derive(Debug, Error)]
pub enum ParserError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error.
    #[error("YAML parsing failed: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// A manual correction record that cannot be applied.
    #[error("Invalid overlay record for dictamen article {dictamen_article}: {reason}")]
    InvalidOverlay {
        dictamen_article: String,
        reason: String,
    },

    /// Overlay or configuration file with an unsupported extension.
    #[error("Unsupported file format: '{0}'. Expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;
