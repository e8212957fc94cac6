//! Error types for the reconciliation engine
//!
//! Only loading and saving can fail. Reconciliation itself degrades and
//! reports [`crate::ReconcileWarning`]s instead of returning errors.

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON syntax or shape error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// A law document parsed but has no usable number
    #[error("Invalid law document {path}: {reason}")]
    InvalidLaw { path: String, reason: String },

    /// Configuration file with an unsupported extension
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
