//! Error types for docloop
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in docloop
#[derive(Debug, Error)]
pub enum DocloopError {
    /// Validation collaborator failed
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Correction collaborator failed
    #[error("Correction failed: {0}")]
    Correction(String),

    /// Transient LLM provider error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Artifact persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Invalid loop configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Selector called on an empty iteration history (programmer error)
    #[error("No iterations recorded")]
    EmptyHistory,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for docloop operations
pub type Result<T> = std::result::Result<T, DocloopError>;
