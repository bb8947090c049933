//! Error types for the V2V decision core

use thiserror::Error;

/// Main error type for V2V operations
#[derive(Error, Debug)]
pub enum V2VError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient data: requested {requested} transitions, {available} available")]
    InsufficientData { requested: usize, available: usize },

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Lock error: {0}")]
    Lock(String),
}

/// Result type alias for V2V operations
pub type Result<T> = std::result::Result<T, V2VError>;
