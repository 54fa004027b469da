use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::storage::StoreError;

/// Main error type for Souk operations
#[derive(Error, Debug)]
pub enum SoukError {
    /// Rejected user input, reported before any retrieval happens
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation errors
    #[error("Configuration validation failed: {errors:?}")]
    ConfigValidation { errors: Vec<ValidationError> },

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Document store errors; `StoreError::Unavailable` is the only upstream
    /// failure that propagates out of a search instead of degrading it
    #[error("Document store error: {0}")]
    Store(#[from] StoreError),

    /// Embedding generation errors
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// An external call exceeded its bound; handled by degradation at the
    /// strategy boundary, never surfaced to callers
    #[error("Upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// Parseable but invalid response from an external collaborator
    #[error("Malformed upstream response: {0}")]
    UpstreamMalformed(String),

    /// IO errors
    #[error("IO error: {context}: {source}")]
    Io {
        source: std::io::Error,
        context: String,
    },

    /// TOML deserialization errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialization(#[from] toml::ser::Error),

    /// Generic errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Path to the configuration key that failed validation
    pub path: String,
    /// Error message describing the validation failure
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for Souk operations
pub type Result<T> = std::result::Result<T, SoukError>;
