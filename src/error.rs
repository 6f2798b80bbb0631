//! Error types for the todo list.

use std::path::PathBuf;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Document store errors. None of these are recovered by the handlers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt store file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid document id {key:?} in {}", path.display())]
    InvalidDocumentId { path: PathBuf, key: String },

    #[error("No document ids left in {}", path.display())]
    IdExhausted { path: PathBuf },

    #[error("Failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failure to produce a signed flash cookie.
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    #[error("Failed to serialize flash: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Flash signing key rejected")]
    InvalidKey,
}

/// User input errors, reported back as a status message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Title cannot be empty.")]
    EmptyTitle,

    #[error("Invalid todo id: {0}")]
    InvalidId(String),

    #[error("Could not read the submitted form.")]
    MalformedForm,
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
