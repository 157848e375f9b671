//! Storage error types.

use std::fmt::Display;

use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised while talking to the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage is not configured: {0}")]
    ConfigError(String),

    #[error("Upload of '{key}' failed: {message}")]
    UploadFailed { key: String, message: String },

    #[error("Delete of '{key}' failed: {message}")]
    DeleteFailed { key: String, message: String },

    #[error("Listing '{prefix}' failed: {message}")]
    ListFailed { prefix: String, message: String },

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Bucket unreachable: {0}")]
    Unreachable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upload_failed(key: &str, err: impl Display) -> Self {
        Self::UploadFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub fn delete_failed(key: &str, err: impl Display) -> Self {
        Self::DeleteFailed {
            key: key.to_string(),
            message: err.to_string(),
        }
    }

    pub fn list_failed(prefix: &str, err: impl Display) -> Self {
        Self::ListFailed {
            prefix: prefix.to_string(),
            message: err.to_string(),
        }
    }

    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }
}
