//! Job error types.

use mrelay_media::MediaError;
use mrelay_storage::StorageError;
use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Invalid job: {0}")]
    InvalidInput(String),

    #[error("Fetch failed: {0}")]
    Fetch(#[source] MediaError),

    #[error("Transcode failed: {0}")]
    Transcode(#[source] MediaError),

    #[error("Could not determine source duration")]
    DurationUnavailable,

    #[error("Source too short to trim ({duration:.2}s)")]
    SourceTooShort { duration: f64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the job was rejected because of its parameters.
    pub fn is_validation(&self) -> bool {
        matches!(self, JobError::InvalidInput(_))
    }

    /// Whether the transform was killed by its timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, JobError::Transcode(e) if e.is_timeout())
    }
}
