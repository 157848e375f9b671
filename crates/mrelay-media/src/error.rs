//! Error types for media operations.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while fetching or transcoding media.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found at {0}")]
    FfmpegNotFound(PathBuf),

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        output: String,
        exit_code: Option<i32>,
    },

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Too many redirects ({hops}) while fetching {url}")]
    TooManyRedirects { hops: u32, url: String },

    #[error("HTTP {status} while fetching {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid caption style: {0}")]
    InvalidStyle(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        output: impl Into<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            output: output.into(),
            exit_code,
        }
    }

    /// Create a download failure error.
    pub fn download_failed(message: impl Into<String>) -> Self {
        Self::DownloadFailed {
            message: message.into(),
        }
    }

    /// Whether the error was raised by the timeout guard.
    pub fn is_timeout(&self) -> bool {
        matches!(self, MediaError::Timeout(_))
    }
}
