//! Media configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Configuration for fetching and transcoding.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// FFmpeg binary
    pub ffmpeg_path: PathBuf,
    /// Directory holding per-job temporary files
    pub work_dir: PathBuf,
    /// Hard limit for transform invocations
    pub transform_timeout: Duration,
    /// Hard limit for metadata probes
    pub probe_timeout: Duration,
    /// Connect timeout for source downloads
    pub fetch_connect_timeout: Duration,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            work_dir: std::env::temp_dir(),
            transform_timeout: Duration::from_secs(900),
            probe_timeout: Duration::from_secs(30),
            fetch_connect_timeout: Duration::from_secs(30),
        }
    }
}

impl MediaConfig {
    /// Create config from environment variables.
    ///
    /// Without `FFMPEG_PATH` the binary is resolved from `PATH`, falling back
    /// to the bare name so the error surfaces on first use.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            ffmpeg_path: std::env::var("FFMPEG_PATH")
                .map(PathBuf::from)
                .or_else(|_| which::which("ffmpeg"))
                .unwrap_or(defaults.ffmpeg_path),
            work_dir: std::env::var("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            transform_timeout: Duration::from_secs(
                std::env::var("TRANSFORM_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(900),
            ),
            probe_timeout: Duration::from_secs(
                std::env::var("PROBE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            fetch_connect_timeout: Duration::from_secs(
                std::env::var("FETCH_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}
