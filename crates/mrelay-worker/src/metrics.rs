//! Job metrics.
//!
//! Recorded through the `metrics` facade; they are no-ops until a recorder
//! is installed by the binary.

use metrics::{counter, histogram};
use mrelay_models::TransformKind;

/// Metric names as constants for consistency.
pub mod names {
    pub const JOBS_COMPLETED_TOTAL: &str = "mrelay_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "mrelay_jobs_failed_total";
    pub const JOB_DURATION_SECONDS: &str = "mrelay_job_duration_seconds";
    pub const FFMPEG_DURATION_SECONDS: &str = "mrelay_ffmpeg_duration_seconds";
    pub const FFMPEG_TIMEOUTS_TOTAL: &str = "mrelay_ffmpeg_timeouts_total";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "mrelay_download_duration_seconds";
    pub const UPLOAD_DURATION_SECONDS: &str = "mrelay_upload_duration_seconds";
}

/// Record a completed job.
pub fn record_job_completed(kind: TransformKind, duration_secs: f64) {
    let labels = [("kind", kind.as_str().to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
    histogram!(names::JOB_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a failed job.
pub fn record_job_failed(kind: TransformKind, stage: &str) {
    let labels = [
        ("kind", kind.as_str().to_string()),
        ("stage", stage.to_string()),
    ];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// Record FFmpeg transform duration.
pub fn record_ffmpeg_duration(kind: TransformKind, duration_secs: f64) {
    let labels = [("kind", kind.as_str().to_string())];
    histogram!(names::FFMPEG_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a transform killed by its timeout.
pub fn record_ffmpeg_timeout(kind: TransformKind) {
    let labels = [("kind", kind.as_str().to_string())];
    counter!(names::FFMPEG_TIMEOUTS_TOTAL, &labels).increment(1);
}

/// Record download duration.
pub fn record_download_duration(duration_secs: f64) {
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record upload duration.
pub fn record_upload_duration(duration_secs: f64) {
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
}
