//! Structured job logging utilities.
//!
//! Every line carries the job ID and operation so one request's lifecycle
//! can be followed through interleaved output.

use mrelay_models::TransformKind;
use tracing::{error, info, warn, Span};
use uuid::Uuid;

use crate::stage::JobStage;

/// Job logger for structured logging with consistent formatting.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: TransformKind,
}

impl JobLogger {
    /// Create a logger with a fresh job ID.
    pub fn new(operation: TransformKind) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            operation,
        }
    }

    /// Log the start of a job.
    pub fn log_start(&self, subject: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", subject
        );
    }

    /// Log a stage transition.
    pub fn log_stage(&self, from: JobStage, to: JobStage) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            from = %from,
            to = %to,
            "Job stage: {}", to
        );
    }

    /// Log a warning during job execution.
    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    /// Log a job failure.
    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    /// Log the completion of a job.
    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn operation(&self) -> TransformKind {
        self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let a = JobLogger::new(TransformKind::Trim);
        let b = JobLogger::new(TransformKind::Trim);

        assert_ne!(a.job_id, b.job_id);
        assert_eq!(a.operation(), TransformKind::Trim);
    }
}
