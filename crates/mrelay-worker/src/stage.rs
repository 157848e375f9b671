//! Job lifecycle stages.

use std::fmt;

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Created,
    FetchingSource,
    Transforming,
    Publishing,
    Done,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Created => "created",
            JobStage::FetchingSource => "fetching_source",
            JobStage::Transforming => "transforming",
            JobStage::Publishing => "publishing",
            JobStage::Done => "done",
            JobStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStage::Done | JobStage::Failed)
    }

    /// Whether `next` may follow `self`.
    ///
    /// Relay jobs skip `Transforming`. Any live stage may fail.
    pub fn can_advance_to(&self, next: JobStage) -> bool {
        use JobStage::*;
        match (*self, next) {
            (current, Failed) => !current.is_terminal(),
            (Created, FetchingSource)
            | (FetchingSource, Transforming)
            | (FetchingSource, Publishing)
            | (Transforming, Publishing)
            | (Publishing, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
