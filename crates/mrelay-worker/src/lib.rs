//! Transform job orchestration.
//!
//! This crate provides:
//! - The per-request job pipeline (fetch, transform, publish)
//! - Owned temporary files released on every exit path
//! - Structured job logging and job metrics

pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod stage;
pub mod temp;

pub use error::{JobError, JobResult};
pub use logging::JobLogger;
pub use orchestrator::{
    AudioJob, AudioOutcome, CaptionJob, CaptionOutcome, Orchestrator, RelayJob, RelayOutcome,
    TrimJob, TrimOutcome,
};
pub use stage::JobStage;
pub use temp::{TempRole, TempSet};
