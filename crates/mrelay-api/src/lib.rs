//! Axum HTTP API server.
//!
//! This crate provides:
//! - Transform job endpoints (captions, audio, trim, relay)
//! - Bucket listing and deletion endpoints
//! - Health, readiness and Prometheus metrics

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
