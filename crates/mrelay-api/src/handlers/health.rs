//! Liveness and readiness probes.

use std::fmt::Display;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use mrelay_media::check_ffmpeg;
use serde::Serialize;

use crate::state::AppState;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "FFmpeg Caption Server";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// `GET /health`. Answers as long as the process serves requests.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub storage: DependencyCheck,
    pub ffmpeg: DependencyCheck,
}

/// Outcome of one dependency check.
#[derive(Serialize)]
pub struct DependencyCheck {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl DependencyCheck {
    fn from_result<T, E: Display>(result: Result<T, E>, started: Instant) -> Self {
        match result {
            Ok(_) => Self {
                status: "ok",
                error: None,
                latency_ms: Some(started.elapsed().as_millis() as u64),
            },
            Err(e) => Self {
                status: "error",
                error: Some(e.to_string()),
                latency_ms: None,
            },
        }
    }

    fn passed(&self) -> bool {
        self.error.is_none()
    }
}

/// `GET /ready`. 503 unless the bucket answers and FFmpeg resolves.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let started = Instant::now();
    let storage =
        DependencyCheck::from_result(state.storage.check_connectivity().await, started);

    let started = Instant::now();
    let ffmpeg = DependencyCheck::from_result(
        check_ffmpeg(state.orchestrator.runner().program()),
        started,
    );

    let ready = storage.passed() && ffmpeg.passed();
    let (code, status) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            checks: ReadinessChecks { storage, ffmpeg },
        }),
    )
}
