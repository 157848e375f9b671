//! Trimming clips to a target duration.

use axum::extract::State;
use axum::Json;
use mrelay_worker::TrimJob;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrimRequest {
    #[validate(
        required(message = "url is required"),
        length(min = 1, message = "url is required")
    )]
    pub url: Option<String>,
    pub folder: Option<String>,
    pub filename: Option<String>,
    /// Target duration in seconds
    #[validate(range(exclusive_min = 0.0, message = "audioDuration must be positive"))]
    pub audio_duration: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrimResponse {
    pub success: bool,
    pub r2_url: String,
    pub key: String,
    pub duration_original: f64,
    pub duration_trimmed: f64,
}

/// Trim a remote clip and store the result.
pub async fn trim_and_save_to_r2(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TrimRequest>,
) -> ApiResult<Json<TrimResponse>> {
    let job = TrimJob {
        url: request.url.unwrap_or_default(),
        folder: request.folder,
        filename: request.filename,
        target_duration: request.audio_duration,
    };

    let outcome = state.orchestrator.trim_and_save(job).await?;

    Ok(Json(TrimResponse {
        success: true,
        r2_url: outcome.url.into_string(),
        key: outcome.key,
        duration_original: outcome.duration_original,
        duration_trimmed: outcome.duration_trimmed,
    }))
}
