//! Caption burning.

use axum::extract::State;
use axum::Json;
use mrelay_models::CaptionStyle;
use mrelay_worker::CaptionJob;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BurnCaptionsRequest {
    #[validate(
        required(message = "videoUrl is required"),
        length(min = 1, message = "videoUrl is required")
    )]
    pub video_url: Option<String>,
    #[validate(
        required(message = "srt is required"),
        length(min = 1, message = "srt is required")
    )]
    pub srt: Option<String>,
    #[validate(
        required(message = "videoName is required"),
        length(min = 1, message = "videoName is required")
    )]
    pub video_name: Option<String>,
    /// Overrides for the default caption profile
    #[serde(default)]
    pub style: Option<CaptionStyle>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnCaptionsResponse {
    pub success: bool,
    pub video_url: String,
    pub video_name: String,
}

/// Burn SRT captions into a video and publish it under `captioned/`.
pub async fn burn_captions(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<BurnCaptionsRequest>,
) -> ApiResult<Json<BurnCaptionsResponse>> {
    let job = CaptionJob {
        video_url: request.video_url.unwrap_or_default(),
        srt: request.srt.unwrap_or_default(),
        video_name: request.video_name.unwrap_or_default(),
        style: request.style.unwrap_or_default(),
    };

    let outcome = state.orchestrator.burn_captions(job).await?;

    Ok(Json(BurnCaptionsResponse {
        success: true,
        video_url: outcome.video_url.into_string(),
        video_name: outcome.video_name,
    }))
}
