//! Audio extraction.

use axum::extract::State;
use axum::Json;
use mrelay_media::format_timestamp;
use mrelay_worker::AudioJob;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VideoToMp3Request {
    #[validate(
        required(message = "videoUrl is required"),
        length(min = 1, message = "videoUrl is required")
    )]
    pub video_url: Option<String>,
    pub folder: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoToMp3Response {
    pub success: bool,
    pub mp3_url: String,
    pub mp3_name: String,
    pub duration_seconds: Option<f64>,
    /// `HH:MM:SS.mmm` rendering of the duration
    pub end_time: Option<String>,
}

/// Extract a video's audio to MP3 and publish it.
pub async fn video_to_mp3(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VideoToMp3Request>,
) -> ApiResult<Json<VideoToMp3Response>> {
    let job = AudioJob {
        video_url: request.video_url.unwrap_or_default(),
        folder: request.folder,
    };

    let outcome = state.orchestrator.extract_audio(job).await?;

    Ok(Json(VideoToMp3Response {
        success: true,
        mp3_url: outcome.mp3_url.into_string(),
        mp3_name: outcome.mp3_name,
        duration_seconds: outcome.duration_seconds,
        end_time: outcome.duration_seconds.map(format_timestamp),
    }))
}
