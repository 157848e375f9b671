//! Relaying remote files into the bucket.

use axum::extract::State;
use axum::Json;
use mrelay_worker::RelayJob;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiResult;
use crate::extract::ValidatedJson;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SaveUrlRequest {
    #[validate(
        required(message = "url is required"),
        length(min = 1, message = "url is required")
    )]
    pub url: Option<String>,
    pub folder: Option<String>,
    pub filename: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveUrlResponse {
    pub success: bool,
    pub r2_url: String,
    pub key: String,
}

/// Download a URL and store it unchanged.
pub async fn save_url_to_r2(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SaveUrlRequest>,
) -> ApiResult<Json<SaveUrlResponse>> {
    let job = RelayJob {
        url: request.url.unwrap_or_default(),
        folder: request.folder,
        filename: request.filename,
    };

    let outcome = state.orchestrator.relay(job).await?;

    Ok(Json(SaveUrlResponse {
        success: true,
        r2_url: outcome.url.into_string(),
        key: outcome.key,
    }))
}
