//! Bucket video listing and deletion.

use axum::extract::{Query, State};
use axum::Json;
use mrelay_models::is_listable_video;
use mrelay_storage::ObjectInfo;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PrefixQuery {
    pub prefix: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KeyQuery {
    pub key: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoEntry {
    pub key: String,
    pub url: String,
    pub size: u64,
    /// Milliseconds since epoch
    pub last_modified: Option<u64>,
}

#[derive(Serialize)]
pub struct ListVideosResponse {
    pub success: bool,
    pub count: usize,
    pub videos: Vec<VideoEntry>,
}

#[derive(Serialize)]
pub struct DeleteVideoResponse {
    pub success: bool,
    pub key: String,
}

#[derive(Serialize)]
pub struct RandomVideoResponse {
    pub success: bool,
    pub key: String,
    pub url: String,
}

/// Videos under `prefix`, outside `captioned/`, oldest first.
async fn listable_videos(state: &AppState, prefix: Option<&str>) -> ApiResult<Vec<ObjectInfo>> {
    let mut objects: Vec<ObjectInfo> = state
        .storage
        .list_objects(prefix.unwrap_or_default())
        .await?
        .into_iter()
        .filter(|o| is_listable_video(&o.key))
        .collect();

    objects.sort_by(|a, b| {
        a.last_modified
            .unwrap_or(0)
            .cmp(&b.last_modified.unwrap_or(0))
            .then_with(|| a.key.cmp(&b.key))
    });
    Ok(objects)
}

/// List stored videos.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> ApiResult<Json<ListVideosResponse>> {
    let videos: Vec<VideoEntry> = listable_videos(&state, query.prefix.as_deref())
        .await?
        .into_iter()
        .map(|o| VideoEntry {
            url: state.publisher.public_url(&o.key).into_string(),
            key: o.key,
            size: o.size,
            last_modified: o.last_modified,
        })
        .collect();

    Ok(Json(ListVideosResponse {
        success: true,
        count: videos.len(),
        videos,
    }))
}

/// Delete one object by exact key.
pub async fn delete_video(
    State(state): State<AppState>,
    Query(query): Query<KeyQuery>,
) -> ApiResult<Json<DeleteVideoResponse>> {
    let key = query
        .key
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("key is required"))?;

    state.storage.delete_object(&key).await?;
    info!(key = %key, "Deleted video");

    Ok(Json(DeleteVideoResponse { success: true, key }))
}

/// Pick one stored video at random.
pub async fn random_video(
    State(state): State<AppState>,
    Query(query): Query<PrefixQuery>,
) -> ApiResult<Json<RandomVideoResponse>> {
    let videos = listable_videos(&state, query.prefix.as_deref()).await?;
    let picked = videos
        .choose(&mut rand::rng())
        .ok_or_else(|| ApiError::not_found("No videos found"))?;

    Ok(Json(RandomVideoResponse {
        success: true,
        url: state.publisher.public_url(&picked.key).into_string(),
        key: picked.key.clone(),
    }))
}
