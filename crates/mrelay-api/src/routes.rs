//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::{
    burn_captions, delete_video, health, list_videos, random_video, ready, save_url_to_r2,
    trim_and_save_to_r2, video_to_mp3,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let job_routes = Router::new()
        .route("/burn-captions", post(burn_captions))
        .route("/video-to-mp3", post(video_to_mp3))
        .route("/save-url-to-r2", post(save_url_to_r2))
        .route("/trim-and-save-to-r2", post(trim_and_save_to_r2));

    let video_routes = Router::new()
        .route("/list-videos", get(list_videos))
        .route("/delete-video", delete(delete_video))
        .route("/random-video", get(random_video));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(job_routes)
        .merge(video_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        // Replace axum's 2MB JSON default with the configured limit
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
