//! API integration tests against an in-memory object store.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mrelay_api::{create_router, ApiConfig, AppState};
use mrelay_media::{FfmpegRunner, RemoteFetcher};
use mrelay_models::KeyRules;
use mrelay_storage::{MemoryStore, Publisher};
use mrelay_worker::Orchestrator;

const MISSING_FFMPEG: &str = "/nonexistent/ffmpeg-binary";

struct TestApp {
    store: Arc<MemoryStore>,
    work_dir: PathBuf,
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        Self::with_ffmpeg(Path::new(MISSING_FFMPEG))
    }

    fn with_ffmpeg(ffmpeg: &Path) -> Self {
        let dir = TempDir::new().unwrap();
        let work_dir = dir.path().join("work");
        let store = Arc::new(MemoryStore::new());
        let publisher = Publisher::new(store.clone(), "https://cdn.test");
        let orchestrator = Orchestrator::new(
            RemoteFetcher::new(Duration::from_secs(5)).unwrap(),
            FfmpegRunner::new(ffmpeg),
            publisher,
            KeyRules::default(),
            &work_dir,
        );
        let state = AppState::from_parts(ApiConfig::default(), orchestrator);

        Self {
            store,
            work_dir,
            router: create_router(state, None),
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn work_dir_entries(&self) -> usize {
        std::fs::read_dir(&self.work_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "FFmpeg Caption Server");
}

#[tokio::test]
async fn test_ready_reports_missing_ffmpeg() {
    let app = TestApp::new();
    let (status, body) = app.send(get("/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["storage"]["status"], "ok");
    assert_eq!(body["checks"]["ffmpeg"]["status"], "error");
}

#[tokio::test]
async fn test_metrics_disabled() {
    let app = TestApp::new();
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["X-Request-ID"], "req-42");
    assert_eq!(response.headers()["X-Content-Type-Options"], "nosniff");
}

#[tokio::test]
async fn test_burn_captions_missing_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .send(post_json(
            "/burn-captions",
            json!({ "videoUrl": "https://example.com/v.mp4", "videoName": "" }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("srt is required"), "{}", error);
    assert!(error.contains("videoName is required"), "{}", error);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let request = Request::builder()
        .method("POST")
        .uri("/save-url-to-r2")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_burn_captions_invalid_style() {
    let app = TestApp::new();
    let (status, body) = app
        .send(post_json(
            "/burn-captions",
            json!({
                "videoUrl": "http://127.0.0.1:9/never.mp4",
                "srt": "1\n00:00:00,000 --> 00:00:01,000\nHi\n",
                "videoName": "clip",
                "style": { "alignment": 12 }
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Alignment"));
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_trim_rejects_non_positive_duration() {
    let app = TestApp::new();
    let (status, body) = app
        .send(post_json(
            "/trim-and-save-to-r2",
            json!({ "url": "https://example.com/a.mp4", "audioDuration": 0 }),
        ))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "audioDuration must be positive");
}

#[tokio::test]
async fn test_list_videos_filters_and_orders() {
    let app = TestApp::new();
    app.store.insert_at("b.mp4", "bb", 2_000);
    app.store.insert_at("a.mov", "a", 1_000);
    app.store.insert_at("captioned/c_captioned.mp4", "c", 500);
    app.store.insert_at("notes.txt", "n", 10);
    app.store.insert_at("clips/d e.webm", "ddd", 3_000);

    let (status, body) = app.send(get("/list-videos")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    let keys: Vec<&str> = body["videos"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, vec!["a.mov", "b.mp4", "clips/d e.webm"]);
    assert_eq!(body["videos"][0]["lastModified"], 1_000);
    assert_eq!(body["videos"][1]["size"], 2);
    assert_eq!(body["videos"][2]["url"], "https://cdn.test/clips/d%20e.webm");
}

#[tokio::test]
async fn test_list_videos_with_prefix() {
    let app = TestApp::new();
    app.store.insert_at("clips/one.mp4", "1", 1);
    app.store.insert_at("raw/two.mp4", "2", 2);

    let (status, body) = app.send(get("/list-videos?prefix=clips/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["videos"][0]["key"], "clips/one.mp4");
}

#[tokio::test]
async fn test_delete_video() {
    let app = TestApp::new();
    app.store.insert_at("clips/one.mp4", "1", 1);

    let (status, body) = app.send(delete("/delete-video")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "key is required");

    let (status, body) = app.send(delete("/delete-video?key=clips/one.mp4")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["key"], "clips/one.mp4");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_random_video() {
    let app = TestApp::new();

    let (status, body) = app.send(get("/random-video")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No videos found");

    app.store.insert_at("captioned/x_captioned.mp4", "x", 1);
    app.store.insert_at("only.mp4", "o", 2);

    let (status, body) = app.send(get("/random-video")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["key"], "only.mp4");
    assert_eq!(body["url"], "https://cdn.test/only.mp4");
}

#[tokio::test]
async fn test_save_url_to_r2() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/media/source.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"SOURCE".to_vec()))
        .mount(&server)
        .await;
    let app = TestApp::new();

    let (status, body) = app
        .send(post_json(
            "/save-url-to-r2",
            json!({
                "url": format!("{}/media/source.mp4", server.uri()),
                "folder": "inbox",
                "filename": "My Upload.mp4"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["key"], "inbox/My-Upload.mp4");
    assert_eq!(body["r2Url"], "https://cdn.test/inbox/My-Upload.mp4");
    assert_eq!(app.store.get("inbox/My-Upload.mp4").unwrap(), b"SOURCE");
    assert_eq!(app.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_save_url_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let app = TestApp::new();

    let (status, body) = app
        .send(post_json(
            "/save-url-to-r2",
            json!({ "url": format!("{}/private.mp4", server.uri()) }),
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("403"));
    assert!(app.store.is_empty());
    assert_eq!(app.work_dir_entries(), 0);
}

#[tokio::test]
async fn test_video_to_mp3_without_ffmpeg_cleans_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AV".to_vec()))
        .mount(&server)
        .await;
    let app = TestApp::new();

    let (status, body) = app
        .send(post_json(
            "/video-to-mp3",
            json!({ "videoUrl": format!("{}/ep.mp4", server.uri()), "folder": "audio" }),
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("FFmpeg not found"));
    assert!(app.store.is_empty());
    assert_eq!(app.work_dir_entries(), 0);
}

#[cfg(unix)]
#[tokio::test]
async fn test_video_to_mp3_reports_duration() {
    use std::os::unix::fs::PermissionsExt;

    let bin = TempDir::new().unwrap();
    let ffmpeg = bin.path().join("fake-ffmpeg");
    // Probes (input is the last argument) print a duration; transforms copy
    std::fs::write(
        &ffmpeg,
        r#"#!/bin/sh
out=""; input=""; prev=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then input="$a"; fi
  prev="$a"; out="$a"
done
if [ "$out" = "$input" ]; then
  echo "  Duration: 00:00:42.50, start: 0.000000" >&2
  exit 1
fi
cp "$input" "$out"
"#,
    )
    .unwrap();
    std::fs::set_permissions(&ffmpeg, std::fs::Permissions::from_mode(0o755)).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"AV".to_vec()))
        .mount(&server)
        .await;
    let app = TestApp::with_ffmpeg(&ffmpeg);

    let (status, body) = app
        .send(post_json(
            "/video-to-mp3",
            json!({
                "videoUrl": format!("{}/shows/Late%20Show.mp4", server.uri()),
                "folder": "audio"
            }),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["mp3Name"], "Late-Show.mp3");
    assert_eq!(body["mp3Url"], "https://cdn.test/audio/Late-Show.mp3");
    assert_eq!(body["durationSeconds"], 42.5);
    assert_eq!(body["endTime"], "00:00:42.500");
    assert_eq!(app.work_dir_entries(), 0);
}
