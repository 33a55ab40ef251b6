#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use board_snap::config::Config;
use snap_core::{CandidateFile, Channel};

pub const KINGS_ONLY: &str = "4k3/8/8/8/8/8/8/4K3";
pub const EMPTY_BOARD: &str = "8/8/8/8/8/8/8/8";

/// Counts uploads that reached the mock service.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Mock of the board-recognition service.
///
/// `POST /analyze` answers based on the uploaded bytes:
/// - starting with `kings` → a board with two kings
/// - starting with `invalid` → a malformed board
/// - starting with `slow` → kings, after 300ms
/// - anything else → an empty board
pub fn analysis_service(hits: Hits) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/status/{code}", post(status))
        .route("/app-error", post(app_error))
        .route("/app-error-bare", post(app_error_bare))
        .route("/no-data", post(no_data))
        .route("/garbage", post(garbage))
        .route("/slow", post(slow))
        .with_state(hits)
}

/// Serve a router on an ephemeral port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock service");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Mock service error");
    });
    format!("http://{addr}")
}

/// A URL on a port nobody is listening on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("No local address");
    drop(listener);
    format!("http://{addr}/analyze")
}

pub fn config(api_url: String) -> Config {
    Config {
        api_url,
        timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

pub fn jpeg(tag: &[u8]) -> CandidateFile {
    CandidateFile::new(tag.to_vec(), "image/jpeg", Channel::Picker)
}

async fn analyze(State(hits): State<Hits>, mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    hits.0.fetch_add(1, Ordering::SeqCst);

    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        if !matches!(content_type.as_deref(), Some("image/jpeg") | Some("image/png")) {
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({ "message": "unsupported" })),
            );
        }
        let bytes = field.bytes().await.unwrap_or_default();

        let fen = if bytes.starts_with(b"kings") {
            KINGS_ONLY
        } else if bytes.starts_with(b"invalid") {
            "8/8/8/8/8/8/8/9"
        } else if bytes.starts_with(b"slow") {
            tokio::time::sleep(Duration::from_millis(300)).await;
            KINGS_ONLY
        } else {
            EMPTY_BOARD
        };

        return (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": { "fen": fen, "cropped_image": "https://x/y.png" },
            })),
        );
    }

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "message": "missing file field" })),
    )
}

async fn status(Path(code): Path<u16>, _body: Bytes) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": format!("mock status {code}") })))
}

async fn app_error(_body: Bytes) -> Json<Value> {
    Json(json!({ "status": "error", "message": "No chessboard found in image" }))
}

async fn app_error_bare(_body: Bytes) -> Json<Value> {
    Json(json!({ "status": "error" }))
}

async fn no_data(_body: Bytes) -> Json<Value> {
    Json(json!({ "status": "success" }))
}

async fn garbage(_body: Bytes) -> &'static str {
    "<html>definitely not json</html>"
}

async fn slow(_body: Bytes) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "status": "success", "data": { "fen": EMPTY_BOARD, "cropped_image": "" } }))
}
