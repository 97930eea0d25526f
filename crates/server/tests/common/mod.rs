//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that builds the router in-process
//! with a mock engine and a recording trash, so every route can be driven
//! without ffmpeg or a real trash can.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use optimux_core::testing::MockEngine;
use optimux_core::{ChunkWriter, Config, DeletionRegistry, FilesError, TrashMover};
use optimux_server::api::{create_router, WsBroadcaster};
use optimux_server::state::AppState;

/// Trash that records paths instead of moving them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrash {
    pub moved: Arc<Mutex<Vec<PathBuf>>>,
}

#[async_trait]
impl TrashMover for RecordingTrash {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn move_to_trash(&self, path: &Path) -> Result<(), FilesError> {
        self.moved.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// Test fixture with a mock engine.
///
/// ```rust,ignore
/// let fixture = TestFixture::new();
/// let response = fixture.get("/api/v1/health").await;
/// assert_eq!(response.status, StatusCode::OK);
/// ```
pub struct TestFixture {
    pub router: Router,
    pub engine: MockEngine,
    pub trash: RecordingTrash,
    pub broadcaster: WsBroadcaster,
    /// Scratch space; uploads land in `<temp>/OptiMux/Imports`.
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::with_max_pending_deletions(16)
    }

    pub fn with_max_pending_deletions(max_pending: usize) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let mut config = Config::default();
        config.engine.temp_root = Some(temp_dir.path().to_path_buf());
        config.files.max_pending_deletions = max_pending;

        let engine = MockEngine::new();
        let trash = RecordingTrash::default();
        let broadcaster = WsBroadcaster::new(64);

        let state = Arc::new(AppState::new(
            config.clone(),
            Arc::new(engine.clone()),
            DeletionRegistry::new(max_pending, Box::new(trash.clone())),
            ChunkWriter::new(config.imports_dir()),
            broadcaster.clone(),
        ));

        Self {
            router: create_router(state),
            engine,
            trash,
            broadcaster,
            temp_dir,
        }
    }

    /// Creates a file under the temp dir and returns its path.
    pub fn touch(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, b"data").expect("Failed to write file");
        path
    }

    pub fn imports_dir(&self) -> PathBuf {
        self.temp_dir.path().join("OptiMux").join("Imports")
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// GET returning the raw body as text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
