//! Shared fixtures: the real router wired to fake collaborators and a temp video dir.
#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use video_creator::middleware::cors::single_origin_cors;
use video_creator::{
    build_router, AppState, OrchestratorLimits, RenderError, RenderSpec, ScriptError, ScriptWriter,
    VideoOrchestrator, VideoRenderer, VideoStore,
};

pub const ALLOWED_ORIGIN: &str = "http://localhost:5173";

#[derive(Default)]
pub struct FakeWriter {
    pub failure: Option<String>,
    pub calls: Mutex<Vec<(String, u32)>>,
}

impl FakeWriter {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ScriptWriter for FakeWriter {
    async fn write_script(&self, topic: &str, duration_secs: u32) -> Result<String, ScriptError> {
        self.calls.lock().unwrap().push((topic.to_string(), duration_secs));
        match &self.failure {
            Some(message) => Err(ScriptError::Api {
                status: 500,
                body: message.clone(),
            }),
            None => Ok(format!("A {} second script about {}.", duration_secs, topic)),
        }
    }

    fn name(&self) -> &str {
        "fake-writer"
    }
}

#[derive(Default)]
pub struct FakeRenderer {
    pub failure: Option<String>,
    pub specs: Mutex<Vec<RenderSpec>>,
    pub probes: AtomicUsize,
}

impl FakeRenderer {
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

#[async_trait]
impl VideoRenderer for FakeRenderer {
    async fn render(&self, spec: &RenderSpec, output: &Path) -> Result<(), RenderError> {
        self.specs.lock().unwrap().push(spec.clone());
        // like a real encoder, something lands on disk before any failure
        tokio::fs::write(output, b"fake mp4 bytes").await?;
        match &self.failure {
            Some(message) => Err(RenderError::Failed(message.clone())),
            None => Ok(()),
        }
    }

    async fn check_available(&self) -> Result<String, RenderError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok("fake renderer 1.0".to_string())
    }

    fn name(&self) -> &str {
        "fake-renderer"
    }
}

pub struct TestApp {
    pub router: Router,
    pub writer: Arc<FakeWriter>,
    pub renderer: Arc<FakeRenderer>,
    pub dir: tempfile::TempDir,
}

impl TestApp {
    pub fn video_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("videos")
    }

    pub fn video_files(&self) -> Vec<String> {
        match std::fs::read_dir(self.video_dir()) {
            Ok(entries) => entries
                .flatten()
                .map(|e| e.file_name().to_string_lossy().to_string())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

pub async fn build_test_app(writer: FakeWriter, renderer: FakeRenderer) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let writer = Arc::new(writer);
    let renderer = Arc::new(renderer);

    let orchestrator = VideoOrchestrator::new(
        writer.clone(),
        renderer.clone(),
        VideoStore::new(dir.path().join("videos")),
        OrchestratorLimits {
            max_duration_secs: 600,
            max_concurrent_renders: 4,
            render_queue_timeout: Duration::from_secs(30),
        },
    );

    let state = Arc::new(AppState::new(orchestrator).await);
    let router = build_router(state, single_origin_cors(ALLOWED_ORIGIN).unwrap());

    TestApp {
        router,
        writer,
        renderer,
        dir,
    }
}

pub async fn default_app() -> TestApp {
    build_test_app(FakeWriter::default(), FakeRenderer::default()).await
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// `videos/output_<id>.mp4` → `<id>`
pub fn id_from_video_path(video_path: &str) -> String {
    let file_name = video_path.rsplit('/').next().unwrap();
    file_name
        .strip_prefix("output_")
        .and_then(|rest| rest.strip_suffix(".mp4"))
        .unwrap()
        .to_string()
}
