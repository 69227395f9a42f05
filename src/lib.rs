// lib.rs - Topic in, captioned video out
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openai_client;
pub mod render;
pub mod services;
pub mod types;
pub mod utils;
pub mod visual;

use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub use config::Config;
pub use error::AppError;
pub use openai_client::{OpenAiClient, ScriptError, ScriptWriter};
pub use render::{FfmpegRenderer, RenderError, VideoRenderer};
pub use services::{OrchestratorLimits, VideoId, VideoOrchestrator, VideoStore};
pub use types::*;

// Shared across handlers; the collaborators inside are built once at startup.
pub struct AppState {
    pub orchestrator: VideoOrchestrator,
    /// Renderer probe taken once at startup: version line or failure message.
    pub renderer_probe: Result<String, String>,
}

impl AppState {
    pub async fn new(orchestrator: VideoOrchestrator) -> Self {
        let renderer_probe = orchestrator
            .renderer()
            .check_available()
            .await
            .map_err(|e| e.to_string());
        Self {
            orchestrator,
            renderer_probe,
        }
    }
}

/// All routes with request logging and the CORS policy applied.
pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .merge(handlers::video::video_routes())
        .merge(handlers::output::output_routes())
        .merge(handlers::status::status_routes())
        .layer(axum::middleware::from_fn(middleware::logging::request_logging_middleware))
        .layer(cors)
        .layer(Extension(state))
}
