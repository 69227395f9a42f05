// src/handlers/video.rs
use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::services::VideoStore;
use crate::types::{CreateVideoResponse, VideoLookupResponse, VideoRequest};
use crate::AppState;

pub fn video_routes() -> Router {
    Router::new()
        .route("/api/create-video", post(create_video))
        .route("/api/video/:video_id", get(get_video))
}

/// POST /api/create-video - generate a script for the topic and render it
async fn create_video(
    Extension(state): Extension<Arc<AppState>>,
    payload: Result<Json<VideoRequest>, JsonRejection>,
) -> Result<Json<CreateVideoResponse>, AppError> {
    let Json(request) = payload?;
    let request = request.validate(state.orchestrator.limits().max_duration_secs)?;

    tracing::info!(
        topic = %request.topic,
        duration_secs = request.duration_secs,
        "Creating video"
    );

    let created = state.orchestrator.create_video(&request).await?;
    Ok(Json(CreateVideoResponse::success(created.video_path)))
}

/// GET /api/video/:video_id - report where a rendered video can be fetched
async fn get_video(
    Path(video_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<VideoLookupResponse>, AppError> {
    let (id, _) = state.orchestrator.lookup(&video_id).await?;
    Ok(Json(VideoLookupResponse {
        video_url: VideoStore::video_url(&id),
    }))
}
