// src/handlers/output.rs
use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::error::AppError;
use crate::services::VideoStore;
use crate::AppState;

pub fn output_routes() -> Router {
    Router::new().route("/videos/:video_id", get(stream_video))
}

/// Stream a rendered video (the `video_url` handed out by the lookup endpoint)
async fn stream_video(
    Path(video_id): Path<String>,
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Response, AppError> {
    let (id, file_path) = state.orchestrator.lookup(&video_id).await?;

    let file = match tokio::fs::File::open(&file_path).await {
        Ok(file) => file,
        // removed between lookup and open
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => {
            tracing::error!("Failed to open video {} for streaming: {}", id, e);
            return Err(e.into());
        }
    };
    let size = file.metadata().await?.len();
    let stream = ReaderStream::new(file);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "video/mp4".to_string()),
            (header::CONTENT_LENGTH, size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", VideoStore::file_name(&id)),
            ),
            (header::CACHE_CONTROL, "public, max-age=3600".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}
