// src/services/orchestrator.rs
//! Generate script → render → persist, strictly in that order, for one request.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;

use crate::error::AppError;
use crate::openai_client::ScriptWriter;
use crate::render::{RenderError, VideoRenderer};
use crate::services::video_store::{VideoId, VideoStore};
use crate::types::{RenderSpec, ValidatedRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedVideo {
    pub id: VideoId,
    pub video_path: String,
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorLimits {
    pub max_duration_secs: u32,
    pub max_concurrent_renders: usize,
    pub render_queue_timeout: Duration,
}

impl Default for OrchestratorLimits {
    fn default() -> Self {
        Self {
            max_duration_secs: 600,
            max_concurrent_renders: 2,
            render_queue_timeout: Duration::from_secs(300),
        }
    }
}

pub struct VideoOrchestrator {
    script_writer: Arc<dyn ScriptWriter>,
    renderer: Arc<dyn VideoRenderer>,
    store: VideoStore,
    render_slots: Arc<Semaphore>,
    limits: OrchestratorLimits,
}

impl VideoOrchestrator {
    pub fn new(
        script_writer: Arc<dyn ScriptWriter>,
        renderer: Arc<dyn VideoRenderer>,
        store: VideoStore,
        limits: OrchestratorLimits,
    ) -> Self {
        Self {
            script_writer,
            renderer,
            store,
            render_slots: Arc::new(Semaphore::new(limits.max_concurrent_renders.max(1))),
            limits,
        }
    }

    pub fn store(&self) -> &VideoStore {
        &self.store
    }

    pub fn limits(&self) -> &OrchestratorLimits {
        &self.limits
    }

    pub fn script_writer(&self) -> &dyn ScriptWriter {
        self.script_writer.as_ref()
    }

    pub fn renderer(&self) -> &dyn VideoRenderer {
        self.renderer.as_ref()
    }

    pub async fn create_video(&self, request: &ValidatedRequest) -> Result<CreatedVideo, AppError> {
        let started = Instant::now();

        let script = self
            .script_writer
            .write_script(&request.topic, request.duration_secs)
            .await
            .map_err(|e| {
                tracing::error!(topic = %request.topic, "Script generation failed: {}", e);
                e
            })?;
        tracing::info!(
            topic = %request.topic,
            script_chars = script.chars().count(),
            elapsed_ms = %started.elapsed().as_millis(),
            "Script generated"
        );

        let spec = RenderSpec::caption(script, request.duration_secs);

        let permit = match tokio::time::timeout(
            self.limits.render_queue_timeout,
            self.render_slots.clone().acquire_owned(),
        )
        .await
        {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => {
                tracing::warn!("No render slot became free within {:?}", self.limits.render_queue_timeout);
                return Err(AppError::Busy(
                    "All render slots are busy, try again later".to_string(),
                ));
            }
        };

        self.store.ensure_dir().await?;
        let id = self.store.allocate_id().await?;
        let output = self.store.path_for(&id);

        // The encode outlives a dropped request, so the slot travels with it.
        let renderer = self.renderer.clone();
        let render_id = id.clone();
        let duration_secs = request.duration_secs;
        let render = tokio::spawn(async move {
            let _permit = permit;
            let render_started = Instant::now();
            tracing::info!(video_id = %render_id, duration_secs, "Render started");
            let result = renderer.render(&spec, &output).await;
            match &result {
                Ok(()) => tracing::info!(
                    video_id = %render_id,
                    render_ms = %render_started.elapsed().as_millis(),
                    "Render finished"
                ),
                Err(e) => tracing::error!(video_id = %render_id, "Render failed: {}", e),
            }
            result
        });

        render
            .await
            .map_err(|e| RenderError::Failed(format!("render task aborted: {}", e)))??;
        tracing::info!(video_id = %id, total_ms = %started.elapsed().as_millis(), "Video created");

        Ok(CreatedVideo {
            video_path: self.store.display_path(&id),
            id,
        })
    }

    /// Resolve an identifier taken from a URL to an existing file.
    pub async fn lookup(&self, raw_id: &str) -> Result<(VideoId, PathBuf), AppError> {
        let id = VideoId::parse(raw_id)
            .ok_or_else(|| AppError::Validation("Invalid video id".to_string()))?;

        if self.store.exists(&id).await? {
            let path = self.store.path_for(&id);
            Ok((id, path))
        } else {
            Err(AppError::NotFound)
        }
    }
}
