// src/services/mod.rs
pub mod orchestrator;
pub mod video_store;

pub use orchestrator::{CreatedVideo, OrchestratorLimits, VideoOrchestrator};
pub use video_store::{VideoId, VideoStore};
