// src/services/video_store.rs
use rand::RngCore;
use std::fmt;
use std::path::{Path, PathBuf};

/// 8 random bytes, 16 hex characters.
pub const VIDEO_ID_BYTES: usize = 8;
pub const VIDEO_ID_LEN: usize = VIDEO_ID_BYTES * 2;

/// Opaque identifier of a rendered video. Always 16 lowercase hex characters,
/// so it can be joined into a path without further checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoId(String);

impl VideoId {
    pub fn generate() -> Self {
        let mut bytes = [0u8; VIDEO_ID_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Accepts exactly 16 ASCII hex digits (any case); anything else is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.len() == VIDEO_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(raw.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flat directory of `output_{id}.mp4` files; existence on disk is the only index.
#[derive(Debug, Clone)]
pub struct VideoStore {
    root: PathBuf,
}

impl VideoStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn ensure_dir(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    pub fn file_name(id: &VideoId) -> String {
        format!("output_{}.mp4", id)
    }

    pub fn path_for(&self, id: &VideoId) -> PathBuf {
        self.root.join(Self::file_name(id))
    }

    /// Path as reported to API callers, e.g. `videos/output_0123456789abcdef.mp4`.
    pub fn display_path(&self, id: &VideoId) -> String {
        let root = self.root.to_string_lossy();
        let root = root.trim_end_matches(['/', '\\']);
        if root.is_empty() {
            Self::file_name(id)
        } else {
            format!("{}/{}", root, Self::file_name(id))
        }
    }

    pub fn video_url(id: &VideoId) -> String {
        format!("/videos/{}", id)
    }

    pub async fn exists(&self, id: &VideoId) -> std::io::Result<bool> {
        match tokio::fs::metadata(self.path_for(id)).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fresh identifier whose file does not exist yet.
    pub async fn allocate_id(&self) -> std::io::Result<VideoId> {
        loop {
            let id = VideoId::generate();
            if !self.exists(&id).await? {
                return Ok(id);
            }
            tracing::warn!("Video id {} already taken, drawing another", id);
        }
    }
}
