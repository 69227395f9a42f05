// src/render.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::RenderSpec;
use crate::utils::{check_ffmpeg_available, execute_ffmpeg_command};
use crate::visual::{build_caption_filter, layout_caption, line_file_name};

const AUDIO_SAMPLE_RATE: u32 = 44_100;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("FFmpeg not found ({0}). Please install FFmpeg.")]
    NotInstalled(String),
    #[error("FFmpeg error: {0}")]
    Failed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Video composition/encoding collaborator.
#[async_trait]
pub trait VideoRenderer: Send + Sync {
    /// Encode `spec` into a file at `output`. A partial file may remain on failure.
    async fn render(&self, spec: &RenderSpec, output: &Path) -> Result<(), RenderError>;

    /// Probe the backing encoder; returns a human readable version string.
    async fn check_available(&self) -> Result<String, RenderError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct FfmpegRenderer {
    ffmpeg_path: String,
    font_file: Option<String>,
}

impl FfmpegRenderer {
    pub fn new(ffmpeg_path: impl Into<String>, font_file: Option<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            font_file,
        }
    }
}

/// Arguments for a black background, the caption filter, and a silent AAC track.
pub fn encode_args(spec: &RenderSpec, video_filter: &str, output: &Path) -> Vec<String> {
    let duration = spec.duration_secs.to_string();
    let fps = spec.fps.to_string();

    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-y".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!(
            "color=c={}:s={}x{}:r={}:d={}",
            spec.background_color, spec.width, spec.height, fps, duration
        ),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("anullsrc=channel_layout=stereo:sample_rate={}", AUDIO_SAMPLE_RATE),
        "-vf".to_string(),
        video_filter.to_string(),
        "-map".to_string(),
        "0:v".to_string(),
        "-map".to_string(),
        "1:a".to_string(),
        "-t".to_string(),
        duration,
        "-r".to_string(),
        fps,
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-shortest".to_string(),
        output.to_string_lossy().to_string(),
    ]
}

fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn render_blocking(
    ffmpeg_path: &str,
    font_file: Option<&str>,
    spec: &RenderSpec,
    output: &Path,
) -> Result<(), RenderError> {
    let output = absolute(output)?;
    let parent = output
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "render".to_string());

    // Caption lines go into scratch files next to the output; FFmpeg runs from there.
    let scratch = parent.join(format!(".render_{}", stem));
    fs::create_dir_all(&scratch)?;

    let result = (|| -> Result<(), RenderError> {
        let layout = layout_caption(spec);
        for (i, line) in layout.visible_lines() {
            fs::write(scratch.join(line_file_name(i)), line)?;
        }
        let filter = build_caption_filter(&layout, spec, font_file);

        let mut command = Command::new(ffmpeg_path);
        command
            .current_dir(&scratch)
            .args(encode_args(spec, &filter, &output));

        execute_ffmpeg_command(command).map(|_| ())
    })();

    if let Err(e) = fs::remove_dir_all(&scratch) {
        tracing::warn!("Failed to remove render scratch dir {}: {}", scratch.display(), e);
    }

    result
}

#[async_trait]
impl VideoRenderer for FfmpegRenderer {
    async fn render(&self, spec: &RenderSpec, output: &Path) -> Result<(), RenderError> {
        let ffmpeg_path = self.ffmpeg_path.clone();
        let font_file = self.font_file.clone();
        let spec = spec.clone();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || {
            render_blocking(&ffmpeg_path, font_file.as_deref(), &spec, &output)
        })
        .await
        .map_err(|e| RenderError::Failed(format!("render task aborted: {}", e)))?
    }

    async fn check_available(&self) -> Result<String, RenderError> {
        let ffmpeg_path = self.ffmpeg_path.clone();
        tokio::task::spawn_blocking(move || check_ffmpeg_available(&ffmpeg_path))
            .await
            .map_err(|e| RenderError::Failed(format!("probe task aborted: {}", e)))?
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg_after<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
        args.windows(2)
            .filter(|w| w[0] == flag)
            .map(|w| w[1].as_str())
            .collect()
    }

    #[test]
    fn encode_args_describe_black_frame_at_24_fps() {
        let spec = RenderSpec::caption("hello", 30);
        let args = encode_args(&spec, "null", Path::new("/tmp/videos/output_x.mp4"));

        let inputs = arg_after(&args, "-i");
        assert_eq!(inputs[0], "color=c=black:s=1280x720:r=24:d=30");
        assert!(inputs[1].starts_with("anullsrc="));
        assert_eq!(arg_after(&args, "-t"), vec!["30"]);
        assert_eq!(arg_after(&args, "-r"), vec!["24"]);
    }

    #[test]
    fn encode_args_use_h264_and_silent_aac() {
        let spec = RenderSpec::caption("hello", 5);
        let args = encode_args(&spec, "null", Path::new("out.mp4"));

        assert_eq!(arg_after(&args, "-c:v"), vec!["libx264"]);
        assert_eq!(arg_after(&args, "-c:a"), vec!["aac"]);
        assert_eq!(arg_after(&args, "-map"), vec!["0:v", "1:a"]);
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn duration_flows_into_source_and_cut() {
        let spec = RenderSpec::caption("hello", 7);
        let args = encode_args(&spec, "null", Path::new("out.mp4"));
        assert!(arg_after(&args, "-i")[0].ends_with(":d=7"));
        assert_eq!(arg_after(&args, "-t"), vec!["7"]);
    }

    #[tokio::test]
    async fn missing_ffmpeg_fails_and_cleans_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output_0011223344556677.mp4");
        let renderer = FfmpegRenderer::new("/nonexistent/bin/ffmpeg-for-tests", None);

        let result = renderer.render(&RenderSpec::caption("hi", 1), &output).await;

        assert!(matches!(result, Err(RenderError::NotInstalled(_))));
        assert!(!dir.path().join(".render_output_0011223344556677").exists());
    }

    /// Real FFmpeg if one can be launched; tests that need it return early otherwise.
    fn local_ffmpeg() -> Option<FfmpegRenderer> {
        match check_ffmpeg_available("ffmpeg") {
            Ok(version) => {
                let font_file = std::env::var("FONT_FILE").ok();
                eprintln!("using {} (font file: {:?})", version, font_file);
                Some(FfmpegRenderer::new("ffmpeg", font_file))
            }
            Err(e) => {
                eprintln!("skipping, {}", e);
                None
            }
        }
    }

    fn assert_is_mp4(path: &Path) {
        let bytes = std::fs::read(path).unwrap();
        assert!(bytes.len() > 8, "output is only {} bytes", bytes.len());
        assert_eq!(&bytes[4..8], b"ftyp");
    }

    #[tokio::test]
    async fn renders_playable_file_with_ffmpeg() {
        let Some(renderer) = local_ffmpeg() else { return };
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output_sample.mp4");

        renderer
            .render(&RenderSpec::caption("A short test caption", 1), &output)
            .await
            .unwrap();

        assert_is_mp4(&output);
        assert!(!dir.path().join(".render_output_sample").exists());
    }

    #[tokio::test]
    async fn renders_wrapped_multi_line_caption_with_ffmpeg() {
        let Some(renderer) = local_ffmpeg() else { return };
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("output_multiline.mp4");
        let text = "Bridges carry roads over rivers: it's 100% about load, tension & compression. \
                    Suspension [cables], stone arches; steel trusses, and {more} all share the work."
            .repeat(3);
        let spec = RenderSpec::caption(text, 1);
        assert!(layout_caption(&spec).visible_lines().count() > 1);

        renderer.render(&spec, &output).await.unwrap();

        assert_is_mp4(&output);
    }
}
