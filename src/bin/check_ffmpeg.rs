use std::env;
use std::path::PathBuf;

use video_creator::{FfmpegRenderer, RenderSpec, VideoRenderer, VideoStore};

/// Verifies the local FFmpeg install by rendering a short captioned sample into VIDEO_DIR.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let ffmpeg_path = env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string());
    let font_file = env::var("FONT_FILE").ok().filter(|f| !f.is_empty());
    let video_dir = PathBuf::from(env::var("VIDEO_DIR").unwrap_or_else(|_| "videos".to_string()));

    let renderer = FfmpegRenderer::new(ffmpeg_path.clone(), font_file);

    println!("Checking FFmpeg at '{}'...", ffmpeg_path);
    match renderer.check_available().await {
        Ok(version) => println!("✅ {}", version),
        Err(e) => {
            println!("❌ {}", e);
            return Err(e.into());
        }
    }

    let store = VideoStore::new(video_dir);
    store.ensure_dir().await?;
    let id = store.allocate_id().await?;
    let output = store.path_for(&id);

    println!("\nRendering 2 second sample to {}...", output.display());
    let spec = RenderSpec::caption("FFmpeg is working.\nThis is a sample caption.", 2);
    renderer.render(&spec, &output).await?;

    let size = std::fs::metadata(&output)?.len();
    println!("✅ Sample rendered ({} bytes)", size);
    println!("   Lookup id: {}", id);

    Ok(())
}
