use std::sync::Arc;

use video_creator::{
    build_router, middleware::cors::single_origin_cors, AppState, Config, FfmpegRenderer,
    OpenAiClient, OrchestratorLimits, VideoOrchestrator, VideoStore,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_logging()?;

    let config = Config::from_env().map_err(|e| {
        tracing::error!("Invalid configuration: {}", e);
        e
    })?;

    let store = VideoStore::new(&config.video_dir);
    match store.ensure_dir().await {
        Ok(_) => tracing::info!("Video directory ready: {}", config.video_dir.display()),
        Err(e) => tracing::warn!("Failed to create video directory {}: {}", config.video_dir.display(), e),
    }

    // One long-lived client for the whole process
    tracing::info!("Initializing OpenAI client ({})...", config.openai_model);
    let script_writer = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.openai_model.clone(),
        config.llm_timeout,
    ));

    let renderer = Arc::new(FfmpegRenderer::new(
        config.ffmpeg_path.clone(),
        config.font_file.clone(),
    ));
    let orchestrator = VideoOrchestrator::new(
        script_writer,
        renderer,
        store,
        OrchestratorLimits {
            max_duration_secs: config.max_duration_secs,
            max_concurrent_renders: config.max_concurrent_renders,
            render_queue_timeout: config.render_queue_timeout,
        },
    );
    tracing::info!(
        "🎬 Orchestrator ready (max duration {}s, {} concurrent renders)",
        config.max_duration_secs,
        config.max_concurrent_renders
    );

    let cors = single_origin_cors(&config.allowed_origin)?;
    tracing::info!("CORS allowed origin: {}", config.allowed_origin);

    let shared_state = Arc::new(AppState::new(orchestrator).await);
    match &shared_state.renderer_probe {
        Ok(version) => tracing::info!("✓ {}", version),
        Err(e) => tracing::warn!("{} - video rendering will fail until this is fixed", e),
    }
    let app = build_router(shared_state, cors);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

// Production-grade logging configuration
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug,video_creator=trace,reqwest=info,hyper=info,tower=info".to_string()
        } else {
            "info,video_creator=info,reqwest=warn,hyper=warn,tower=warn".to_string()
        }
    });

    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&log_level))?;

    let fmt_layer = if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        // JSON logging for log aggregation
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_target(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("🎬 Video creator starting up...");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Build mode: {}", if cfg!(debug_assertions) { "development" } else { "production" });
    tracing::info!("Log level: {}", log_level);
    tracing::info!(
        "Configuration - OpenAI: {}, FFmpeg path: {}",
        if std::env::var("OPENAI_API_KEY").is_ok() { "✅" } else { "❌" },
        std::env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string())
    );

    Ok(())
}
