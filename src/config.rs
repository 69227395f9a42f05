// src/config.rs
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, sourced from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub allowed_origin: String,
    pub bind_addr: String,
    pub video_dir: PathBuf,
    pub ffmpeg_path: String,
    pub font_file: Option<String>,
    pub max_duration_secs: u32,
    pub max_concurrent_renders: usize,
    pub llm_timeout: Duration,
    pub render_queue_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let openai_api_key = match env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => return Err(ConfigError::Missing("OPENAI_API_KEY")),
        };

        let max_concurrent_renders: usize = parse_var("MAX_CONCURRENT_RENDERS", 2)?;
        if max_concurrent_renders == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENT_RENDERS",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            openai_api_key,
            openai_base_url: string_var("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: string_var("OPENAI_MODEL", "gpt-3.5-turbo"),
            allowed_origin: string_var("ALLOWED_ORIGIN", "http://localhost:5173"),
            bind_addr: string_var("BIND_ADDR", "0.0.0.0:8000"),
            video_dir: PathBuf::from(string_var("VIDEO_DIR", "videos")),
            ffmpeg_path: string_var("FFMPEG_PATH", "ffmpeg"),
            font_file: env::var("FONT_FILE").ok().filter(|f| !f.is_empty()),
            max_duration_secs: parse_var("MAX_DURATION_SECS", 600)?,
            max_concurrent_renders,
            llm_timeout: Duration::from_secs(parse_var("LLM_TIMEOUT_SECS", 120)?),
            render_queue_timeout: Duration::from_secs(parse_var("RENDER_QUEUE_TIMEOUT_SECS", 300)?),
        })
    }
}

fn string_var(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(default),
    }
}
