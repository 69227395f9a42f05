use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const SYSTEM_PROMPT: &str =
    "You are a video script writer. Create a short, engaging script about the given topic.";

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Request error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("Failed to parse completion response: {0}")]
    Malformed(String),
    #[error("Completion response contained no script")]
    EmptyCompletion,
}

/// Text-generation collaborator: turns a topic into a script.
#[async_trait]
pub trait ScriptWriter: Send + Sync {
    async fn write_script(&self, topic: &str, duration_secs: u32) -> Result<String, ScriptError>;

    fn name(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(&self, topic: &str, duration_secs: u32) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(format!(
                    "Write a {} second script about: {}",
                    duration_secs, topic
                )),
            ],
        }
    }
}

/// First candidate's text, verbatim.
pub fn extract_script(response: ChatCompletionResponse) -> Result<String, ScriptError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(ScriptError::EmptyCompletion)
}

#[async_trait]
impl ScriptWriter for OpenAiClient {
    async fn write_script(&self, topic: &str, duration_secs: u32) -> Result<String, ScriptError> {
        let request = self.build_request(topic, duration_secs);

        tracing::debug!(model = %self.model, "OpenAI chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::warn!("OpenAI API returned {}: {}", status, response_text);
            return Err(ScriptError::Api {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&response_text)
            .map_err(|e| ScriptError::Malformed(e.to_string()))?;

        extract_script(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }
}
