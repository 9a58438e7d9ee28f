//! Ollama (local model) backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use vocabquiz_core::error::AugmentError;

use crate::augment::{CompletionRequest, JsonCompletion, SYSTEM_PROMPT};
use crate::http;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_TIMEOUT_SECS: u64 = 300; // Local models are slower

/// Ollama chat backend in JSON mode.
pub struct OllamaBackend {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaBackend {
    pub fn new(base_url: &str) -> Result<Self, AugmentError> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        Ok(Self {
            base_url: base.trim_end_matches('/').to_string(),
            client: http::build_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    format: &'static str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaResponseMessage,
}

#[derive(Deserialize)]
struct OllamaResponseMessage {
    content: String,
}

#[async_trait]
impl JsonCompletion for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AugmentError> {
        let body = OllamaRequest {
            model: request.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                OllamaMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
            stream: false,
            format: "json",
            options: OllamaOptions { temperature: 0.0 },
        };

        let req = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&body);
        let response = http::send(req, DEFAULT_TIMEOUT_SECS).await?;
        let parsed: OllamaResponse = http::decode(response).await?;
        Ok(parsed.message.content)
    }
}
