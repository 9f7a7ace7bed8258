//! Ollama HTTP API client

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for Ollama client
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    /// Base URL for Ollama API (default: http://localhost:11434)
    pub base_url: String,
    /// Timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            timeout_secs: 120,
        }
    }
}

impl OllamaConfig {
    /// Default config pointing at a specific server
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// Ollama API client
pub struct OllamaClient {
    config: OllamaConfig,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: OllamaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.base_url.trim_end_matches('/'))
    }

    /// Send a non-streaming chat request and return the reply
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let url = self.chat_url();
        debug!(%url, model = %request.model, "sending chat request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Ollama unreachable at {}", self.config.base_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Ollama returned {} for model {}", status, request.model);
        }

        response
            .json()
            .await
            .context("Ollama reply is not a chat response")
    }
}

/// Chat request to Ollama
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// A chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    /// Base64 encoded images attached to this message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

/// Chat reply; fields the client does not use (timings, `done`) are ignored
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
}
