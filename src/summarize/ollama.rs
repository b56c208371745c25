//! Ollama `/api/generate` client.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{Summarize, SummarizeError};

/// Where and how to reach the model.
#[derive(Clone, Debug)]
pub struct SummarizerConfig {
    /// Server root, e.g. `http://localhost:11434`.
    pub base_url: String,
    /// Model tag passed to the server.
    pub model: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "mistral:latest".to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Non-streaming client for a local Ollama server.
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    cfg: SummarizerConfig,
}

impl OllamaClient {
    pub fn new(cfg: SummarizerConfig) -> Result<Self, SummarizeError> {
        let http = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self { http, cfg })
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.cfg
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.cfg.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Summarize for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, SummarizeError> {
        let body = GenerateRequest {
            model: &self.cfg.model,
            prompt,
            stream: false,
        };
        let resp: GenerateResponse = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match resp.response.map(|s| s.trim().to_string()) {
            Some(text) if !text.is_empty() => Ok(text),
            _ => Err(SummarizeError::Empty),
        }
    }
}
