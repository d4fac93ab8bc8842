//! Completion client for the hosted chat-completions endpoint.
//!
//! The [`CompletionBackend`] trait is the seam the session talks through;
//! tests substitute a stub, production uses [`OpenAiCompletion`]. The client
//! sends the assembled prompt as a single user message with an explicit
//! timeout. Retries are off by default and configurable; transient statuses
//! (429, 5xx) and network errors are the only retryable failures.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::CompletionConfig;
use crate::error::{AdvisorError, Result};

/// Generation parameters for one completion call.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl CompletionRequest {
    pub fn from_config(config: &CompletionConfig, prompt: String) -> Self {
        Self {
            prompt,
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate a reply for the assembled prompt, or fail. Callers are
    /// responsible for converting failure into the user-safe fallback.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// Client for the OpenAI chat-completions API.
#[derive(Debug)]
pub struct OpenAiCompletion {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl OpenAiCompletion {
    /// Build the client. Fails with [`AdvisorError::Config`] when the API
    /// key is absent, so startup can halt before any query is accepted.
    pub fn new(config: &CompletionConfig) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            AdvisorError::Config(
                "OPENAI_API_KEY is not set. Export your API key to start the advisor."
                    .to_string(),
            )
        })?;
        if api_key.is_empty() {
            return Err(AdvisorError::Config("OPENAI_API_KEY is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            max_retries: config.max_retries,
        })
    }

    fn build_body(request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "messages": [{"role": "user", "content": request.prompt}],
            "temperature": request.temperature,
            "max_tokens": request.max_output_tokens,
        })
    }

    async fn post(&self, body: &serde_json::Value) -> Result<serde_json::Value> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let mut last_err: Option<AdvisorError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json().await.map_err(AdvisorError::Http);
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = AdvisorError::Completion(format!(
                        "API error {}: {}",
                        status, body_text
                    ));

                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(AdvisorError::Http(e));
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            AdvisorError::Completion("completion failed after retries".to_string())
        }))
    }

    fn parse_reply(json: &serde_json::Value) -> Result<String> {
        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                AdvisorError::Completion("response missing choices[0].message.content".to_string())
            })?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AdvisorError::Completion("empty reply text".to_string()));
        }
        Ok(text.to_string())
    }
}

#[async_trait]
impl CompletionBackend for OpenAiCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = Self::build_body(request);
        let json = self.post(&body).await?;
        Self::parse_reply(&json)
    }
}
