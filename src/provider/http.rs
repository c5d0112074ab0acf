//! OpenAI-compatible HTTP provider.
//!
//! Speaks the `/chat/completions` and `/embeddings` wire format, which most
//! hosted backends (and local gateways) accept. One instance is constructed
//! per configured provider id, so the same adapter serves "openai",
//! "together", a vLLM sidecar, etc.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::capability::ProviderCapability;
use super::error::ProviderError;
use super::types::{AiRequest, AiResponse, TokenUsage};
use crate::constants::{DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PROVIDER_TIMEOUT_MS};

/// Connection settings for one [`OpenAiHttpProvider`].
#[derive(Debug, Clone)]
pub struct HttpProviderConfig {
    /// Provider id reported in responses and errors.
    pub id: String,
    /// Base URL up to but excluding `/chat/completions`.
    pub base_url: String,
    /// Bearer token.
    pub api_key: String,
    /// Chat model name.
    pub model: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Per-request upper bound.
    pub request_timeout: Duration,
    /// Upper bound for the availability probe.
    pub probe_timeout: Duration,
}

impl HttpProviderConfig {
    /// Creates a config with default timeouts.
    pub fn new(
        id: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            embedding_model: embedding_model.into(),
            request_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
        }
    }
}

/// [`ProviderCapability`] implementation over an OpenAI-compatible HTTP API.
pub struct OpenAiHttpProvider {
    config: HttpProviderConfig,
    http: Client,
}

impl OpenAiHttpProvider {
    /// Creates a provider from connection settings.
    pub fn new(config: HttpProviderConfig) -> Self {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { config, http }
    }

    /// The configured provider id.
    #[inline]
    pub fn id(&self) -> &str {
        &self.config.id
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn transport_error(&self, error: &reqwest::Error, started: Instant) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout {
                provider: self.config.id.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }
        } else {
            ProviderError::Transport {
                provider: self.config.id.clone(),
                message: error.to_string(),
            }
        }
    }

    fn status_error(&self, status: StatusCode, body: &str) -> ProviderError {
        classify_status(&self.config.id, status, body)
    }
}

#[async_trait]
impl ProviderCapability for OpenAiHttpProvider {
    async fn probe(&self) -> bool {
        let result = self
            .http
            .get(self.endpoint("models"))
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(error) => {
                debug!(provider = %self.config.id, %error, "availability probe failed");
                false
            }
        }
    }

    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError> {
        let started = Instant::now();

        let mut messages = Vec::with_capacity(2);
        if let Some(context) = &request.context {
            messages.push(json!({ "role": "system", "content": context }));
        }
        messages.push(json!({ "role": "user", "content": request.content }));

        let mut body = json!({
            "model": self.config.model,
            "messages": messages,
        });
        if let Some(max_length) = request.max_length {
            body["max_tokens"] = json!(max_length);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        let response = self
            .http
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e, started))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.config.id, %status, "chat completion rejected");
            return Err(self.status_error(status, &body));
        }

        let completion: ChatCompletionResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: self.config.id.clone(),
                    message: e.to_string(),
                })?;

        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: self.config.id.clone(),
                message: "response carried no choices".to_string(),
            })?;

        Ok(AiResponse {
            content,
            category: None,
            tags: None,
            summary: None,
            provider: self.config.id.clone(),
            model: completion.model.unwrap_or_else(|| self.config.model.clone()),
            tokens_used: completion.usage.map(|u| TokenUsage {
                input: u.prompt_tokens,
                output: u.completion_tokens,
                total: u.total_tokens,
            }),
            cost: None,
            response_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let body = json!({
            "model": self.config.embedding_model,
            "input": texts,
        });

        let response = self
            .http
            .post(self.endpoint("embeddings"))
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e, started))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.config.id, %status, "embedding request rejected");
            return Err(self.status_error(status, &body));
        }

        let payload: EmbeddingResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::InvalidResponse {
                    provider: self.config.id.clone(),
                    message: e.to_string(),
                })?;

        let mut data = payload.data;
        if data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse {
                provider: self.config.id.clone(),
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    data.len()
                ),
            });
        }
        // the wire format tags each vector with its input index
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

/// Maps an HTTP status to the provider error taxonomy.
fn classify_status(provider: &str, status: StatusCode, body: &str) -> ProviderError {
    let provider = provider.to_string();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth { provider },
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { provider },
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ProviderError::InvalidRequest {
                provider,
                message: truncate(body, 200),
            }
        }
        status if status.is_server_error() => ProviderError::Unavailable {
            provider,
            message: format!("upstream returned {status}"),
        },
        status => ProviderError::Transport {
            provider,
            message: format!("unexpected status {status}"),
        },
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &s[..end])
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}
