//! Scripted provider for tests.
//!
//! Behavior is controlled at runtime through setters so a test can flip a
//! provider from healthy to failing mid-flight. Call counters let tests
//! assert that admission control rejected work before any provider call.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::capability::ProviderCapability;
use super::error::ProviderError;
use super::types::{AiRequest, AiResponse, TokenUsage};

/// A fully scripted [`ProviderCapability`].
pub struct MockProvider {
    id: String,
    model: String,
    embedding_dim: usize,
    available: AtomicBool,
    fail_generation: AtomicBool,
    fail_embedding: AtomicBool,
    fail_marker: Mutex<Option<String>>,
    latency: Mutex<Duration>,
    probe_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    embed_calls: AtomicUsize,
}

impl MockProvider {
    /// Creates a healthy provider answering instantly.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model: "mock-model".to_string(),
            embedding_dim: 8,
            available: AtomicBool::new(true),
            fail_generation: AtomicBool::new(false),
            fail_embedding: AtomicBool::new(false),
            fail_marker: Mutex::new(None),
            latency: Mutex::new(Duration::ZERO),
            probe_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            embed_calls: AtomicUsize::new(0),
        }
    }

    /// Builder: artificial latency for every call.
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.latency.lock() = latency;
        self
    }

    /// Builder: embedding vector dimension (default 8).
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Builder: starts with a failing probe.
    pub fn unavailable(self) -> Self {
        self.available.store(false, Ordering::SeqCst);
        self
    }

    /// Builder: every generation call fails.
    pub fn failing(self) -> Self {
        self.fail_generation.store(true, Ordering::SeqCst);
        self
    }

    /// Flips probe availability.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Makes every generation call fail (or succeed again).
    pub fn set_fail_generation(&self, fail: bool) {
        self.fail_generation.store(fail, Ordering::SeqCst);
    }

    /// Makes every embedding call fail (or succeed again).
    pub fn set_fail_embedding(&self, fail: bool) {
        self.fail_embedding.store(fail, Ordering::SeqCst);
    }

    /// Fails generation only for requests whose content contains `marker`.
    pub fn set_fail_marker(&self, marker: Option<&str>) {
        *self.fail_marker.lock() = marker.map(str::to_string);
    }

    /// Number of probe calls observed.
    pub fn probe_count(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    /// Number of generation calls observed.
    pub fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Number of embedding calls observed.
    pub fn embed_count(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    async fn apply_latency(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    fn scripted_failure(&self) -> ProviderError {
        ProviderError::Transport {
            provider: self.id.clone(),
            message: "scripted failure".to_string(),
        }
    }

    /// Deterministic pseudo-embedding derived from the text's BLAKE3 hash.
    fn embedding_for(&self, text: &str) -> Vec<f32> {
        let hash = blake3::hash(text.as_bytes());
        let bytes = hash.as_bytes();
        (0..self.embedding_dim)
            .map(|i| bytes[i % bytes.len()] as f32 / 255.0)
            .collect()
    }
}

#[async_trait]
impl ProviderCapability for MockProvider {
    async fn probe(&self) -> bool {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.available.load(Ordering::SeqCst)
    }

    async fn generate(&self, request: &AiRequest) -> Result<AiResponse, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_latency().await;

        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(self.scripted_failure());
        }
        if let Some(marker) = self.fail_marker.lock().as_deref() {
            if request.content.contains(marker) {
                return Err(self.scripted_failure());
            }
        }

        let input_tokens = request.content.split_whitespace().count() as u32;
        let output_tokens = 12;

        Ok(AiResponse {
            content: format!("Mock response from {} for '{}'", self.id, request.content),
            category: request.include_metadata.then(|| "note".to_string()),
            tags: request.include_metadata.then(|| vec!["mock".to_string()]),
            summary: None,
            provider: self.id.clone(),
            model: self.model.clone(),
            tokens_used: Some(TokenUsage {
                input: input_tokens,
                output: output_tokens,
                total: input_tokens + output_tokens,
            }),
            cost: Some(0.0),
            response_time_ms: self.latency.lock().as_millis() as u64,
        })
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.apply_latency().await;

        if self.fail_embedding.load(Ordering::SeqCst) {
            return Err(self.scripted_failure());
        }

        Ok(texts.iter().map(|t| self.embedding_for(t)).collect())
    }
}
