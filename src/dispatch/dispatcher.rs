//! The AI dispatcher: provider registry, fallback execution, bounded batches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use parking_lot::RwLock;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::batch::{BatchItemResult, BatchJob, BatchStrategy};
use super::error::DispatchError;
use super::metrics::{DispatchMetrics, MetricsSnapshot};
use crate::cache::CacheStore;
use crate::constants::{
    DEFAULT_INTER_BATCH_DELAY_MS, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_PROVIDER_TIMEOUT_MS,
};
use crate::hashing::request_key;
use crate::provider::{AiRequest, AiResponse, ProviderCapability, ProviderDescriptor, ProviderError};

/// Execution limits and pacing for one [`AiDispatcher`].
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Batches above this size are rejected outright.
    pub max_batch_size: usize,
    /// Ceiling for a batch's requested window width.
    pub max_concurrency: usize,
    /// Pause between parallel batch windows. Near-zero in tests, around a
    /// second in production to stay under upstream rate limits.
    pub inter_batch_delay: Duration,
    /// Upper bound for a single generation or embedding call.
    pub provider_timeout: Duration,
    /// Upper bound for an availability probe.
    pub probe_timeout: Duration,
    /// Preferred provider id. When unset (or disabled), the enabled provider
    /// with the lowest priority value leads the chain.
    pub primary_provider: Option<String>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            inter_batch_delay: Duration::from_millis(DEFAULT_INTER_BATCH_DELAY_MS),
            provider_timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
            probe_timeout: Duration::from_millis(DEFAULT_PROBE_TIMEOUT_MS),
            primary_provider: None,
        }
    }
}

struct RegisteredProvider {
    descriptor: ProviderDescriptor,
    capability: Arc<dyn ProviderCapability>,
}

/// Routes requests to the first provider in the fallback chain that answers.
///
/// The registry is read-mostly: registration takes the write side of the
/// lock, dispatch snapshots the chain under the read side and drops the guard
/// before any provider call, so registering never races in-flight dispatch.
pub struct AiDispatcher {
    config: DispatcherConfig,
    providers: RwLock<HashMap<String, RegisteredProvider>>,
    metrics: DispatchMetrics,
}

impl AiDispatcher {
    /// Creates a dispatcher with no providers registered.
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            providers: RwLock::new(HashMap::new()),
            metrics: DispatchMetrics::default(),
        }
    }

    /// Creates a dispatcher with default limits.
    pub fn with_defaults() -> Self {
        Self::new(DispatcherConfig::default())
    }

    /// The active configuration.
    #[inline]
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Counter snapshot.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Registers (or replaces) a provider under `descriptor.id`.
    pub fn register_provider(
        &self,
        descriptor: ProviderDescriptor,
        capability: Arc<dyn ProviderCapability>,
    ) {
        let id = descriptor.id.clone();
        let replaced = self
            .providers
            .write()
            .insert(
                id.clone(),
                RegisteredProvider {
                    descriptor,
                    capability,
                },
            )
            .is_some();
        if replaced {
            info!(provider = %id, "replaced registered provider");
        } else {
            debug!(provider = %id, "registered provider");
        }
    }

    /// Removes a provider, returning `true` if it was registered.
    pub fn deregister_provider(&self, id: &str) -> bool {
        self.providers.write().remove(id).is_some()
    }

    /// Ids of all registered providers, in no particular order.
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.read().keys().cloned().collect()
    }

    /// The descriptor registered under `id`, if any.
    pub fn descriptor(&self, id: &str) -> Option<ProviderDescriptor> {
        self.providers.read().get(id).map(|p| p.descriptor.clone())
    }

    /// Executes a single request against the fallback chain.
    ///
    /// Providers are probed before generating; a failed probe or a failed
    /// call moves on to the next provider in the chain. The error is
    /// [`DispatchError::AllProvidersUnavailable`] only once every enabled
    /// provider has been tried.
    #[instrument(skip(self, request), fields(content_len = request.content.len()))]
    pub async fn execute_request(
        &self,
        request: &AiRequest,
    ) -> Result<AiResponse, DispatchError> {
        self.metrics.record_request();

        let chain = self.fallback_chain();
        let attempted = chain.len();

        for (descriptor, capability) in chain {
            match self
                .try_generate(&descriptor, capability.as_ref(), request)
                .await
            {
                Ok(response) => {
                    debug!(provider = %descriptor.id, elapsed_ms = response.response_time_ms, "request served");
                    self.metrics.record_response(response.tokens_used.as_ref());
                    return Ok(response);
                }
                Err(provider_error) => {
                    warn!(
                        provider = %descriptor.id,
                        retryable = provider_error.is_retryable(),
                        error = %provider_error,
                        "provider failed, trying next in chain"
                    );
                }
            }
        }

        self.metrics.record_failure();
        error!(attempted, "request exhausted the provider chain");
        Err(DispatchError::AllProvidersUnavailable { attempted })
    }

    /// Executes a batch job, preserving input order in the result sequence.
    ///
    /// Admission control runs first and rejects oversized or over-concurrent
    /// jobs before any provider call. Per-item failures are captured in the
    /// result, never propagated.
    pub async fn execute_batch(
        &self,
        job: &BatchJob,
    ) -> Result<Vec<BatchItemResult>, DispatchError> {
        self.admit(job)?;

        if job.is_empty() {
            return Ok(Vec::new());
        }

        let job_id = Uuid::new_v4();
        info!(
            %job_id,
            size = job.len(),
            strategy = ?job.strategy,
            "executing batch"
        );

        let results = match job.strategy {
            BatchStrategy::Parallel => {
                self.run_parallel(job_id, &job.requests, job.max_concurrency)
                    .await
            }
            BatchStrategy::Sequential => self.run_sequential(job_id, &job.requests).await,
        };

        let failed = results.iter().filter(|r| !r.is_success()).count();
        info!(%job_id, failed, total = results.len(), "batch finished");

        Ok(results)
    }

    /// Generates embeddings through the same probe/fallback chain as
    /// [`execute_request`](Self::execute_request).
    #[instrument(skip(self, texts), fields(count = texts.len()))]
    pub async fn execute_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, DispatchError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let chain = self.fallback_chain();
        let attempted = chain.len();

        for (descriptor, capability) in chain {
            match self
                .try_embed(&descriptor, capability.as_ref(), texts)
                .await
            {
                Ok(vectors) => {
                    debug!(provider = %descriptor.id, count = vectors.len(), "embeddings served");
                    return Ok(vectors);
                }
                Err(provider_error) => {
                    warn!(
                        provider = %descriptor.id,
                        error = %provider_error,
                        "embedding provider failed, trying next in chain"
                    );
                }
            }
        }

        error!(attempted, "embedding request exhausted the provider chain");
        Err(DispatchError::AllProvidersUnavailable { attempted })
    }

    /// Memoized [`execute_request`](Self::execute_request): looks up the
    /// request hash in `cache` first and stores the response on a miss.
    pub async fn execute_request_cached(
        &self,
        request: &AiRequest,
        cache: &CacheStore<AiResponse>,
    ) -> Result<AiResponse, DispatchError> {
        let key = request_key(request);

        if let Some(hit) = cache.get(&key) {
            debug!(store = %cache.name(), "AI result cache hit");
            return Ok(hit);
        }

        let response = self.execute_request(request).await?;
        cache.set(key, response.clone());
        Ok(response)
    }

    /// Snapshots the enabled providers in chain order: the resolved primary
    /// first, then every fallback-eligible provider by ascending priority
    /// (ties broken by id for determinism).
    fn fallback_chain(&self) -> Vec<(ProviderDescriptor, Arc<dyn ProviderCapability>)> {
        let mut enabled: Vec<(ProviderDescriptor, Arc<dyn ProviderCapability>)> = {
            let providers = self.providers.read();
            providers
                .values()
                .filter(|p| p.descriptor.enabled)
                .map(|p| (p.descriptor.clone(), Arc::clone(&p.capability)))
                .collect()
        };

        enabled.sort_by(|(a, _), (b, _)| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));

        if let Some(primary) = &self.config.primary_provider {
            if let Some(position) = enabled.iter().position(|(d, _)| &d.id == primary) {
                let promoted = enabled.remove(position);
                enabled.insert(0, promoted);
            }
        }

        enabled
            .into_iter()
            .enumerate()
            .filter(|(i, (descriptor, _))| *i == 0 || descriptor.fallback_enabled)
            .map(|(_, pair)| pair)
            .collect()
    }

    async fn probe(&self, descriptor: &ProviderDescriptor, capability: &dyn ProviderCapability) -> bool {
        match tokio::time::timeout(self.config.probe_timeout, capability.probe()).await {
            Ok(alive) => alive,
            Err(_) => {
                debug!(provider = %descriptor.id, "availability probe timed out");
                false
            }
        }
    }

    async fn try_generate(
        &self,
        descriptor: &ProviderDescriptor,
        capability: &dyn ProviderCapability,
        request: &AiRequest,
    ) -> Result<AiResponse, ProviderError> {
        if !self.probe(descriptor, capability).await {
            return Err(ProviderError::Unavailable {
                provider: descriptor.id.clone(),
                message: "availability probe failed".to_string(),
            });
        }

        let started = Instant::now();
        match tokio::time::timeout(self.config.provider_timeout, capability.generate(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                provider: descriptor.id.clone(),
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        }
    }

    async fn try_embed(
        &self,
        descriptor: &ProviderDescriptor,
        capability: &dyn ProviderCapability,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, ProviderError> {
        if !self.probe(descriptor, capability).await {
            return Err(ProviderError::Unavailable {
                provider: descriptor.id.clone(),
                message: "availability probe failed".to_string(),
            });
        }

        let started = Instant::now();
        let vectors =
            match tokio::time::timeout(self.config.provider_timeout, capability.embed(texts)).await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(ProviderError::Timeout {
                        provider: descriptor.id.clone(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                }
            };

        if vectors.len() != texts.len() {
            return Err(ProviderError::InvalidResponse {
                provider: descriptor.id.clone(),
                message: format!("expected {} embeddings, got {}", texts.len(), vectors.len()),
            });
        }

        Ok(vectors)
    }

    fn admit(&self, job: &BatchJob) -> Result<(), DispatchError> {
        if job.len() > self.config.max_batch_size {
            return Err(DispatchError::BatchTooLarge {
                size: job.len(),
                max: self.config.max_batch_size,
            });
        }

        if job.strategy == BatchStrategy::Parallel {
            if job.max_concurrency == 0 {
                return Err(DispatchError::ZeroConcurrency);
            }
            if job.max_concurrency > self.config.max_concurrency {
                return Err(DispatchError::ConcurrencyTooHigh {
                    requested: job.max_concurrency,
                    max: self.config.max_concurrency,
                });
            }
        }

        Ok(())
    }

    /// Runs the requests in fixed windows of `window_size`. Requests inside a
    /// window execute concurrently; windows execute strictly one after
    /// another with the configured pacing delay in between. `join_all`
    /// returns results in input order, so positional correlation is preserved
    /// no matter which request finishes first.
    async fn run_parallel(
        &self,
        job_id: Uuid,
        requests: &[AiRequest],
        window_size: usize,
    ) -> Vec<BatchItemResult> {
        let mut results = Vec::with_capacity(requests.len());
        let window_count = requests.len().div_ceil(window_size);

        for (window, chunk) in requests.chunks(window_size).enumerate() {
            debug!(
                %job_id,
                window = window + 1,
                of = window_count,
                len = chunk.len(),
                "processing batch window"
            );

            let outcomes =
                join_all(chunk.iter().map(|request| self.dispatch_batch_item(request))).await;
            results.extend(outcomes);

            if window + 1 < window_count && !self.config.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.config.inter_batch_delay).await;
            }
        }

        results
    }

    async fn run_sequential(&self, job_id: Uuid, requests: &[AiRequest]) -> Vec<BatchItemResult> {
        let mut results = Vec::with_capacity(requests.len());
        for (index, request) in requests.iter().enumerate() {
            debug!(%job_id, index, "processing sequential batch item");
            results.push(self.dispatch_batch_item(request).await);
        }
        results
    }

    async fn dispatch_batch_item(&self, request: &AiRequest) -> BatchItemResult {
        match self.execute_request(request).await {
            Ok(response) => BatchItemResult::ok(response),
            Err(dispatch_error) => BatchItemResult::err(&dispatch_error),
        }
    }
}

impl std::fmt::Debug for AiDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiDispatcher")
            .field("providers", &self.providers.read().len())
            .field("max_batch_size", &self.config.max_batch_size)
            .field("max_concurrency", &self.config.max_concurrency)
            .finish()
    }
}
