//! Quill AI core: provider orchestration and result caching.
//!
//! This crate is the in-process engine behind the Quill notes app's AI
//! features (summaries, classification, semantic search). It is not a network
//! service; the HTTP layer translates JSON bodies into the typed shapes
//! exported here and back.
//!
//! # Public API Surface
//!
//! ## Caching
//! - [`CacheStore`], [`CacheConfig`], [`EvictionStrategy`] - bounded keyed
//!   cache with TTL expiry and pluggable eviction
//! - [`CacheSet`] - the app's named cache instances (general, search,
//!   analytics, AI results)
//!
//! ## Providers
//! - [`ProviderCapability`] - the trait every AI/embedding backend implements
//! - [`ProviderDescriptor`], [`AiRequest`], [`AiResponse`], [`TokenUsage`]
//! - [`OpenAiHttpProvider`] - OpenAI-compatible HTTP adapter
//!
//! ## Dispatch
//! - [`AiDispatcher`], [`DispatcherConfig`] - primary/fallback execution,
//!   bounded batches, admission control
//! - [`BatchJob`], [`BatchStrategy`], [`BatchItemResult`]
//!
//! ## Embeddings
//! - [`VectorBatchCoordinator`], [`EmbeddingStore`] - batch embedding
//!   generation with idempotent re-runs and exclusive index rebuilds
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod embedding;
pub mod hashing;
pub mod provider;

pub use cache::{CacheConfig, CacheSet, CacheStats, CacheStore, EvictionStrategy};

pub use config::{Config, ConfigError};

pub use dispatch::{
    AiDispatcher, BatchItemResult, BatchJob, BatchStrategy, DispatchError, DispatchMetrics,
    DispatcherConfig, MetricsSnapshot,
};

#[cfg(any(test, feature = "mock"))]
pub use embedding::InMemoryEmbeddingStore;
pub use embedding::{
    BatchEmbeddingOutcome, CoordinatorConfig, EmbeddingError, EmbeddingMetadata, EmbeddingStore,
    FailedEmbedding, NoteRecord, PersistenceError, RebuildReport, SimilarMatch, SimilarityIndex,
    StoredEmbedding, VectorBatchCoordinator,
};

pub use hashing::{hash_request, hash_to_u64, request_key};

#[cfg(any(test, feature = "mock"))]
pub use provider::MockProvider;
pub use provider::{
    AiRequest, AiResponse, HttpProviderConfig, OpenAiHttpProvider, ProviderCapability,
    ProviderDescriptor, ProviderError, TokenUsage,
};
