//! Cross-cutting, shared constants.
//!
//! These are the defaults behind [`Config`](crate::Config); prefer overriding
//! them through configuration rather than referencing them directly.

/// Upper bound on requests accepted into a single batch job.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;

/// Concurrent requests per batch window.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// Pause between batch windows, used to respect upstream rate limits.
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 1_000;

/// Upper bound for a single provider generation or embedding call.
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 30_000;

/// Upper bound for a provider availability probe.
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Default entry capacity of a cache store.
pub const DEFAULT_CACHE_MAX_SIZE: usize = 1_000;

/// Default TTL applied by `set` when the caller gives none.
pub const DEFAULT_CACHE_TTL_MS: u64 = 5 * 60 * 1_000;

/// Texts sent to a provider per embedding call when chunking a batch.
pub const DEFAULT_EMBEDDING_CHUNK_SIZE: usize = 16;
