//! The app's named cache instances.
//!
//! Each workload gets its own independently sized store; instances never
//! share entries. There are no process-wide singletons: a [`CacheSet`] is
//! constructed explicitly and handed to the components that need it.

use serde_json::Value;

use super::store::{CacheConfig, CacheStore};
use crate::provider::AiResponse;

/// Independently configured cache stores for the app's distinct workloads.
pub struct CacheSet {
    general: CacheStore<Value>,
    search: CacheStore<Value>,
    analytics: CacheStore<Value>,
    ai_results: CacheStore<AiResponse>,
}

impl CacheSet {
    /// Creates all four stores from a single shared configuration.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_configs(
            config.clone(),
            config.clone(),
            config.clone(),
            config.clone(),
        )
    }

    /// Creates the stores with per-workload configurations.
    pub fn with_configs(
        general: CacheConfig,
        search: CacheConfig,
        analytics: CacheConfig,
        ai_results: CacheConfig,
    ) -> Self {
        Self {
            general: CacheStore::new("general", general),
            search: CacheStore::new("search", search),
            analytics: CacheStore::new("analytics", analytics),
            ai_results: CacheStore::new("ai_results", ai_results),
        }
    }

    /// Miscellaneous JSON lookups (user settings, tag lists).
    #[inline]
    pub fn general(&self) -> &CacheStore<Value> {
        &self.general
    }

    /// Note search results keyed by normalized query.
    #[inline]
    pub fn search(&self) -> &CacheStore<Value> {
        &self.search
    }

    /// Aggregated analytics payloads.
    #[inline]
    pub fn analytics(&self) -> &CacheStore<Value> {
        &self.analytics
    }

    /// Memoized AI responses keyed by request hash.
    #[inline]
    pub fn ai_results(&self) -> &CacheStore<AiResponse> {
        &self.ai_results
    }

    /// Clears every store.
    pub fn clear_all(&self) {
        self.general.clear();
        self.search.clear();
        self.analytics.clear();
        self.ai_results.clear();
    }

    /// Runs `cleanup` on every store, returning the total entries removed.
    pub fn cleanup_all(&self) -> usize {
        self.general.cleanup()
            + self.search.cleanup()
            + self.analytics.cleanup()
            + self.ai_results.cleanup()
    }
}

impl Default for CacheSet {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

impl std::fmt::Debug for CacheSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheSet")
            .field("general", &self.general.len())
            .field("search", &self.search.len())
            .field("analytics", &self.analytics.len())
            .field("ai_results", &self.ai_results.len())
            .finish()
    }
}
