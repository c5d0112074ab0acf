//! The cache store: a bounded string-keyed map with lazy TTL expiry.
//!
//! All operations are synchronous and guarded by a single mutex per store, so
//! concurrent `set`/`get`/`delete` on the same key are linearizable. Expiry is
//! computed lazily on access; there is no background sweep thread, at the cost
//! of stale entries lingering until touched, cleaned or evicted.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace};

use super::entry::CacheEntry;
use super::strategy::EvictionStrategy;
use crate::constants::{DEFAULT_CACHE_MAX_SIZE, DEFAULT_CACHE_TTL_MS};

/// Sizing and policy knobs for one [`CacheStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Maximum number of entries. Values below 1 are clamped to 1.
    pub max_size: usize,
    /// TTL applied by `set` when the caller gives none. `None` disables
    /// default expiry.
    pub default_ttl: Option<Duration>,
    /// Victim selection policy when the store is full.
    pub strategy: EvictionStrategy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_CACHE_MAX_SIZE,
            default_ttl: Some(Duration::from_millis(DEFAULT_CACHE_TTL_MS)),
            strategy: EvictionStrategy::Lru,
        }
    }
}

/// Point-in-time snapshot of a store's contents.
///
/// Taking a snapshot never mutates entries; in particular it does not count
/// as an access and does not remove entries it finds expired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries currently held, including ones that expired but were not yet
    /// removed.
    pub total_size: usize,
    /// Entries whose TTL has elapsed.
    pub expired_count: usize,
    /// Entries still live.
    pub valid_count: usize,
    /// Sum of all entry access counts.
    pub total_access_count: u64,
    /// `total_access_count / total_size`, 0 when empty.
    pub average_access_count: f64,
    /// Age of the oldest entry in milliseconds, `None` when empty.
    pub oldest_entry_age_ms: Option<u64>,
    /// Age of the newest entry in milliseconds, `None` when empty.
    pub newest_entry_age_ms: Option<u64>,
    /// Configured capacity.
    pub max_size: usize,
    /// `total_size / max_size`, 0 when `max_size` is 0.
    pub utilization_rate: f64,
}

struct StoreInner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    next_sequence: u64,
}

/// A named, bounded cache mapping string keys to values of one type.
///
/// Absence is a normal return value: no operation errors on a missing or
/// expired key.
pub struct CacheStore<V> {
    name: String,
    config: CacheConfig,
    inner: Mutex<StoreInner<V>>,
}

impl<V> CacheStore<V> {
    /// Creates a store with the given name and configuration.
    pub fn new(name: impl Into<String>, mut config: CacheConfig) -> Self {
        config.max_size = config.max_size.max(1);
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                next_sequence: 0,
            }),
        }
    }

    /// Creates a store with the default configuration.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CacheConfig::default())
    }

    /// The store's name, used in logs.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.max_size
    }

    /// Configured eviction strategy.
    #[inline]
    pub fn strategy(&self) -> EvictionStrategy {
        self.config.strategy
    }

    /// Inserts or overwrites `key` with the store's default TTL.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.config.default_ttl);
    }

    /// Inserts or overwrites `key` with an explicit TTL.
    ///
    /// `None` (or a zero duration) means the entry never expires. When the
    /// store is full and `key` is new, room is made first: expired entries
    /// are collected if any exist, otherwise exactly one strategy-selected
    /// victim is removed. Overwriting resets the entry's age and access
    /// stats.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let mut inner = self.inner.lock();

        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.config.max_size {
            self.evict_one(&mut inner);
        }

        let sequence = inner.next_sequence;
        inner.next_sequence += 1;
        inner.entries.insert(key, CacheEntry::new(value, ttl, sequence));
    }

    /// Removes `key`, returning `true` if it was present (expired or not).
    pub fn delete(&self, key: &str) -> bool {
        self.inner.lock().entries.remove(key).is_some()
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    /// Number of entries currently held, including not-yet-collected expired
    /// ones.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Returns `true` if `key` is present and not expired.
    ///
    /// Unlike `get`, this does not count as an access. An expired entry found
    /// here is removed.
    pub fn has(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };
        if expired {
            inner.entries.remove(key);
            trace!(store = %self.name, key, "expired entry dropped on has()");
            return false;
        }
        true
    }

    /// The keys currently held, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().entries.keys().cloned().collect()
    }

    /// Eagerly removes every expired entry, returning how many were dropped.
    pub fn cleanup(&self) -> usize {
        let mut inner = self.inner.lock();
        let removed = Self::cleanup_locked(&mut inner);
        if removed > 0 {
            debug!(store = %self.name, removed, "cache cleanup");
        }
        removed
    }

    /// Snapshot of the store's contents; mutates nothing.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let total_size = inner.entries.len();
        let expired_count = inner.entries.values().filter(|e| e.is_expired()).count();
        let total_access_count: u64 = inner.entries.values().map(|e| e.access_count()).sum();
        let average_access_count = if total_size == 0 {
            0.0
        } else {
            total_access_count as f64 / total_size as f64
        };
        let oldest_entry_age_ms = inner
            .entries
            .values()
            .map(|e| e.created_at().elapsed())
            .max()
            .map(|d| d.as_millis() as u64);
        let newest_entry_age_ms = inner
            .entries
            .values()
            .map(|e| e.created_at().elapsed())
            .min()
            .map(|d| d.as_millis() as u64);
        let max_size = self.config.max_size;
        let utilization_rate = if max_size == 0 {
            0.0
        } else {
            total_size as f64 / max_size as f64
        };

        CacheStats {
            total_size,
            expired_count,
            valid_count: total_size - expired_count,
            total_access_count,
            average_access_count,
            oldest_entry_age_ms,
            newest_entry_age_ms,
            max_size,
            utilization_rate,
        }
    }

    fn cleanup_locked(inner: &mut StoreInner<V>) -> usize {
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        before - inner.entries.len()
    }

    /// Frees at least one slot. Expired entries are collected first; a live
    /// victim is only taken when nothing had expired.
    fn evict_one(&self, inner: &mut StoreInner<V>) {
        let expired = Self::cleanup_locked(inner);
        if expired > 0 {
            trace!(store = %self.name, expired, "eviction satisfied by expired entries");
            return;
        }

        if let Some(victim) = self.select_victim(inner) {
            inner.entries.remove(&victim);
            debug!(
                store = %self.name,
                key = %victim,
                strategy = %self.config.strategy,
                "evicted cache entry"
            );
        }
    }

    fn select_victim(&self, inner: &StoreInner<V>) -> Option<String> {
        let candidate = match self.config.strategy {
            EvictionStrategy::Lru => inner
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.last_accessed_at(), e.sequence())),
            EvictionStrategy::Fifo => inner.entries.iter().min_by_key(|(_, e)| e.sequence()),
            EvictionStrategy::Lfu => inner
                .entries
                .iter()
                .min_by_key(|(_, e)| (e.access_count(), e.sequence())),
        };
        candidate.map(|(key, _)| key.clone())
    }
}

impl<V: Clone> CacheStore<V> {
    /// Looks up `key`, returning a clone of the value.
    ///
    /// A hit updates the entry's access count and last-access time. An entry
    /// past its TTL is removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return None,
        };
        if expired {
            inner.entries.remove(key);
            trace!(store = %self.name, key, "expired entry dropped on get()");
            return None;
        }
        inner
            .entries
            .get_mut(key)
            .map(|entry| entry.touch().clone())
    }
}

impl<V> std::fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("max_size", &self.config.max_size)
            .field("strategy", &self.config.strategy)
            .finish()
    }
}
