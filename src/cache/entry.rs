use std::time::{Duration, Instant};

/// A cached value plus the bookkeeping used by TTL expiry and eviction.
///
/// Entries are owned by their [`CacheStore`](super::CacheStore) and never
/// handed out by reference; `get` clones the value instead.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Option<Duration>,
    access_count: u64,
    last_accessed_at: Instant,
    // Monotonic per-store insertion counter. Breaks eviction ties so victim
    // selection is deterministic within a run.
    sequence: u64,
}

impl<V> CacheEntry<V> {
    pub(crate) fn new(value: V, ttl: Option<Duration>, sequence: u64) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            // A zero TTL means "never expires", same as no TTL at all.
            ttl: ttl.filter(|t| !t.is_zero()),
            access_count: 0,
            last_accessed_at: now,
            sequence,
        }
    }

    /// Returns `true` if the entry's TTL has elapsed.
    #[inline]
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() > ttl,
            None => false,
        }
    }

    /// Borrows the cached value without updating access stats.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Records an access and borrows the value.
    pub(crate) fn touch(&mut self) -> &V {
        self.access_count += 1;
        self.last_accessed_at = Instant::now();
        &self.value
    }

    /// Number of `get` hits this entry has served.
    #[inline]
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Instant the entry was created (or last overwritten).
    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Instant of the most recent `get` hit (creation time if never read).
    #[inline]
    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    /// The entry's TTL, if it expires at all.
    #[inline]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    #[inline]
    pub(crate) fn sequence(&self) -> u64 {
        self.sequence
    }
}
