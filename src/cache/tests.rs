use std::thread::sleep;
use std::time::Duration;

use serde_json::json;

use super::store::{CacheConfig, CacheStore};
use super::strategy::EvictionStrategy;
use super::CacheSet;

fn store(max_size: usize, strategy: EvictionStrategy) -> CacheStore<String> {
    CacheStore::new(
        "test",
        CacheConfig {
            max_size,
            default_ttl: None,
            strategy,
        },
    )
}

#[test]
fn test_capacity_invariant_under_overflow() {
    let cache = store(3, EvictionStrategy::Lru);

    for i in 0..10 {
        cache.set(format!("key-{i}"), format!("value-{i}"));
        assert!(cache.len() <= 3, "size exceeded capacity after set #{i}");
    }
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_lru_evicts_least_recently_used() {
    let cache = store(2, EvictionStrategy::Lru);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    assert_eq!(cache.get("a"), Some("1".to_string()));
    cache.set("c", "3".to_string());

    // a was touched after b, so b is the LRU victim
    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("c"));
}

#[test]
fn test_fifo_evicts_oldest_insertion() {
    let cache = store(2, EvictionStrategy::Fifo);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    assert_eq!(cache.get("a"), Some("1".to_string()));
    cache.set("c", "3".to_string());

    // insertion order, not access, governs FIFO
    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
}

#[test]
fn test_lfu_evicts_least_frequently_used() {
    let cache = store(2, EvictionStrategy::Lfu);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.get("a");
    cache.get("a");
    cache.get("b");
    cache.set("c", "3".to_string());

    assert!(cache.has("a"));
    assert!(!cache.has("b"));
    assert!(cache.has("c"));
}

#[test]
fn test_lfu_tie_breaks_by_insertion_order() {
    let cache = store(2, EvictionStrategy::Lfu);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.set("c", "3".to_string());

    // nobody was read; the older of the tied entries goes first
    assert!(!cache.has("a"));
    assert!(cache.has("b"));
    assert!(cache.has("c"));
}

#[test]
fn test_ttl_round_trip() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set_with_ttl("k", "v".to_string(), Some(Duration::from_millis(100)));
    assert_eq!(cache.get("k"), Some("v".to_string()));
    assert_eq!(cache.len(), 1);

    sleep(Duration::from_millis(150));

    assert_eq!(cache.get("k"), None);
    assert_eq!(cache.len(), 0);
}

#[test]
fn test_zero_ttl_never_expires() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set_with_ttl("forever", "v".to_string(), Some(Duration::ZERO));
    sleep(Duration::from_millis(30));

    assert_eq!(cache.get("forever"), Some("v".to_string()));
}

#[test]
fn test_has_checks_expiry_without_counting_access() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set_with_ttl("short", "v".to_string(), Some(Duration::from_millis(40)));
    cache.set("live", "v".to_string());

    assert!(cache.has("short"));
    assert!(cache.has("live"));
    assert!(!cache.has("missing"));
    assert_eq!(cache.stats().total_access_count, 0);

    sleep(Duration::from_millis(60));

    assert!(!cache.has("short"));
    // the expired entry was removed by has(), not merely hidden
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_eviction_prefers_expired_entries() {
    let cache = store(2, EvictionStrategy::Lru);

    cache.set_with_ttl("dead", "1".to_string(), Some(Duration::from_millis(40)));
    cache.set("live", "2".to_string());
    sleep(Duration::from_millis(60));

    cache.set("new", "3".to_string());

    // the expired entry made room; the live one survived despite being LRU
    assert!(cache.has("live"));
    assert!(cache.has("new"));
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_overwrite_keeps_size_and_replaces_value() {
    let cache = store(2, EvictionStrategy::Lru);

    cache.set("a", "old".to_string());
    cache.set("b", "2".to_string());
    cache.set("a", "new".to_string());

    assert_eq!(cache.len(), 2);
    assert_eq!(cache.get("a"), Some("new".to_string()));
    assert!(cache.has("b"));
}

#[test]
fn test_delete_and_clear() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());

    assert!(cache.delete("a"));
    assert!(!cache.delete("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn test_keys_lists_current_entries() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());

    let mut keys = cache.keys();
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_cleanup_removes_only_expired() {
    let cache = store(10, EvictionStrategy::Lru);

    cache.set_with_ttl("e1", "1".to_string(), Some(Duration::from_millis(30)));
    cache.set_with_ttl("e2", "2".to_string(), Some(Duration::from_millis(30)));
    cache.set("live", "3".to_string());

    sleep(Duration::from_millis(50));

    assert_eq!(cache.cleanup(), 2);
    assert_eq!(cache.len(), 1);
    assert!(cache.has("live"));
}

#[test]
fn test_stats_snapshot() {
    let cache = store(4, EvictionStrategy::Lru);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    cache.get("a");
    cache.get("a");
    cache.get("b");

    let stats = cache.stats();
    assert_eq!(stats.total_size, 2);
    assert_eq!(stats.expired_count, 0);
    assert_eq!(stats.valid_count, 2);
    assert_eq!(stats.total_access_count, 3);
    assert!((stats.average_access_count - 1.5).abs() < f64::EPSILON);
    assert_eq!(stats.max_size, 4);
    assert!((stats.utilization_rate - 0.5).abs() < f64::EPSILON);
    assert!(stats.oldest_entry_age_ms.is_some());
    assert!(stats.newest_entry_age_ms.is_some());
}

#[test]
fn test_stats_counts_expired_without_removing() {
    let cache = store(4, EvictionStrategy::Lru);

    cache.set_with_ttl("short", "1".to_string(), Some(Duration::from_millis(30)));
    cache.set("live", "2".to_string());
    sleep(Duration::from_millis(50));

    let stats = cache.stats();
    assert_eq!(stats.total_size, 2);
    assert_eq!(stats.expired_count, 1);
    assert_eq!(stats.valid_count, 1);
    // the snapshot must not collect the expired entry
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_stats_empty_store() {
    let cache = store(4, EvictionStrategy::Lru);

    let stats = cache.stats();
    assert_eq!(stats.total_size, 0);
    assert_eq!(stats.average_access_count, 0.0);
    assert_eq!(stats.utilization_rate, 0.0);
    assert!(stats.oldest_entry_age_ms.is_none());
    assert!(stats.newest_entry_age_ms.is_none());
}

#[test]
fn test_zero_capacity_clamped_to_one() {
    let cache: CacheStore<String> = CacheStore::new(
        "clamped",
        CacheConfig {
            max_size: 0,
            default_ttl: None,
            strategy: EvictionStrategy::Lru,
        },
    );

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());

    assert_eq!(cache.len(), 1);
    assert!(cache.has("b"));
}

#[test]
fn test_cache_set_instances_are_independent() {
    let caches = CacheSet::default();

    caches.general().set("shared-key", json!({"from": "general"}));
    caches.search().set("shared-key", json!({"from": "search"}));

    assert_eq!(
        caches.general().get("shared-key"),
        Some(json!({"from": "general"}))
    );
    assert_eq!(
        caches.search().get("shared-key"),
        Some(json!({"from": "search"}))
    );
    assert_eq!(caches.analytics().get("shared-key"), None);

    caches.general().delete("shared-key");
    assert!(caches.search().has("shared-key"));
}
