//! Unit tests for the cache store

use super::*;
use crate::entry::ENTRY_OVERHEAD_BYTES;
use std::time::Duration;
use tokio::time::advance;

fn test_config() -> CacheConfig {
    CacheConfig::default()
        .with_default_ttl(Duration::from_secs(60))
        .with_sweep_interval(Duration::ZERO)
}

/// Size charged for a two-character key and a 100-character string value
fn sized_entry_bytes() -> usize {
    4 + 102 + ENTRY_OVERHEAD_BYTES
}

fn payload() -> String {
    "x".repeat(100)
}

#[tokio::test(start_paused = true)]
async fn test_set_and_get() {
    let cache = CacheStore::create(test_config());

    cache.set("newtonsoft", "13.0.3".to_string(), None);

    assert_eq!(cache.get("newtonsoft"), Some("13.0.3".to_string()));
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("missing"), None);
}

#[tokio::test(start_paused = true)]
async fn test_entry_expires_after_ttl() {
    let cache = CacheStore::create(test_config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(1000)));

    advance(Duration::from_millis(999)).await;
    assert!(cache.has("k"));

    advance(Duration::from_millis(1)).await;
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty());
    assert_eq!(cache.stats().expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_read_extends_freshness() {
    let cache = CacheStore::create(test_config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(1000)));

    advance(Duration::from_millis(900)).await;
    assert_eq!(cache.get("k"), Some("v".to_string()));

    // 1800ms since the write, 900ms since the last read
    advance(Duration::from_millis(900)).await;
    assert_eq!(cache.get("k"), Some("v".to_string()));

    advance(Duration::from_millis(1000)).await;
    assert_eq!(cache.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn test_absolute_expiry_when_reads_do_not_refresh() {
    let cache = CacheStore::create(test_config().with_refresh_on_read(false));
    cache.set("k", "v".to_string(), Some(Duration::from_millis(1000)));

    advance(Duration::from_millis(900)).await;
    assert_eq!(cache.get("k"), Some("v".to_string()));

    advance(Duration::from_millis(900)).await;
    assert_eq!(cache.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn test_has_does_not_refresh() {
    let cache = CacheStore::create(test_config());
    cache.set("k", "v".to_string(), Some(Duration::from_millis(1000)));

    advance(Duration::from_millis(900)).await;
    assert!(cache.has("k"));

    advance(Duration::from_millis(200)).await;
    assert!(!cache.has("k"));
    assert_eq!(cache.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_size_bounded_eviction_keeps_recently_used() {
    let budget = sized_entry_bytes() * 2;
    let cache = CacheStore::create(test_config().with_max_bytes(budget));

    cache.set("k1", payload(), None);
    advance(Duration::from_millis(1)).await;
    cache.set("k2", payload(), None);
    advance(Duration::from_millis(1)).await;

    // Reading k1 makes k2 the least recently used entry
    assert!(cache.get("k1").is_some());
    advance(Duration::from_millis(1)).await;

    cache.set("k3", payload(), None);

    assert_eq!(cache.len(), 2);
    assert!(cache.has("k1"));
    assert!(!cache.has("k2"));
    assert!(cache.has("k3"));
    assert!(cache.total_bytes() <= budget);
    assert_eq!(cache.stats().evictions, 1);
}

#[tokio::test(start_paused = true)]
async fn test_total_size_stays_within_budget() {
    let budget = sized_entry_bytes() * 3;
    let cache = CacheStore::create(test_config().with_max_bytes(budget));

    for i in 0..10 {
        cache.set(format!("k{}", i), payload(), None);
        advance(Duration::from_millis(1)).await;
        assert!(cache.total_bytes() <= budget);
    }

    assert_eq!(cache.len(), 3);
    // The most recent writes survive
    assert!(cache.has("k9"));
    assert!(cache.has("k8"));
    assert!(cache.has("k7"));
}

#[tokio::test(start_paused = true)]
async fn test_eviction_order_without_clock_movement() {
    let budget = sized_entry_bytes() * 3;
    let cache = CacheStore::create(test_config().with_max_bytes(budget));

    // All writes and the read share one instant; order alone decides
    cache.set("k1", payload(), None);
    cache.set("k2", payload(), None);
    cache.set("k3", payload(), None);
    assert!(cache.get("k1").is_some());

    cache.set("k4", payload(), None);
    assert!(!cache.has("k2"));

    cache.set("k5", payload(), None);
    assert!(!cache.has("k3"));
    assert!(cache.has("k1"));
    assert!(cache.has("k4"));
    assert!(cache.has("k5"));
    assert_eq!(cache.stats().evictions, 2);
}

#[tokio::test(start_paused = true)]
async fn test_recency_index_tracks_entries() {
    let cache = CacheStore::create(test_config());
    let index_len = |cache: &CacheStore<String>| cache.shared.state.lock().recency.len();

    cache.set("a", payload(), Some(Duration::from_millis(10)));
    cache.set("b", payload(), None);
    cache.set("b", payload(), None);
    cache.set("c", payload(), None);
    assert!(cache.get("c").is_some());
    assert_eq!(index_len(&cache), 3);

    cache.delete("c");
    assert_eq!(index_len(&cache), 2);

    advance(Duration::from_millis(10)).await;
    assert_eq!(cache.sweep_expired(), 1);
    assert_eq!(index_len(&cache), 1);

    cache.clear();
    assert_eq!(index_len(&cache), 0);
    assert_eq!(cache.total_bytes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_replacing_key_releases_old_size() {
    let cache = CacheStore::create(test_config());

    cache.set("k", "a".repeat(500), None);
    cache.set("k", "b".to_string(), None);

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.total_bytes(), 3 + 3 + ENTRY_OVERHEAD_BYTES);
    assert_eq!(cache.get("k"), Some("b".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_oversized_entry_is_still_stored() {
    let cache = CacheStore::create(test_config().with_max_bytes(200));

    cache.set("small", "s".to_string(), None);
    cache.set("huge", "h".repeat(1_000), None);

    assert_eq!(cache.len(), 1);
    assert!(!cache.has("small"));
    assert!(cache.has("huge"));
    assert!(cache.total_bytes() > 200);
}

#[tokio::test(start_paused = true)]
async fn test_delete_and_clear() {
    let cache = CacheStore::create(test_config());
    cache.set("a", "1".to_string(), None);
    cache.set("b", "2".to_string(), None);

    assert!(cache.delete("a"));
    assert!(!cache.delete("a"));
    assert_eq!(cache.len(), 1);

    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.total_bytes(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_sweep_expired() {
    let cache = CacheStore::create(test_config());
    cache.set("short", "1".to_string(), Some(Duration::from_millis(10)));
    cache.set("long", "2".to_string(), Some(Duration::from_secs(10)));

    advance(Duration::from_millis(50)).await;

    assert_eq!(cache.sweep_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.has("long"));
    assert_eq!(cache.total_bytes(), 6 + 3 + ENTRY_OVERHEAD_BYTES);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_removes_unread_entries() {
    let config = test_config().with_sweep_interval(Duration::from_millis(100));
    let cache = CacheStore::create(config);
    assert!(cache.is_sweeping());

    cache.set("stale", "1".to_string(), Some(Duration::from_millis(50)));

    // Let the sweep tick run without reading the entry
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats().expirations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_destroy_is_idempotent() {
    let config = test_config().with_sweep_interval(Duration::from_millis(100));
    let cache = CacheStore::create(config);
    cache.set("k", "v".to_string(), None);

    cache.destroy();
    assert!(cache.is_empty());
    assert!(!cache.is_sweeping());

    cache.destroy();
    assert!(cache.is_empty());
}

#[test]
fn test_create_outside_runtime_disables_sweep() {
    let cache: CacheStore<String> =
        CacheStore::create(CacheConfig::default().with_sweep_interval(Duration::from_secs(1)));

    assert!(!cache.is_sweeping());
    cache.set("k", "v".to_string(), None);
    assert_eq!(cache.get("k"), Some("v".to_string()));
}

#[tokio::test(start_paused = true)]
async fn test_stats_track_hits_and_misses() {
    let cache = CacheStore::create(test_config());
    cache.set("k", "v".to_string(), None);

    cache.get("k");
    cache.get("k");
    cache.get("nope");

    let stats = cache.stats();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.entries, 1);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_budget_holds_unless_single_entry(
            writes in proptest::collection::vec((0usize..8, 0usize..400), 1..40)
        ) {
            let budget = 600;
            let cache: CacheStore<String> = CacheStore::create(
                CacheConfig::default()
                    .with_max_bytes(budget)
                    .with_sweep_interval(Duration::ZERO),
            );

            for (key, len) in writes {
                cache.set(format!("key-{}", key), "v".repeat(len), None);
                prop_assert!(cache.total_bytes() <= budget || cache.len() == 1);
            }
        }
    }
}
