//! Cache entries and size estimation

use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::warn;

/// Fixed bookkeeping cost charged to every entry
pub const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Cache entry with TTL
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value
    pub value: V,
    /// Last write, or last read when reads refresh entries
    pub stored_at: Instant,
    /// Time-to-live measured from `stored_at`
    pub ttl: Duration,
    /// Estimated footprint charged against the byte budget
    pub size: usize,
    /// Tie-breaker for entries sharing a `stored_at`, assigned by the store
    pub(crate) seq: u64,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration, size: usize, now: Instant) -> Self {
        Self {
            value,
            stored_at: now,
            ttl,
            size,
            seq: 0,
        }
    }

    /// Check if the entry is still fresh at `now`
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        self.age_at(now) < self.ttl
    }

    /// Time since the entry was stored or last refreshed
    pub fn age_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    /// Position in the store's recency order; smaller is older
    pub(crate) fn recency_key(&self) -> (Instant, u64) {
        (self.stored_at, self.seq)
    }

    /// Restart the TTL clock
    pub fn touch(&mut self, now: Instant) {
        self.stored_at = now;
    }
}

/// Estimated footprint of an entry: serialized key + serialized value + overhead.
///
/// Values that fail to serialize are charged the overhead only.
pub fn estimate_size<V: Serialize + ?Sized>(key: &str, value: &V) -> usize {
    let key_bytes = serde_json::to_vec(key).map(|v| v.len()).unwrap_or(key.len());
    let value_bytes = match serde_json::to_vec(value) {
        Ok(bytes) => bytes.len(),
        Err(e) => {
            warn!("Could not serialize cache value for '{}' to size it: {}", key, e);
            0
        },
    };
    key_bytes + value_bytes + ENTRY_OVERHEAD_BYTES
}
