//! Size-bounded TTL cache with LRU eviction
//!
//! All mutation of the entry map happens inside one synchronous critical
//! section per call. The lock is never held across an `.await`, so the sweep
//! task and concurrent requests always observe a self-consistent map.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::config::CacheConfig;
use crate::entry::{estimate_size, CacheEntry};

/// In-memory cache with per-entry TTL, byte budget and LRU eviction
pub struct CacheStore<V> {
    shared: Arc<Shared<V>>,
    /// Background expiry sweep, taken on `destroy`
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

struct Shared<V> {
    config: CacheConfig,
    state: Mutex<State<V>>,
}

struct State<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Keys ordered from least to most recently written or refreshed
    recency: BTreeMap<(Instant, u64), String>,
    next_seq: u64,
    total_bytes: usize,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries (fresh or not yet swept)
    pub entries: usize,
    /// Estimated size of all entries
    pub total_bytes: usize,
    pub max_bytes: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed to make room
    pub evictions: u64,
    /// Entries removed because their TTL ran out
    pub expirations: u64,
}

impl<V> CacheStore<V>
where
    V: Clone + Serialize + Send + 'static,
{
    /// Create a store and start its expiry sweep.
    ///
    /// The sweep needs a Tokio runtime; outside one the store still works but
    /// expired entries are only purged lazily on access.
    pub fn create(config: CacheConfig) -> Self {
        info!(
            "Creating cache (max {} bytes, default ttl {:?}, sweep every {:?})",
            config.max_bytes, config.default_ttl, config.sweep_interval
        );

        let shared = Arc::new(Shared {
            config,
            state: Mutex::new(State {
                entries: HashMap::new(),
                recency: BTreeMap::new(),
                next_seq: 0,
                total_bytes: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
                expirations: 0,
            }),
        });
        let sweeper = spawn_sweeper(&shared);

        Self {
            shared,
            sweeper: Mutex::new(sweeper),
        }
    }

    /// Store a value, evicting least recently used entries until it fits.
    ///
    /// A value larger than the whole budget is still stored once everything
    /// else has been evicted.
    pub fn set(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let size = estimate_size(&key, &value);
        let ttl = ttl.unwrap_or(self.shared.config.default_ttl);
        let max_bytes = self.shared.config.max_bytes;
        let now = Instant::now();

        let mut state = self.shared.state.lock();

        state.remove(&key);

        while state.total_bytes + size > max_bytes && !state.entries.is_empty() {
            state.evict_least_recently_used();
        }

        if size > max_bytes {
            debug!(
                "Cache entry '{}' ({} bytes) exceeds the {} byte budget on its own",
                key, size, max_bytes
            );
        }

        trace!("Cache set: {} ({} bytes, ttl {:?})", key, size, ttl);
        state.insert(key, CacheEntry::new(value, ttl, size, now));
    }

    /// Get a fresh value. Expired entries are removed and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let refresh = self.shared.config.refresh_on_read;
        let mut state = self.shared.state.lock();

        let fresh = match state.entries.get(key) {
            Some(entry) => entry.is_fresh_at(now),
            None => {
                state.misses += 1;
                trace!("Cache miss: {}", key);
                return None;
            },
        };

        if !fresh {
            state.remove(key);
            state.expirations += 1;
            state.misses += 1;
            debug!("Cache entry expired: {}", key);
            return None;
        }

        state.hits += 1;
        if refresh {
            state.touch(key, now);
        }
        trace!("Cache hit: {}", key);
        state.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Check for a fresh entry without refreshing it
    pub fn has(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut state = self.shared.state.lock();

        match state.entries.get(key).map(|entry| entry.is_fresh_at(now)) {
            Some(true) => true,
            Some(false) => {
                state.remove(key);
                state.expirations += 1;
                false
            },
            None => false,
        }
    }

    /// Remove an entry, returning whether one was present
    pub fn delete(&self, key: &str) -> bool {
        self.shared.state.lock().remove(key).is_some()
    }

    /// Clear all cached entries
    pub fn clear(&self) {
        let mut state = self.shared.state.lock();
        let count = state.entries.len();
        state.entries.clear();
        state.recency.clear();
        state.total_bytes = 0;
        debug!("Cleared {} entries from cache", count);
    }

    /// Remove every expired entry, returning how many were removed
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep(Instant::now())
    }

    /// Stop the background sweep and drop all entries. Safe to call repeatedly.
    pub fn destroy(&self) {
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
            info!("Cache sweep stopped");
        }
        self.clear();
    }

    /// Whether the background sweep is running
    pub fn is_sweeping(&self) -> bool {
        self.sweeper.lock().as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Estimated size of everything currently stored
    pub fn total_bytes(&self) -> usize {
        self.shared.state.lock().total_bytes
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock();
        CacheStats {
            entries: state.entries.len(),
            total_bytes: state.total_bytes,
            max_bytes: self.shared.config.max_bytes,
            hits: state.hits,
            misses: state.misses,
            evictions: state.evictions,
            expirations: state.expirations,
        }
    }
}

impl<V> Drop for CacheStore<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.sweeper.get_mut().take() {
            handle.abort();
        }
    }
}

impl<V> Shared<V> {
    fn sweep(&self, now: Instant) -> usize {
        let mut state = self.state.lock();
        let expired: Vec<String> = state
            .entries
            .iter()
            .filter(|(_, entry)| !entry.is_fresh_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            state.remove(key);
        }
        state.expirations += expired.len() as u64;
        expired.len()
    }
}

impl<V> State<V> {
    fn insert(&mut self, key: String, mut entry: CacheEntry<V>) {
        entry.seq = self.bump_seq();
        self.recency.insert(entry.recency_key(), key.clone());
        self.total_bytes += entry.size;
        self.entries.insert(key, entry);
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.recency_key());
        self.total_bytes = self.total_bytes.saturating_sub(entry.size);
        Some(entry)
    }

    /// Restart an entry's TTL and move it to the most recent end
    fn touch(&mut self, key: &str, now: Instant) {
        let seq = self.bump_seq();
        let Some(entry) = self.entries.get_mut(key) else {
            return;
        };
        self.recency.remove(&entry.recency_key());
        entry.touch(now);
        entry.seq = seq;
        self.recency.insert(entry.recency_key(), key.to_string());
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Evict the entry with the oldest `stored_at`; ties go to the one written or read first
    fn evict_least_recently_used(&mut self) {
        let Some((_, key)) = self.recency.pop_first() else {
            return;
        };
        if let Some(entry) = self.entries.remove(&key) {
            self.total_bytes = self.total_bytes.saturating_sub(entry.size);
            self.evictions += 1;
            debug!("Evicted cache entry '{}' ({} bytes)", key, entry.size);
        }
    }
}

fn spawn_sweeper<V>(shared: &Arc<Shared<V>>) -> Option<JoinHandle<()>>
where
    V: Send + 'static,
{
    let period = shared.config.sweep_interval;
    if period.is_zero() {
        return None;
    }
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        debug!("No Tokio runtime; cache sweep disabled");
        return None;
    };

    let weak: Weak<Shared<V>> = Arc::downgrade(shared);
    Some(runtime.spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let Some(shared) = weak.upgrade() else {
                break;
            };
            let removed = shared.sweep(Instant::now());
            if removed > 0 {
                debug!("Cache sweep removed {} expired entries", removed);
            }
        }
    }))
}

#[cfg(test)]
mod tests;
