//! Cache sizing and expiry settings

use std::time::Duration;

/// Configuration for a `CacheStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Budget for the estimated size of all entries
    pub max_bytes: usize,
    /// TTL applied when `set` is called without one
    pub default_ttl: Duration,
    /// Period of the background expiry sweep; zero disables the sweep
    pub sweep_interval: Duration,
    /// When true a successful read restarts the entry's TTL (idle timeout).
    /// When false entries expire a fixed time after they were written.
    pub refresh_on_read: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_bytes: 50 * 1024 * 1024,
            default_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(300),
            refresh_on_read: true,
        }
    }
}

impl CacheConfig {
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    pub fn with_refresh_on_read(mut self, refresh: bool) -> Self {
        self.refresh_on_read = refresh;
        self
    }
}
