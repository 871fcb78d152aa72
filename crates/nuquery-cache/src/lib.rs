//! In-memory response cache for nuquery
//!
//! This crate provides a size-bounded key/value store with per-entry TTL,
//! least-recently-used eviction and a background sweep of expired entries.
//! One store is created per service and injected where it is needed; it has
//! an explicit `create`/`destroy` lifecycle and no persistence.

pub mod config;
pub mod entry;
pub mod store;

// Re-export main types
pub use config::CacheConfig;
pub use entry::{estimate_size, CacheEntry, ENTRY_OVERHEAD_BYTES};
pub use store::{CacheStats, CacheStore};
