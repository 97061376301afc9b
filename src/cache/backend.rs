//! Cache Backend Trait
//!
//! The seam between the cache manager and the timed key/value storage.

use crate::cache::CacheStats;
use crate::error::CacheError;

/// Key/value storage with per-key expiration.
///
/// `TimedStore` is the in-process implementation. All methods are
/// synchronous and must never block on I/O.
pub trait CacheBackend<V>: Send + Sync {
    /// Stores `value` under `key`, replacing any existing entry and its
    /// deadline. `None` uses the backend's default TTL.
    fn set(&self, key: &str, value: V, ttl: Option<u64>) -> Result<(), CacheError>;

    /// Returns the live value for `key`, never one past its deadline.
    fn get(&self, key: &str) -> Result<Option<V>, CacheError>;

    /// Removes `key`, returning how many entries were removed (0 or 1).
    fn delete(&self, key: &str) -> Result<usize, CacheError>;

    /// Removes every entry.
    fn flush_all(&self) -> Result<(), CacheError>;

    /// Removes expired entries, returning how many were dropped.
    fn cleanup_expired(&self) -> Result<usize, CacheError>;

    /// Snapshot of the backend counters.
    fn stats(&self) -> Result<CacheStats, CacheError>;
}
