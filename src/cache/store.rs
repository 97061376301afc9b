//! Timed Store Module
//!
//! In-memory key/value storage with per-key TTL, lazy expiration on access
//! and a sweep entry point for the background cleanup task.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cache::{CacheBackend, CacheEntry, CacheStats, MAX_KEY_LENGTH};
use crate::error::CacheError;

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    stats: CacheStats,
}

// == Timed Store ==
/// Mutex-guarded cache storage shared by request handlers and the sweeper.
#[derive(Debug)]
pub struct TimedStore<V> {
    inner: Mutex<Inner<V>>,
    /// Default TTL in seconds for entries without explicit TTL (0 = never)
    default_ttl: u64,
    /// Maximum number of live keys, None = unbounded
    max_keys: Option<usize>,
}

impl<V> TimedStore<V> {
    // == Constructor ==
    /// Creates an unbounded store with the given default TTL in seconds.
    pub fn new(default_ttl: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            default_ttl,
            max_keys: None,
        }
    }

    /// Caps the number of live keys. New keys beyond the cap are rejected.
    pub fn with_max_keys(mut self, max_keys: Option<usize>) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn default_ttl(&self) -> u64 {
        self.default_ttl
    }

    /// A panic while the lock is held leaves whole entries behind, never a
    /// half-written one, so a poisoned guard is recovered rather than failed.
    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn validate_key(key: &str) -> Result<(), CacheError> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        Ok(())
    }

    // == Length ==
    /// Returns the number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone + Send> CacheBackend<V> for TimedStore<V> {
    // == Set ==
    fn set(&self, key: &str, value: V, ttl: Option<u64>) -> Result<(), CacheError> {
        Self::validate_key(key)?;
        let entry = CacheEntry::new(value, ttl.unwrap_or(self.default_ttl));

        let mut inner = self.lock();

        if let Some(max_keys) = self.max_keys {
            let is_overwrite = inner.entries.contains_key(key);
            if !is_overwrite && inner.entries.len() >= max_keys {
                return Err(CacheError::CacheFull(format!(
                    "cache holds the maximum of {} keys",
                    max_keys
                )));
            }
        }

        inner.entries.insert(key.to_string(), entry);
        Ok(())
    }

    // == Get ==
    fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let mut guard = self.lock();
        let inner = &mut *guard;

        match inner.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                inner.stats.record_lookup(true);
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {
                inner.entries.remove(key);
                inner.stats.record_expirations(1);
            }
            None => {}
        }

        inner.stats.record_lookup(false);
        Ok(None)
    }

    // == Delete ==
    fn delete(&self, key: &str) -> Result<usize, CacheError> {
        let mut inner = self.lock();
        Ok(usize::from(inner.entries.remove(key).is_some()))
    }

    // == Flush ==
    fn flush_all(&self) -> Result<(), CacheError> {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.stats = CacheStats::default();
        Ok(())
    }

    // == Cleanup Expired ==
    fn cleanup_expired(&self) -> Result<usize, CacheError> {
        let mut inner = self.lock();

        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired());
        let removed = before - inner.entries.len();

        inner.stats.record_expirations(removed);
        Ok(removed)
    }

    // == Stats ==
    fn stats(&self) -> Result<CacheStats, CacheError> {
        let inner = self.lock();
        Ok(inner.stats.snapshot(inner.entries.len()))
    }
}
