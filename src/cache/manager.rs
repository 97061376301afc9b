//! Cache Manager Module
//!
//! The single entry point handlers use to talk to the cache. Composes a
//! `CacheBackend` with a `VersionTracker` and adds staleness checks, forced
//! refresh and best-effort retries for transient write failures.
//!
//! Every operation except `refresh_cache` swallows cache failures: they are
//! logged and turned into `None`, `false` or `0` so a cache malfunction never
//! fails the request that triggered it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::cache::{CacheBackend, CacheStats, TimedStore, VersionRecord, VersionTracker};

// == Options ==
/// Tunables for a `CacheManager`.
#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Default TTL in seconds for entries written without one (0 = never)
    pub default_ttl: u64,
    /// Maximum number of live keys, None = unbounded
    pub max_keys: Option<usize>,
    /// Age after which `is_stale` reports a key as stale
    pub max_age: Duration,
    /// Retry budget for transient write failures
    pub retry_attempts: u32,
    /// Fixed delay before each retry
    pub retry_delay: Duration,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            default_ttl: 3600,
            max_keys: None,
            max_age: Duration::from_millis(30_000),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

// == Cached Value ==
/// A cache hit: the stored data plus its version metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CachedValue<V> {
    pub data: V,
    pub metadata: VersionRecord,
}

struct Inner<V> {
    backend: Arc<dyn CacheBackend<V>>,
    versions: VersionTracker,
    options: CacheOptions,
    retries: Mutex<JoinSet<()>>,
    /// Bumped by every `abort_retries` call
    retry_aborts: AtomicU64,
    /// Wakes drains that hold a taken retry set
    retry_abort_signal: Notify,
}

// == Cache Manager ==
/// Cloneable handle to a cache instance. Clones share the same state.
pub struct CacheManager<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for CacheManager<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> CacheManager<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Creates a manager backed by an in-memory `TimedStore`.
    pub fn new(options: CacheOptions) -> Self {
        let store = TimedStore::<V>::new(options.default_ttl).with_max_keys(options.max_keys);
        Self::with_backend(Arc::new(store), options)
    }

    /// Creates a manager over an arbitrary backend.
    pub fn with_backend(backend: Arc<dyn CacheBackend<V>>, options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                versions: VersionTracker::new(),
                options,
                retries: Mutex::new(JoinSet::new()),
                retry_aborts: AtomicU64::new(0),
                retry_abort_signal: Notify::new(),
            }),
        }
    }

    pub fn options(&self) -> &CacheOptions {
        &self.inner.options
    }

    // == Get ==
    /// Returns the live value for `key` with its version metadata.
    pub fn get_cache(&self, key: &str) -> Option<CachedValue<V>> {
        let data = match self.inner.backend.get(key) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(err) => {
                error!("Cache get error for key '{}': {}", key, err);
                return None;
            }
        };

        // Known inconsistency: a hit without version history reports a
        // fabricated version 1. Callers rely on metadata always being present.
        let metadata = self
            .inner
            .versions
            .get(key)
            .unwrap_or_else(VersionRecord::synthetic);

        Some(CachedValue { data, metadata })
    }

    // == Set ==
    /// Stores `data` under `key`, bumping its version first.
    ///
    /// Transient backend failures schedule up to `retry_attempts` deferred
    /// retries whose outcome the caller never sees.
    pub fn set_cache(&self, key: &str, data: V, ttl: Option<u64>) -> bool {
        self.write_with_retries(key, data, ttl, self.inner.options.retry_attempts)
    }

    fn write_with_retries(&self, key: &str, data: V, ttl: Option<u64>, retries: u32) -> bool {
        let record = self.inner.versions.bump(key);

        let retry_copy = (retries > 0).then(|| data.clone());

        match self.inner.backend.set(key, data, ttl) {
            Ok(()) => {
                info!("Cache updated for '{}', version: {}", key, record.version);
                true
            }
            Err(err) if err.is_transient() => {
                error!("Transient cache error while caching '{}': {}", key, err);
                if let Some(data) = retry_copy {
                    warn!(
                        "Retrying cache operation for '{}', {} attempts remaining...",
                        key, retries
                    );
                    self.schedule_retry(key.to_string(), data, ttl, retries - 1);
                }
                false
            }
            Err(err) => {
                error!("Cache set error for key '{}': {}", key, err);
                false
            }
        }
    }

    fn schedule_retry(&self, key: String, data: V, ttl: Option<u64>, retries: u32) {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, dropping cache retry for '{}'", key);
            return;
        };

        let mut tasks = match self.inner.retries.lock() {
            Ok(tasks) => tasks,
            Err(_) => {
                error!("Retry queue lock poisoned, dropping cache retry for '{}'", key);
                return;
            }
        };

        // Reap finished retries so the set does not grow unbounded.
        while tasks.try_join_next().is_some() {}

        let manager = self.clone();
        let delay = self.inner.options.retry_delay;
        tasks.spawn_on(
            async move {
                tokio::time::sleep(delay).await;
                manager.write_with_retries(&key, data, ttl, retries);
            },
            &runtime,
        );
    }

    // == Delete ==
    /// Invalidates `key`: bumps its version and removes any live entry.
    pub fn delete_cache(&self, key: &str) -> usize {
        self.inner.versions.bump(key);

        match self.inner.backend.delete(key) {
            Ok(removed) => {
                info!("Cache invalidated for '{}'", key);
                removed
            }
            Err(err) => {
                error!("Cache delete error for key '{}': {}", key, err);
                0
            }
        }
    }

    // == Staleness ==
    /// Staleness check against the configured `max_age`.
    pub fn is_stale(&self, key: &str) -> bool {
        self.is_stale_after(key, self.inner.options.max_age)
    }

    /// True if `key` has no version history or was last written more than
    /// `max_age` ago.
    pub fn is_stale_after(&self, key: &str, max_age: Duration) -> bool {
        match self.inner.versions.get(key) {
            Some(record) => record.is_stale_at(Utc::now(), max_age),
            None => true,
        }
    }

    // == Refresh ==
    /// Fetches fresh data unconditionally, caches it and returns it.
    ///
    /// Errors from `fetch` are returned to the caller and leave the current
    /// entry for `key` untouched.
    pub async fn refresh_cache<F, Fut, E>(
        &self,
        key: &str,
        fetch: F,
        ttl: Option<u64>,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        info!("Forcibly refreshing cache for '{}'", key);
        match fetch().await {
            Ok(fresh) => {
                self.set_cache(key, fresh.clone(), ttl);
                Ok(fresh)
            }
            Err(err) => {
                error!("Error refreshing cache for '{}': {}", key, err);
                Err(err)
            }
        }
    }

    // == Flush ==
    /// Clears version history and every entry. Not atomic across the two.
    pub fn flush_cache(&self) -> bool {
        self.inner.versions.clear();

        match self.inner.backend.flush_all() {
            Ok(()) => {
                info!("Cache flushed");
                true
            }
            Err(err) => {
                error!("Cache flush error: {}", err);
                false
            }
        }
    }

    // == Metadata ==
    pub fn metadata(&self, key: &str) -> Option<VersionRecord> {
        self.inner.versions.get(key)
    }

    /// Snapshot of the version records of every key ever written.
    pub fn all_metadata(&self) -> HashMap<String, VersionRecord> {
        self.inner.versions.get_all()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        self.inner.backend.stats().unwrap_or_else(|err| {
            error!("Cache stats error: {}", err);
            CacheStats::default()
        })
    }

    // == Sweep ==
    /// Drops expired entries. Called by the background cleanup task.
    pub fn sweep_expired(&self) -> usize {
        match self.inner.backend.cleanup_expired() {
            Ok(removed) => removed,
            Err(err) => {
                error!("Cache sweep error: {}", err);
                0
            }
        }
    }

    // == Retry Queue ==
    /// Number of retries scheduled and not yet joined.
    pub fn pending_retries(&self) -> usize {
        self.inner.retries.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }

    /// Waits for every scheduled retry, including retries scheduled by
    /// retries, to finish.
    ///
    /// An `abort_retries` call made while the drain is waiting cancels the
    /// retries it is holding as well.
    pub async fn drain_retries(&self) {
        let epoch = self.inner.retry_aborts.load(Ordering::SeqCst);
        loop {
            let mut tasks = self.take_retries();
            if tasks.is_empty() {
                return;
            }
            loop {
                let aborted = self.inner.retry_abort_signal.notified();
                tokio::pin!(aborted);
                aborted.as_mut().enable();
                if self.inner.retry_aborts.load(Ordering::SeqCst) != epoch {
                    tasks.abort_all();
                }

                tokio::select! {
                    joined = tasks.join_next() => match joined {
                        Some(result) => log_retry_outcome(result),
                        None => break,
                    },
                    _ = &mut aborted => {}
                }
            }
        }
    }

    /// Cancels every scheduled retry, including retries held by a drain in
    /// progress.
    pub fn abort_retries(&self) {
        self.inner.retry_aborts.fetch_add(1, Ordering::SeqCst);
        self.inner.retry_abort_signal.notify_waiters();

        if let Ok(mut tasks) = self.inner.retries.lock() {
            let pending = tasks.len();
            tasks.abort_all();
            debug!("Aborted {} pending cache retries", pending);
        }
    }

    fn take_retries(&self) -> JoinSet<()> {
        match self.inner.retries.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => JoinSet::new(),
        }
    }
}

fn log_retry_outcome(result: Result<(), JoinError>) {
    if let Err(err) = result {
        if err.is_panic() {
            error!("Cache retry task panicked: {}", err);
        }
    }
}
