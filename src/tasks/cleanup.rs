//! Expiry Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheManager;

/// Spawns a background task that sweeps expired entries from `cache` every
/// `check_period_secs` seconds.
///
/// Expired entries are also dropped lazily on read; the sweep bounds how
/// long unread entries keep their memory. Abort the returned handle during
/// graceful shutdown.
///
/// # Example
/// ```ignore
/// let cache = CacheManager::<serde_json::Value>::new(CacheOptions::default());
/// let sweeper = spawn_cleanup_task(cache.clone(), 120);
/// // Later, during shutdown:
/// sweeper.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: CacheManager<V>, check_period_secs: u64) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(check_period_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.sweep_expired();
            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
