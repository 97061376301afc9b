//! Version Tracker Module
//!
//! Per-key version counters and last-write timestamps. Records live
//! independently of cached values and survive entry expiry until a flush.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;


// == Version Record ==
/// Version and last-write instant for a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    /// Number of writes and invalidations seen for the key
    pub version: u64,
    /// Instant of the most recent write or invalidation
    pub timestamp: DateTime<Utc>,
}

impl VersionRecord {
    /// Placeholder reported for cache hits that have no version history.
    pub fn synthetic() -> Self {
        Self {
            version: 1,
            timestamp: Utc::now(),
        }
    }

    /// Milliseconds elapsed between the last write and `now`.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.timestamp).num_milliseconds()
    }

    /// True when strictly more than `max_age` has elapsed since the last write.
    pub fn is_stale_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        self.age_ms(now) > max_age_ms
    }
}

// == Version Tracker ==
#[derive(Debug, Default)]
pub struct VersionTracker {
    records: Mutex<HashMap<String, VersionRecord>>,
}

impl VersionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, VersionRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // == Bump ==
    /// Increments the version for `key` (starting from 0) and stamps it with now.
    pub fn bump(&self, key: &str) -> VersionRecord {
        let mut records = self.lock();
        let version = records.get(key).map_or(0, |record| record.version) + 1;
        let record = VersionRecord {
            version,
            timestamp: Utc::now(),
        };
        records.insert(key.to_string(), record);
        record
    }

    pub fn get(&self, key: &str) -> Option<VersionRecord> {
        self.lock().get(key).copied()
    }

    /// Snapshot of every record.
    pub fn get_all(&self) -> HashMap<String, VersionRecord> {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;

    #[test]
    fn test_bump_starts_at_one() {
        let tracker = VersionTracker::new();

        assert!(tracker.get("k").is_none());
        assert_eq!(tracker.bump("k").version, 1);
        assert_eq!(tracker.bump("k").version, 2);
        assert_eq!(tracker.get("k").unwrap().version, 2);
    }

    #[test]
    fn test_bump_refreshes_timestamp() {
        let tracker = VersionTracker::new();

        let first = tracker.bump("k");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = tracker.bump("k");

        assert!(second.timestamp > first.timestamp);
    }

    #[test]
    fn test_keys_are_independent() {
        let tracker = VersionTracker::new();

        tracker.bump("a");
        tracker.bump("a");
        tracker.bump("b");

        let all = tracker.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"].version, 2);
        assert_eq!(all["b"].version, 1);
    }

    #[test]
    fn test_clear_resets_versions() {
        let tracker = VersionTracker::new();

        tracker.bump("a");
        tracker.clear();

        assert!(tracker.get_all().is_empty());
        assert_eq!(tracker.bump("a").version, 1);
    }

    #[test]
    fn test_staleness_boundary() {
        let written = Utc::now();
        let record = VersionRecord {
            version: 1,
            timestamp: written,
        };
        let max_age = Duration::from_millis(30_000);

        assert!(!record.is_stale_at(written + ChronoDuration::milliseconds(29_999), max_age));
        assert!(!record.is_stale_at(written + ChronoDuration::milliseconds(30_000), max_age));
        assert!(record.is_stale_at(written + ChronoDuration::milliseconds(30_001), max_age));
    }

    #[test]
    fn test_synthetic_record() {
        let record = VersionRecord::synthetic();
        assert_eq!(record.version, 1);
        assert!(record.age_ms(Utc::now()) >= 0);
    }
}
