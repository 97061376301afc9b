//! Cache Module
//!
//! Versioned read-through cache used in front of form list queries.

mod backend;
mod entry;
mod manager;
mod stats;
mod store;
mod version;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::CacheBackend;
pub use entry::{current_timestamp_ms, CacheEntry};
pub use manager::{CacheManager, CacheOptions, CachedValue};
pub use stats::CacheStats;
pub use store::TimedStore;
pub use version::{VersionRecord, VersionTracker};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
