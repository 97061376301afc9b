//! Response DTOs for the forms API

use std::collections::HashMap;

use serde::Serialize;

use crate::cache::{CacheStats, VersionRecord};

/// Response body for POST /create
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse<F> {
    pub msg: String,
    pub form: F,
}

impl<F: Serialize> CreatedResponse<F> {
    pub fn new(form: F) -> Self {
        Self {
            msg: "Form created successfully".to_string(),
            form,
        }
    }
}

/// Plain acknowledgement body, also used for errors.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub total_entries: usize,
    /// hits / (hits + misses)
    pub hit_rate: f64,
    /// Background write retries not yet finished
    pub pending_retries: usize,
    /// Version history per key, including keys currently absent
    pub metadata: HashMap<String, VersionRecord>,
}

impl CacheStatsResponse {
    pub fn new(
        stats: CacheStats,
        pending_retries: usize,
        metadata: HashMap<String, VersionRecord>,
    ) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            pending_retries,
            metadata,
        }
    }
}

/// Response body for POST /cache/flush
#[derive(Debug, Clone, Serialize)]
pub struct FlushResponse {
    pub flushed: bool,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
