//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheOptions;

const DEFAULT_JWT_SECRET: &str = "change-me";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for cache entries; 0 never expires
    pub cache_ttl: u64,
    /// Background sweep interval in seconds
    pub check_period: u64,
    /// Maximum number of live cache keys, unbounded when None
    pub max_keys: Option<usize>,
    /// Age in milliseconds after which list reads refetch
    pub max_age_ms: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_CHECK_PERIOD` - Sweep frequency in seconds (default: 120)
    /// - `CACHE_MAX_KEYS` - Maximum live keys (default: unbounded)
    /// - `CACHE_MAX_AGE_MS` - Staleness window (default: 30000)
    /// - `CACHE_RETRY_ATTEMPTS` - Retry budget for transient write failures (default: 3)
    /// - `CACHE_RETRY_DELAY_MS` - Delay between retries (default: 1000)
    /// - `PORT` - HTTP server port (default: 5000)
    /// - `JWT_SECRET` - Token signing secret (default: "change-me")
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: env_or("CACHE_TTL", defaults.cache_ttl),
            check_period: env_or("CACHE_CHECK_PERIOD", defaults.check_period),
            max_keys: env::var("CACHE_MAX_KEYS")
                .ok()
                .and_then(|v| v.parse().ok()),
            max_age_ms: env_or("CACHE_MAX_AGE_MS", defaults.max_age_ms),
            retry_attempts: env_or("CACHE_RETRY_ATTEMPTS", defaults.retry_attempts),
            retry_delay_ms: env_or("CACHE_RETRY_DELAY_MS", defaults.retry_delay_ms),
            server_port: env_or("PORT", defaults.server_port),
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
        }
    }

    /// Whether the token secret was left at its built-in value.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            default_ttl: self.cache_ttl,
            max_keys: self.max_keys,
            max_age: Duration::from_millis(self.max_age_ms),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_ttl: 3600,
            check_period: 120,
            max_keys: None,
            max_age_ms: 30_000,
            retry_attempts: 3,
            retry_delay_ms: 1000,
            server_port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.cache_ttl, 3600);
        assert_eq!(config.check_period, 120);
        assert_eq!(config.max_keys, None);
        assert_eq!(config.max_age_ms, 30_000);
        assert_eq!(config.server_port, 5000);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn test_cache_options_mirror_defaults() {
        let options = Config::default().cache_options();
        let expected = CacheOptions::default();

        assert_eq!(options.default_ttl, expected.default_ttl);
        assert_eq!(options.max_keys, expected.max_keys);
        assert_eq!(options.max_age, expected.max_age);
        assert_eq!(options.retry_attempts, expected.retry_attempts);
        assert_eq!(options.retry_delay, expected.retry_delay);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("CACHE_MAX_KEYS", "50");
        env::set_var("CACHE_RETRY_DELAY_MS", "not-a-number");
        env::set_var("JWT_SECRET", "s3cret");

        let config = Config::from_env();
        assert_eq!(config.max_keys, Some(50));
        assert_eq!(config.retry_delay_ms, 1000);
        assert!(!config.uses_default_secret());

        env::remove_var("CACHE_MAX_KEYS");
        env::remove_var("CACHE_RETRY_DELAY_MS");
        env::remove_var("JWT_SECRET");
    }
}
