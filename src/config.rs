//! Configuration Module
//!
//! Handles loading and managing cache and server configuration from
//! environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::MAX_VALUE_SIZE;

/// Default lifetime, in minutes, of a cached response
pub const DEFAULT_CACHE_MINUTES: u64 = 10;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Minimum cache lifetime in minutes; explicit route TTLs can only raise it
    pub default_minutes: u64,
    /// Maximum number of responses the in-memory store can hold
    pub max_entries: usize,
    /// Largest response body that will be cached
    pub max_body_bytes: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Header reporting hit or miss
    pub status_header: String,
    /// Header carrying the cache key
    pub key_header: String,
    /// Header carrying the expiry time
    pub expire_at_header: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_MINUTES` - Minimum cache lifetime (default: 10)
    /// - `MAX_ENTRIES` - Maximum cached responses (default: 1000)
    /// - `MAX_BODY_BYTES` - Largest cacheable body (default: 1 MiB)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `CACHE_HEADER_STATUS` - default `X-Cache`
    /// - `CACHE_HEADER_KEY` - default `X-Cache-Key`
    /// - `CACHE_HEADER_EXPIRE_AT` - default `X-Cache-ExpireAt`
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_minutes: parse_var("CACHE_DEFAULT_MINUTES")
                .filter(|minutes| *minutes > 0)
                .unwrap_or(defaults.default_minutes),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            max_body_bytes: parse_var("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            status_header: env::var("CACHE_HEADER_STATUS").unwrap_or(defaults.status_header),
            key_header: env::var("CACHE_HEADER_KEY").unwrap_or(defaults.key_header),
            expire_at_header: env::var("CACHE_HEADER_EXPIRE_AT")
                .unwrap_or(defaults.expire_at_header),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_CACHE_MINUTES,
            max_entries: 1000,
            max_body_bytes: MAX_VALUE_SIZE,
            server_port: 3000,
            cleanup_interval: 60,
            status_header: "X-Cache".to_string(),
            key_header: "X-Cache-Key".to_string(),
            expire_at_header: "X-Cache-ExpireAt".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_minutes, 10);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.status_header, "X-Cache");
        assert_eq!(config.key_header, "X-Cache-Key");
        assert_eq!(config.expire_at_header, "X-Cache-ExpireAt");
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment so parallel tests don't race
        env::remove_var("MAX_ENTRIES");
        env::remove_var("SERVER_PORT");
        env::remove_var("MAX_BODY_BYTES");
        env::remove_var("CACHE_HEADER_STATUS");
        env::remove_var("CACHE_HEADER_KEY");
        env::remove_var("CACHE_HEADER_EXPIRE_AT");
        env::set_var("CACHE_DEFAULT_MINUTES", "0");
        env::set_var("CLEANUP_INTERVAL", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.default_minutes, 10);
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.max_entries, 1000);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.status_header, "X-Cache");

        env::set_var("CACHE_DEFAULT_MINUTES", " 25 ");
        env::set_var("CACHE_HEADER_STATUS", "X-Edge-Cache");

        let config = Config::from_env();
        assert_eq!(config.default_minutes, 25);
        assert_eq!(config.status_header, "X-Edge-Cache");

        env::remove_var("CACHE_DEFAULT_MINUTES");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("CACHE_HEADER_STATUS");
    }
}
