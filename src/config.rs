//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::DEFAULT_TTL;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for cached responses
    pub default_ttl_ms: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the upstream REST backend
    pub upstream_url: String,
    /// Upstream request timeout in milliseconds
    pub upstream_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `UPSTREAM_URL` - Upstream API base URL (default: http://localhost:8080)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream request timeout (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            cleanup_interval: parse_var::<u64>("CLEANUP_INTERVAL")
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            upstream_url: env::var("UPSTREAM_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.upstream_url),
            upstream_timeout_ms: parse_var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or(defaults.upstream_timeout_ms),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: DEFAULT_TTL.as_millis() as u64,
            cleanup_interval: 60,
            server_port: 3000,
            upstream_url: "http://localhost:8080".to_string(),
            upstream_timeout_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.default_ttl(), DEFAULT_TTL);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(60));
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upstream_url, "http://localhost:8080");
        assert_eq!(config.upstream_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_env() {
        // Single test touches the environment to avoid races between tests
        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("SERVER_PORT");
        env::remove_var("UPSTREAM_URL");
        env::remove_var("UPSTREAM_TIMEOUT_MS");

        let config = Config::from_env();
        assert_eq!(config.default_ttl(), DEFAULT_TTL);
        assert_eq!(config.server_port, 3000);

        env::set_var("DEFAULT_TTL_MS", "1500");
        env::set_var("CLEANUP_INTERVAL", "0");
        env::set_var("SERVER_PORT", "not-a-port");
        env::set_var("UPSTREAM_URL", "http://api.internal:9000");

        let config = Config::from_env();
        assert_eq!(config.default_ttl(), Duration::from_millis(1500));
        assert_eq!(config.cleanup_interval, 60);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.upstream_url, "http://api.internal:9000");

        env::remove_var("DEFAULT_TTL_MS");
        env::remove_var("CLEANUP_INTERVAL");
        env::remove_var("SERVER_PORT");
        env::remove_var("UPSTREAM_URL");
    }
}
