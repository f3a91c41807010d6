//! Application configuration loaded from environment variables.

use std::time::Duration;

use cache::CacheConfig;
use domain::CacheWritePolicy;

use crate::error::ConfigError;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default `0.0.0.0`)
/// - `PORT`: listen port (default `3000`)
/// - `RUST_LOG`: tracing filter directive (default `info`)
/// - `DATABASE_URL`: PostgreSQL URL; unset selects the in-memory store
/// - `CACHE_PREFIX`: prefix of every cache key (default `farm`)
/// - `CACHE_TTL_SECS`: default cache entry lifetime (default `3600`)
/// - `CACHE_WRITE_POLICY`: `best_effort` (default) or `strict`
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub cache: CacheConfig,
    pub cache_write_policy: CacheWritePolicy,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration from any variable lookup, falling back to defaults
    /// for unset variables. Set but malformed values are rejected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", format!("{raw:?} is not a port")))?,
            None => defaults.port,
        };

        let default_ttl = match lookup("CACHE_TTL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::invalid(
                        "CACHE_TTL_SECS",
                        "must be at least 1 second",
                    ));
                }
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    return Err(ConfigError::invalid(
                        "CACHE_TTL_SECS",
                        format!("{raw:?} is not a number of seconds"),
                    ));
                }
            },
            None => defaults.cache.default_ttl,
        };

        let cache_write_policy = match lookup("CACHE_WRITE_POLICY") {
            Some(raw) => raw
                .parse()
                .map_err(|message: String| ConfigError::invalid("CACHE_WRITE_POLICY", message))?,
            None => defaults.cache_write_policy,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
            cache: CacheConfig::new(
                lookup("CACHE_PREFIX").unwrap_or(defaults.cache.prefix),
                default_ttl,
            ),
            cache_write_policy,
        })
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            cache: CacheConfig::default(),
            cache_write_policy: CacheWritePolicy::default(),
        }
    }
}
