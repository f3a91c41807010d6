//! Cache namespacing and TTL defaults.

use std::time::Duration;

/// Default key prefix.
pub const DEFAULT_PREFIX: &str = "farm";

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Settings shared by every typed cache built on a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Prefix placed before every key.
    pub prefix: String,

    /// TTL applied when a write does not supply one.
    pub default_ttl: Duration,
}

impl CacheConfig {
    pub fn new(prefix: impl Into<String>, default_ttl: Duration) -> Self {
        Self {
            prefix: prefix.into(),
            default_ttl,
        }
    }

    /// Returns the namespace for one aggregate type, e.g. `farm:Plot`.
    pub fn namespace(&self, kind: &str) -> String {
        format!("{}:{}", self.prefix, kind)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            default_ttl: DEFAULT_TTL,
        }
    }
}
