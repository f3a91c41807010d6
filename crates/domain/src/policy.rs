//! What handlers do when the cache misbehaves.

use std::fmt;
use std::str::FromStr;

use cache::CacheError;

use crate::error::DomainError;

/// Reaction to a cache failure once the store is already authoritative.
///
/// The store write is never rolled back. `BestEffort` logs the failure,
/// counts it and carries on, so events still get published; the stale entry
/// lives until it is invalidated or its TTL runs out. `Strict` surfaces the
/// error and skips event publication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheWritePolicy {
    #[default]
    BestEffort,
    Strict,
}

impl CacheWritePolicy {
    /// Applies the policy to a cache write.
    ///
    /// Returns `Ok(None)` when a failure was tolerated.
    pub(crate) fn write<T>(
        self,
        result: Result<T, CacheError>,
        aggregate_type: &'static str,
        operation: &'static str,
    ) -> Result<Option<T>, DomainError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self == CacheWritePolicy::Strict => Err(e.into()),
            Err(e) => {
                tracing::warn!(aggregate_type, operation, error = %e, "cache write failed");
                metrics::counter!("cache_write_failures_total", "aggregate" => aggregate_type)
                    .increment(1);
                Ok(None)
            }
        }
    }

    /// Applies the policy to a cache read. A tolerated failure reads as a miss.
    pub(crate) fn read<T>(
        self,
        result: Result<T, CacheError>,
        aggregate_type: &'static str,
        operation: &'static str,
    ) -> Result<Option<T>, DomainError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if self == CacheWritePolicy::Strict => Err(e.into()),
            Err(e) => {
                tracing::warn!(aggregate_type, operation, error = %e, "cache read failed, falling back to store");
                Ok(None)
            }
        }
    }
}

impl FromStr for CacheWritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(CacheWritePolicy::BestEffort),
            "strict" => Ok(CacheWritePolicy::Strict),
            other => Err(format!(
                "unknown cache write policy {other:?}; expected best_effort or strict"
            )),
        }
    }
}

impl fmt::Display for CacheWritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheWritePolicy::BestEffort => f.write_str("best_effort"),
            CacheWritePolicy::Strict => f.write_str("strict"),
        }
    }
}
