use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Raw key/value cache backend.
///
/// Keys are plain strings; namespacing is the caller's concern. Every
/// write sets a TTL, so there are no immortal entries.
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Retrieves a value.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Retrieves several values, one slot per requested key.
    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>>;

    /// Stores a value, replacing any previous one and resetting its TTL.
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Stores several values with the same TTL.
    async fn set_many(&self, entries: Vec<(String, String)>, ttl: Duration) -> Result<()>;

    /// Deletes keys, returning how many existed.
    async fn delete(&self, keys: &[String]) -> Result<usize>;

    /// Lists live keys matching a glob pattern.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    /// Resets the TTL of an existing key. Returns false if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool>;
}
