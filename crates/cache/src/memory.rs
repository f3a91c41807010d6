use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::{Result, backend::CacheBackend, pattern};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Longest lifetime an entry can get; longer TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

impl Entry {
    fn new(value: String, now: Instant, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: deadline(now, ttl),
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

fn deadline(now: Instant, ttl: Duration) -> Instant {
    now + ttl.min(MAX_TTL)
}

/// Returns the live value under `key`, removing the entry if it has expired.
fn live_value(map: &mut HashMap<String, Entry>, key: &str, now: Instant) -> Option<String> {
    match map.get(key) {
        Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
        Some(_) => {
            map.remove(key);
            None
        }
        None => None,
    }
}

/// In-memory cache backend with per-entry TTL.
///
/// Expired entries are removed when a read, delete or key scan reaches them,
/// and `set_many` sweeps the whole map. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct InMemoryCacheBackend {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryCacheBackend {
    /// Creates a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    /// Returns true if there are no live entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns the remaining lifetime of a live key.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }

    /// Writes a raw value without going through serialization.
    ///
    /// Used to simulate entries written by an incompatible producer.
    pub async fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        self.entries
            .write()
            .await
            .insert(key.into(), Entry::new(value.into(), Instant::now(), ttl));
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut map = self.entries.write().await;
        Ok(live_value(&mut map, key, now))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>> {
        let now = Instant::now();
        let mut map = self.entries.write().await;
        Ok(keys.iter().map(|key| live_value(&mut map, key, now)).collect())
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        let entry = Entry::new(value, Instant::now(), ttl);
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_many(&self, entries: Vec<(String, String)>, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut map = self.entries.write().await;
        map.retain(|_, e| e.is_live(now));
        for (key, value) in entries {
            map.insert(key, Entry::new(value, now, ttl));
        }
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<usize> {
        let now = Instant::now();
        let mut map = self.entries.write().await;
        let removed = keys
            .iter()
            .filter_map(|key| map.remove(key))
            .filter(|e| e.is_live(now))
            .count();
        Ok(removed)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = pattern::compile(pattern)?;
        let now = Instant::now();
        let mut map = self.entries.write().await;
        map.retain(|_, e| e.is_live(now));

        let mut keys: Vec<_> = map
            .keys()
            .filter(|key| matcher.is_match(key.as_str()))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut map = self.entries.write().await;
        match map.get_mut(key) {
            Some(entry) if entry.is_live(now) => {
                entry.expires_at = deadline(now, ttl);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
