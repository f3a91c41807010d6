//! Typed cache port for aggregates and its adapter over a raw backend.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use cache::{CacheBackend, CacheConfig, CacheError};
use common::AggregateId;

use crate::aggregate::Aggregate;

/// Read-aside/write-aside cache for one aggregate type.
///
/// Entries that cannot be turned back into a valid entity are evicted and
/// reported as misses; callers never see a deserialization error.
#[async_trait]
pub trait EntityCache<A: Aggregate>: Send + Sync {
    async fn get(&self, id: AggregateId) -> Result<Option<A>, CacheError>;

    /// Stores the entity, refreshing its TTL. `None` applies the default TTL.
    async fn set(&self, entity: &A, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Removes one entry. Returns false if nothing was cached.
    async fn remove(&self, id: AggregateId) -> Result<bool, CacheError>;

    /// Returns the cached entities among `ids`, in request order.
    ///
    /// Absent and corrupt entries are left out of the result.
    async fn get_many(&self, ids: &[AggregateId]) -> Result<Vec<A>, CacheError>;

    async fn set_many(&self, entities: &[A], ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete_many(&self, ids: &[AggregateId]) -> Result<usize, CacheError>;

    /// Lists full keys in this cache's namespace matching a glob,
    /// e.g. `*` or `3f2c*`.
    async fn get_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;

    async fn expire(&self, id: AggregateId, ttl: Duration) -> Result<bool, CacheError>;

    /// Removes every entry in this cache's namespace.
    async fn clear(&self) -> Result<usize, CacheError>;
}

/// [`EntityCache`] over any [`CacheBackend`].
///
/// Keys have the form `{prefix}:{aggregate_type}:{id}` and values are the
/// JSON primitive record. Only keys under the namespace are ever touched.
pub struct CachedEntities<A, B> {
    backend: B,
    namespace: String,
    default_ttl: Duration,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, B> CachedEntities<A, B>
where
    A: Aggregate,
    B: CacheBackend,
{
    pub fn new(backend: B, config: &CacheConfig) -> Self {
        Self {
            backend,
            namespace: config.namespace(A::aggregate_type()),
            default_ttl: config.default_ttl,
            _aggregate: PhantomData,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the backend key for an entity id.
    pub fn key(&self, id: AggregateId) -> String {
        format!("{}:{}", self.namespace, id)
    }

    fn decode(raw: &str) -> Result<A, String> {
        let primitives: A::Primitives = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        A::from_primitives(primitives).map_err(|e| e.to_string())
    }

    fn encode(entity: &A) -> Result<String, CacheError> {
        Ok(serde_json::to_string(&entity.to_primitives())?)
    }

    /// Decodes a raw entry, deciding whether it is usable or must be evicted.
    fn classify(&self, id: AggregateId, raw: &str) -> Option<A> {
        match Self::decode(raw) {
            Ok(entity) if entity.id() == id && !entity.is_deleted() => Some(entity),
            Ok(entity) => {
                tracing::debug!(
                    aggregate_type = A::aggregate_type(),
                    %id,
                    deleted = entity.is_deleted(),
                    "evicting stale cache entry"
                );
                None
            }
            Err(reason) => {
                tracing::warn!(
                    aggregate_type = A::aggregate_type(),
                    %id,
                    %reason,
                    "evicting corrupt cache entry"
                );
                metrics::counter!("cache_corrupt_evictions_total", "aggregate" => A::aggregate_type())
                    .increment(1);
                None
            }
        }
    }

    fn record_lookups(hits: usize, misses: usize) {
        if hits > 0 {
            metrics::counter!("cache_hits_total", "aggregate" => A::aggregate_type())
                .increment(hits as u64);
        }
        if misses > 0 {
            metrics::counter!("cache_misses_total", "aggregate" => A::aggregate_type())
                .increment(misses as u64);
        }
    }
}

#[async_trait]
impl<A, B> EntityCache<A> for CachedEntities<A, B>
where
    A: Aggregate,
    B: CacheBackend,
{
    async fn get(&self, id: AggregateId) -> Result<Option<A>, CacheError> {
        let key = self.key(id);
        let Some(raw) = self.backend.get(&key).await? else {
            Self::record_lookups(0, 1);
            return Ok(None);
        };

        match self.classify(id, &raw) {
            Some(entity) => {
                Self::record_lookups(1, 0);
                Ok(Some(entity))
            }
            None => {
                self.backend.delete(&[key]).await?;
                Self::record_lookups(0, 1);
                Ok(None)
            }
        }
    }

    async fn set(&self, entity: &A, ttl: Option<Duration>) -> Result<(), CacheError> {
        let value = Self::encode(entity)?;
        self.backend
            .set(
                &self.key(entity.id()),
                value,
                ttl.unwrap_or(self.default_ttl),
            )
            .await
    }

    async fn remove(&self, id: AggregateId) -> Result<bool, CacheError> {
        Ok(self.backend.delete(&[self.key(id)]).await? > 0)
    }

    async fn get_many(&self, ids: &[AggregateId]) -> Result<Vec<A>, CacheError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = ids.iter().map(|id| self.key(*id)).collect();
        let values = self.backend.get_many(&keys).await?;

        let mut found = Vec::with_capacity(ids.len());
        let mut evict = Vec::new();
        for ((id, key), raw) in ids.iter().zip(keys).zip(values) {
            let Some(raw) = raw else { continue };
            match self.classify(*id, &raw) {
                Some(entity) => found.push(entity),
                None => evict.push(key),
            }
        }

        if !evict.is_empty() {
            self.backend.delete(&evict).await?;
        }
        Self::record_lookups(found.len(), ids.len() - found.len());
        Ok(found)
    }

    async fn set_many(&self, entities: &[A], ttl: Option<Duration>) -> Result<(), CacheError> {
        if entities.is_empty() {
            return Ok(());
        }
        let entries = entities
            .iter()
            .map(|entity| Ok((self.key(entity.id()), Self::encode(entity)?)))
            .collect::<Result<Vec<_>, CacheError>>()?;
        self.backend
            .set_many(entries, ttl.unwrap_or(self.default_ttl))
            .await
    }

    async fn delete_many(&self, ids: &[AggregateId]) -> Result<usize, CacheError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let keys: Vec<String> = ids.iter().map(|id| self.key(*id)).collect();
        self.backend.delete(&keys).await
    }

    async fn get_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError> {
        self.backend
            .keys(&cache::pattern::scoped(&self.namespace, pattern))
            .await
    }

    async fn expire(&self, id: AggregateId, ttl: Duration) -> Result<bool, CacheError> {
        self.backend.expire(&self.key(id), ttl).await
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let keys = self.get_keys("*").await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.backend.delete(&keys).await
    }
}
