//! Cache-aside read path.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use common::AggregateId;
use tracing::{Instrument, Span};

use crate::aggregate::Aggregate;
use crate::entity_cache::EntityCache;
use crate::error::DomainError;
use crate::policy::CacheWritePolicy;
use crate::repository::Repository;

/// Reads entities of one aggregate type, cache first.
///
/// A miss falls back to the repository and the result is written to the
/// cache before returning, so the next read is warm.
pub struct QueryHandler<A: Aggregate> {
    repository: Arc<dyn Repository<A>>,
    cache: Arc<dyn EntityCache<A>>,
    cache_policy: CacheWritePolicy,
    span: Span,
}

impl<A: Aggregate> Clone for QueryHandler<A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            cache_policy: self.cache_policy,
            span: self.span.clone(),
        }
    }
}

impl<A: Aggregate> QueryHandler<A> {
    pub fn new(repository: Arc<dyn Repository<A>>, cache: Arc<dyn EntityCache<A>>) -> Self {
        Self {
            repository,
            cache,
            cache_policy: CacheWritePolicy::default(),
            span: Span::current(),
        }
    }

    pub fn with_cache_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Returns the entity or a `NotFound` error.
    pub async fn get_by_id(&self, id: AggregateId) -> Result<A, DomainError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found(A::aggregate_type(), id))
    }

    /// Returns the entity if it exists and is not soft-deleted.
    pub async fn find_by_id(&self, id: AggregateId) -> Result<Option<A>, DomainError> {
        let span = tracing::debug_span!(parent: &self.span, "find_by_id", aggregate_type = A::aggregate_type(), %id);
        async move {
            let cached = self
                .cache_policy
                .read(self.cache.get(id).await, A::aggregate_type(), "get")?
                .flatten();
            if let Some(entity) = cached {
                return Ok(Some(entity));
            }

            let Some(entity) = self.repository.find_by_id(id).await? else {
                return Ok(None);
            };

            self.cache_policy.write(
                self.cache.set(&entity, None).await,
                A::aggregate_type(),
                "set",
            )?;
            Ok(Some(entity))
        }
        .instrument(span)
        .await
    }

    /// Returns the live entities among `ids`, in request order.
    ///
    /// Only ids the cache could not satisfy are read from the repository, in
    /// a single batch, and the results are written back in a single batch.
    /// Unknown ids are left out; duplicates are collapsed.
    pub async fn get_many(&self, ids: &[AggregateId]) -> Result<Vec<A>, DomainError> {
        let span = tracing::debug_span!(parent: &self.span, "get_many", aggregate_type = A::aggregate_type(), requested = ids.len());
        async move {
            let mut seen = HashSet::with_capacity(ids.len());
            let ids: Vec<AggregateId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();
            if ids.is_empty() {
                return Ok(Vec::new());
            }

            let cached = self
                .cache_policy
                .read(self.cache.get_many(&ids).await, A::aggregate_type(), "get_many")?
                .unwrap_or_default();

            let mut by_id: HashMap<AggregateId, A> =
                cached.into_iter().map(|e| (e.id(), e)).collect();

            let missing: Vec<AggregateId> = ids
                .iter()
                .copied()
                .filter(|id| !by_id.contains_key(id))
                .collect();

            if !missing.is_empty() {
                let loaded = self.repository.find_many(&missing).await?;
                tracing::debug!(
                    hits = ids.len() - missing.len(),
                    loaded = loaded.len(),
                    "filled cache gaps from store"
                );
                if !loaded.is_empty() {
                    self.cache_policy.write(
                        self.cache.set_many(&loaded, None).await,
                        A::aggregate_type(),
                        "set_many",
                    )?;
                }
                by_id.extend(loaded.into_iter().map(|e| (e.id(), e)));
            }

            Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
        }
        .instrument(span)
        .await
    }

    /// Returns the live entities owned by `parent_id`, in storage order.
    ///
    /// Membership comes from the repository; bodies come through [`Self::get_many`].
    pub async fn list_by_parent(&self, parent_id: AggregateId) -> Result<Vec<A>, DomainError> {
        let ids = self.repository.find_ids_by_parent(parent_id).await?;
        self.get_many(&ids).await
    }

    /// Returns every live entity, warming the cache with them.
    pub async fn list_all(&self) -> Result<Vec<A>, DomainError> {
        let span = tracing::debug_span!(parent: &self.span, "list_all", aggregate_type = A::aggregate_type());
        async move {
            let entities = self.repository.find_all().await?;
            if !entities.is_empty() {
                self.cache_policy.write(
                    self.cache.set_many(&entities, None).await,
                    A::aggregate_type(),
                    "set_many",
                )?;
            }
            Ok(entities)
        }
        .instrument(span)
        .await
    }
}
