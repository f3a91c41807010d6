//! Command handling infrastructure.

use std::sync::Arc;

use common::AggregateId;
use tracing::{Instrument, Span};

use crate::aggregate::{Aggregate, Factory, Transition};
use crate::entity_cache::EntityCache;
use crate::error::{DomainError, EntityError};
use crate::policy::CacheWritePolicy;
use crate::publisher::{EventPublisher, to_envelope};
use crate::repository::Repository;

/// Result of command execution.
#[derive(Debug, Clone)]
pub struct CommandResult<A: Aggregate> {
    /// The entity as persisted.
    pub entity: A,

    /// The events that were published, in publish order.
    pub events: Vec<A::Event>,
}

#[derive(Debug, Clone, Copy)]
enum Persist {
    Save,
    Update,
}

/// Handler for executing write commands against one aggregate type.
///
/// Every command runs the same sequence, strictly in order:
/// 1. Load the target from the repository (creates use the factory instead)
/// 2. Apply exactly one transition
/// 3. Persist the new entity (`save` for creates, `update` otherwise)
/// 4. Reflect it in the cache (`set`, or `remove` once deleted)
/// 5. Publish the transition's events one by one, in order
///
/// A failure aborts the remaining steps. Nothing already done is rolled back.
pub struct CommandHandler<A: Aggregate> {
    repository: Arc<dyn Repository<A>>,
    cache: Arc<dyn EntityCache<A>>,
    publisher: Arc<dyn EventPublisher>,
    cache_policy: CacheWritePolicy,
    span: Span,
}

impl<A: Aggregate> Clone for CommandHandler<A> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            publisher: Arc::clone(&self.publisher),
            cache_policy: self.cache_policy,
            span: self.span.clone(),
        }
    }
}

impl<A: Aggregate> CommandHandler<A> {
    /// Creates a handler with the default cache policy, logging under the current span.
    pub fn new(
        repository: Arc<dyn Repository<A>>,
        cache: Arc<dyn EntityCache<A>>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            cache,
            publisher,
            cache_policy: CacheWritePolicy::default(),
            span: Span::current(),
        }
    }

    pub fn with_cache_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Sets the span every command is recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn cache_policy(&self) -> CacheWritePolicy {
        self.cache_policy
    }

    /// Builds a new entity through the factory and commits it.
    pub async fn create(&self, input: A::Input) -> Result<CommandResult<A>, DomainError>
    where
        A: Factory,
    {
        let span = tracing::info_span!(parent: &self.span, "create", aggregate_type = A::aggregate_type());
        async move {
            let transition = A::create(input)?;
            self.commit(transition, Persist::Save).await
        }
        .instrument(span)
        .await
    }

    /// Applies partial changes to a live entity.
    pub async fn update(
        &self,
        id: AggregateId,
        changes: A::Changes,
    ) -> Result<CommandResult<A>, DomainError> {
        self.execute(id, "update", move |entity| entity.update(changes))
            .await
    }

    /// Soft-deletes a live entity.
    pub async fn delete(&self, id: AggregateId) -> Result<CommandResult<A>, DomainError> {
        self.execute(id, "delete", |entity| Ok(entity.delete()))
            .await
    }

    /// Loads an entity, applies one transition to it and commits the result.
    ///
    /// Fails with `NotFound` before anything is written if the entity does
    /// not exist or is soft-deleted.
    pub async fn execute<F>(
        &self,
        id: AggregateId,
        command: &'static str,
        transition: F,
    ) -> Result<CommandResult<A>, DomainError>
    where
        F: FnOnce(&A) -> Result<Transition<A>, EntityError> + Send,
    {
        let span = tracing::info_span!(
            parent: &self.span,
            "execute",
            aggregate_type = A::aggregate_type(),
            command,
            %id
        );
        async move {
            let entity = self
                .repository
                .find_by_id(id)
                .await?
                .ok_or_else(|| DomainError::not_found(A::aggregate_type(), id))?;

            let transition = transition(&entity)?;
            self.commit(transition, Persist::Update).await
        }
        .instrument(span)
        .await
    }

    /// Persists a transition's entity, updates the cache and publishes its events.
    async fn commit(
        &self,
        transition: Transition<A>,
        persist: Persist,
    ) -> Result<CommandResult<A>, DomainError> {
        let (entity, events) = transition.into_parts();

        match persist {
            Persist::Save => self.repository.save(&entity).await?,
            Persist::Update => self.repository.update(&entity).await?,
        }

        self.reflect_in_cache(&entity).await?;

        for event in &events {
            let envelope = to_envelope::<A>(event)?;
            let event_type = envelope.event_type.clone();
            self.publisher.publish(envelope).await?;
            metrics::counter!("events_published_total", "event_type" => event_type).increment(1);
        }

        metrics::counter!("commands_executed_total", "aggregate" => A::aggregate_type())
            .increment(1);
        tracing::debug!(id = %entity.id(), events = events.len(), "command committed");

        Ok(CommandResult { entity, events })
    }

    async fn reflect_in_cache(&self, entity: &A) -> Result<(), DomainError> {
        let (operation, result) = if entity.is_deleted() {
            ("remove", self.cache.remove(entity.id()).await.map(|_| ()))
        } else {
            ("set", self.cache.set(entity, None).await)
        };

        let written = self
            .cache_policy
            .write(result, A::aggregate_type(), operation)?;

        if written.is_none() {
            // The entry may now be stale; drop it so the next read goes to the store.
            if let Err(e) = self.cache.remove(entity.id()).await {
                tracing::warn!(id = %entity.id(), error = %e, "cache invalidation failed");
            }
        }
        Ok(())
    }
}
