//! Core aggregate, transition and domain event types.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use common::{AggregateId, EventId};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::EntityError;

/// Schema version stamped on every event defined in this crate.
pub const EVENT_SCHEMA_VERSION: u32 = 1;

/// Fields every domain event carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    pub event_id: EventId,
    pub aggregate_id: AggregateId,
    pub occurred_at: DateTime<Utc>,
    pub version: u32,
}

impl EventMeta {
    /// Stamps a new event for an aggregate.
    pub fn new(aggregate_id: AggregateId, occurred_at: DateTime<Utc>) -> Self {
        Self {
            event_id: EventId::new(),
            aggregate_id,
            occurred_at,
            version: EVENT_SCHEMA_VERSION,
        }
    }
}

/// Trait for domain events.
///
/// Domain events represent facts that have happened in the domain.
/// They are immutable and should be named in past tense.
pub trait DomainEvent: Serialize + Clone + Debug + Send + Sync {
    /// Returns the event type name, e.g. `PlotCreated`.
    fn event_type(&self) -> &'static str;

    /// Returns the identifying fields of the event.
    fn meta(&self) -> &EventMeta;
}

/// Creation, modification and soft-deletion timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl Lifecycle {
    /// Timestamps for an entity created at `now`.
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Timestamps read back from storage.
    pub fn restore(
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            created_at,
            updated_at,
            deleted_at,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns the timestamps after a modification at `now`.
    ///
    /// `updated_at` never moves backwards, even if the clock does.
    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            updated_at: now.max(self.updated_at),
            ..*self
        }
    }

    /// Returns the timestamps after a soft delete at `now`.
    ///
    /// Deleting twice keeps the first deletion time.
    pub fn deleted(&self, now: DateTime<Utc>) -> Self {
        if self.is_deleted() {
            return *self;
        }
        let at = now.max(self.updated_at);
        Self {
            updated_at: at,
            deleted_at: Some(at),
            ..*self
        }
    }
}

/// The result of an entity transition: the new entity and the events it produced.
///
/// Entities are never mutated in place; every transition builds a sibling
/// instance and returns it together with exactly the events that describe it.
#[derive(Debug, Clone)]
pub struct Transition<A: Aggregate> {
    entity: A,
    events: Vec<A::Event>,
}

impl<A: Aggregate> Transition<A> {
    pub fn new(entity: A, events: Vec<A::Event>) -> Self {
        Self { entity, events }
    }

    /// A transition that produced exactly one event.
    pub fn with_event(entity: A, event: A::Event) -> Self {
        Self::new(entity, vec![event])
    }

    pub fn entity(&self) -> &A {
        &self.entity
    }

    /// Returns the events not yet taken.
    pub fn events(&self) -> &[A::Event] {
        &self.events
    }

    /// Drains the buffered events.
    ///
    /// The first call returns everything buffered; later calls return an empty vector.
    pub fn take_events(&mut self) -> Vec<A::Event> {
        std::mem::take(&mut self.events)
    }

    pub fn into_parts(self) -> (A, Vec<A::Event>) {
        (self.entity, self.events)
    }

    pub fn into_entity(self) -> A {
        self.entity
    }
}

/// Trait for aggregates managed by the lifecycle engine.
///
/// An aggregate is an immutable record: `update` and `delete` are pure
/// functions returning a [`Transition`]. Rehydration through
/// `from_primitives` goes through the same validation as creation but
/// never produces an event.
pub trait Aggregate: Clone + Debug + Send + Sync + Sized + 'static {
    /// Plain serializable form used by the store and the cache.
    type Primitives: Serialize + DeserializeOwned + Clone + PartialEq + Debug + Send + Sync;

    /// Partial changes accepted by `update`. Absent fields are left as they are.
    type Changes: Debug + Send + Sync;

    /// The type of events this aggregate produces.
    type Event: DomainEvent;

    /// Returns the aggregate type name.
    ///
    /// Used as the store kind, cache namespace and envelope aggregate type.
    fn aggregate_type() -> &'static str;

    fn id(&self) -> AggregateId;

    /// Owning aggregate, for types listed by parent.
    fn parent_id(&self) -> Option<AggregateId> {
        None
    }

    fn lifecycle(&self) -> &Lifecycle;

    fn is_deleted(&self) -> bool {
        self.lifecycle().is_deleted()
    }

    fn to_primitives(&self) -> Self::Primitives;

    /// Rebuilds an entity from a stored record without emitting any event.
    fn from_primitives(primitives: Self::Primitives) -> Result<Self, EntityError>;

    /// Applies partial changes, producing one update event.
    ///
    /// Fails with [`EntityError::Deleted`] on a soft-deleted entity.
    fn update(&self, changes: Self::Changes) -> Result<Transition<Self>, EntityError>;

    /// Soft-deletes the entity, producing one deletion event.
    fn delete(&self) -> Transition<Self>;

    /// Rejects transitions on a soft-deleted entity.
    fn ensure_live(&self) -> Result<(), EntityError> {
        if self.is_deleted() {
            return Err(EntityError::Deleted {
                aggregate_type: Self::aggregate_type(),
                id: self.id(),
            });
        }
        Ok(())
    }
}

/// Aggregates that can be created from a command.
pub trait Factory: Aggregate {
    /// Validated input for a fresh entity.
    type Input: Debug + Send + Sync;

    /// Builds a new entity with a fresh identifier and timestamps,
    /// producing exactly one creation event.
    fn create(input: Self::Input) -> Result<Transition<Self>, EntityError>;
}
