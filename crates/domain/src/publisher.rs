//! Outbound port for domain events.

use std::sync::Arc;

use async_trait::async_trait;
use common::EventEnvelope;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::aggregate::{Aggregate, DomainEvent};

/// Errors raised when an event cannot be handed to a consumer.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Failed to deliver {event_type}: {message}")]
    Delivery { event_type: String, message: String },

    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PublishError {
    pub fn delivery(event_type: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::Delivery {
            event_type: event_type.into(),
            message: message.into(),
        }
    }
}

/// Fan-out boundary for drained domain events.
///
/// Handlers call `publish` exactly once per event, in the order the events
/// were produced, after persistence has completed.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError>;
}

#[async_trait]
impl<P: EventPublisher + ?Sized> EventPublisher for Arc<P> {
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        (**self).publish(event).await
    }
}

/// Converts a typed event into the envelope handed to publishers.
pub fn to_envelope<A: Aggregate>(event: &A::Event) -> Result<EventEnvelope, PublishError> {
    let meta = event.meta();
    Ok(EventEnvelope::new(
        A::aggregate_type(),
        meta.aggregate_id,
        event.event_type(),
        serde_json::to_value(event)?,
    )
    .with_event_id(meta.event_id)
    .with_version(meta.version)
    .with_timestamp(meta.occurred_at))
}

/// Publisher that records every envelope in memory, in publish order.
///
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct InMemoryEventPublisher {
    published: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl InMemoryEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every envelope published so far.
    pub async fn published(&self) -> Vec<EventEnvelope> {
        self.published.read().await.clone()
    }

    /// Returns the event types published so far.
    pub async fn event_types(&self) -> Vec<String> {
        self.published
            .read()
            .await
            .iter()
            .map(|e| e.event_type.clone())
            .collect()
    }

    pub async fn clear(&self) {
        self.published.write().await.clear();
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        self.published.write().await.push(event);
        Ok(())
    }
}
