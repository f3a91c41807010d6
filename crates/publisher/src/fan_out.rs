//! Fan-out delivery of envelopes to registered subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use common::EventEnvelope;
use domain::{EventPublisher, PublishError};

use crate::subscriber::EventSubscriber;

/// Delivers every published envelope to each registered subscriber.
///
/// Subscribers are called one at a time in registration order. The first
/// failure stops delivery of that envelope to the remaining subscribers and
/// is returned to the caller.
#[derive(Clone, Default)]
pub struct FanOutPublisher {
    subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl FanOutPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber after those already registered.
    pub fn register(&mut self, subscriber: Arc<dyn EventSubscriber>) {
        tracing::debug!(subscriber = subscriber.name(), "subscriber registered");
        self.subscribers.push(subscriber);
    }

    pub fn with_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.register(subscriber);
        self
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[async_trait]
impl EventPublisher for FanOutPublisher {
    #[tracing::instrument(skip(self, event), fields(event_type = %event.event_type, aggregate_id = %event.aggregate_id))]
    async fn publish(&self, event: EventEnvelope) -> Result<(), PublishError> {
        for subscriber in &self.subscribers {
            if let Err(e) = subscriber.handle(&event).await {
                tracing::error!(
                    subscriber = subscriber.name(),
                    error = %e,
                    "subscriber failed, remaining deliveries skipped"
                );
                metrics::counter!("subscriber_failures_total", "subscriber" => subscriber.name())
                    .increment(1);
                return Err(e);
            }
            metrics::counter!("subscriber_deliveries_total", "subscriber" => subscriber.name())
                .increment(1);
        }
        Ok(())
    }
}
