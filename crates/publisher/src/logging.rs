//! Subscriber that writes published events to the log.

use async_trait::async_trait;
use common::EventEnvelope;
use domain::PublishError;

use crate::subscriber::EventSubscriber;

/// Emits one `info` level record per envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingSubscriber;

impl LoggingSubscriber {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSubscriber for LoggingSubscriber {
    fn name(&self) -> &'static str {
        "LoggingSubscriber"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        tracing::info!(
            event_id = %event.event_id,
            event_type = %event.event_type,
            aggregate_type = %event.aggregate_type,
            aggregate_id = %event.aggregate_id,
            version = event.version,
            occurred_at = %event.timestamp,
            "domain event published"
        );
        Ok(())
    }
}
