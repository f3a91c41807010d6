//! Subscriber trait for published events.

use async_trait::async_trait;
use common::EventEnvelope;
use domain::PublishError;

/// A consumer of published event envelopes.
///
/// Subscribers are registered with a [`FanOutPublisher`](crate::FanOutPublisher)
/// and see events in the order the command handlers publish them.
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Returns the name of this subscriber, used in logs and metric labels.
    fn name(&self) -> &'static str;

    /// Handles a single envelope.
    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError>;
}
