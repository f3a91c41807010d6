//! Event counts read model.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::EventEnvelope;
use domain::PublishError;
use tokio::sync::RwLock;

use crate::read_model::ReadModel;
use crate::subscriber::EventSubscriber;

#[derive(Debug, Default)]
struct Counts {
    by_event_type: HashMap<String, u64>,
    by_aggregate_type: HashMap<String, u64>,
    total: u64,
}

/// Counts published events by event type and by aggregate type.
///
/// Clones share the same counters, so one clone can be registered with the
/// publisher while another is queried.
#[derive(Clone, Default)]
pub struct EventCountsView {
    counts: Arc<RwLock<Counts>>,
}

impl EventCountsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how many events of the given type were seen.
    pub async fn count_for(&self, event_type: &str) -> u64 {
        self.counts
            .read()
            .await
            .by_event_type
            .get(event_type)
            .copied()
            .unwrap_or(0)
    }

    /// Returns how many events were seen for the given aggregate type.
    pub async fn count_for_aggregate(&self, aggregate_type: &str) -> u64 {
        self.counts
            .read()
            .await
            .by_aggregate_type
            .get(aggregate_type)
            .copied()
            .unwrap_or(0)
    }

    pub async fn total(&self) -> u64 {
        self.counts.read().await.total
    }

    /// Returns every event type with its count, sorted by event type.
    pub async fn snapshot(&self) -> Vec<(String, u64)> {
        let counts = self.counts.read().await;
        let mut entries: Vec<_> = counts
            .by_event_type
            .iter()
            .map(|(event_type, count)| (event_type.clone(), *count))
            .collect();
        entries.sort();
        entries
    }

    pub async fn reset(&self) {
        *self.counts.write().await = Counts::default();
    }
}

#[async_trait]
impl EventSubscriber for EventCountsView {
    fn name(&self) -> &'static str {
        "EventCountsView"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        let mut counts = self.counts.write().await;
        *counts
            .by_event_type
            .entry(event.event_type.clone())
            .or_default() += 1;
        *counts
            .by_aggregate_type
            .entry(event.aggregate_type.clone())
            .or_default() += 1;
        counts.total += 1;
        Ok(())
    }
}

impl ReadModel for EventCountsView {
    fn name(&self) -> &'static str {
        "EventCountsView"
    }

    fn count(&self) -> usize {
        // Returns 0 while a writer holds the lock
        self.counts
            .try_read()
            .map(|c| c.by_event_type.len())
            .unwrap_or(0)
    }
}
