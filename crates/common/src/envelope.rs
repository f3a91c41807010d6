use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{AggregateId, EventId};

/// A domain event serialized for delivery to downstream consumers.
///
/// Handlers convert their typed events into envelopes and hand them to the
/// publisher one at a time, in the order the transition produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_id: EventId,

    /// e.g. `PlotCreated`, `CropDeleted`.
    pub event_type: String,

    pub aggregate_id: AggregateId,

    /// e.g. `Plot`, `Crop`.
    pub aggregate_type: String,

    /// Schema version of the payload.
    pub version: u32,

    /// When the transition that produced the event ran.
    pub timestamp: DateTime<Utc>,

    /// The event body, including its own metadata fields.
    pub payload: serde_json::Value,

    /// Free-form annotations added by publishers or subscribers.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EventEnvelope {
    /// Wraps a payload with a fresh event id, schema version 1 and the
    /// current time.
    pub fn new(
        aggregate_type: impl Into<String>,
        aggregate_id: AggregateId,
        event_type: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            event_type: event_type.into(),
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            version: 1,
            timestamp: Utc::now(),
            payload,
            metadata: HashMap::new(),
        }
    }

    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = event_id;
        self
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Decodes the payload into a concrete type.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }
}
