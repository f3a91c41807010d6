//! Farm domain events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{DomainEvent, EventMeta};

/// Events that can occur on a farm.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FarmEvent {
    Created(FarmCreated),
    Updated(FarmUpdated),
    Deleted(FarmDeleted),
}

impl DomainEvent for FarmEvent {
    fn event_type(&self) -> &'static str {
        match self {
            FarmEvent::Created(_) => "FarmCreated",
            FarmEvent::Updated(_) => "FarmUpdated",
            FarmEvent::Deleted(_) => "FarmDeleted",
        }
    }

    fn meta(&self) -> &EventMeta {
        match self {
            FarmEvent::Created(e) => &e.meta,
            FarmEvent::Updated(e) => &e.meta,
            FarmEvent::Deleted(e) => &e.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmCreated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: Option<String>,
}

/// Carries every field as it is after the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmUpdated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmDeleted {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub deleted_at: DateTime<Utc>,
}
