//! Crop domain events.

use chrono::{DateTime, NaiveDate, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::{DomainEvent, EventMeta};
use crate::value_objects::CropStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CropEvent {
    Created(CropCreated),
    Updated(CropUpdated),
    Deleted(CropDeleted),
}

impl DomainEvent for CropEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CropEvent::Created(_) => "CropCreated",
            CropEvent::Updated(_) => "CropUpdated",
            CropEvent::Deleted(_) => "CropDeleted",
        }
    }

    fn meta(&self) -> &EventMeta {
        match self {
            CropEvent::Created(e) => &e.meta,
            CropEvent::Updated(e) => &e.meta,
            CropEvent::Deleted(e) => &e.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropCreated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub plot_id: AggregateId,
    pub variety_id: AggregateId,
    pub planted_on: NaiveDate,
    pub status: CropStatus,
    pub quantity: Option<u32>,
}

/// Carries every field as it is after the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropUpdated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub variety_id: AggregateId,
    pub planted_on: NaiveDate,
    pub status: CropStatus,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropDeleted {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub plot_id: AggregateId,
    pub deleted_at: DateTime<Utc>,
}
