//! Crop variety domain events.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{DomainEvent, EventMeta};
use crate::value_objects::CropCategory;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CropVarietyEvent {
    Created(CropVarietyCreated),
    Updated(CropVarietyUpdated),
    Deleted(CropVarietyDeleted),
}

impl DomainEvent for CropVarietyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CropVarietyEvent::Created(_) => "CropVarietyCreated",
            CropVarietyEvent::Updated(_) => "CropVarietyUpdated",
            CropVarietyEvent::Deleted(_) => "CropVarietyDeleted",
        }
    }

    fn meta(&self) -> &EventMeta {
        match self {
            CropVarietyEvent::Created(e) => &e.meta,
            CropVarietyEvent::Updated(e) => &e.meta,
            CropVarietyEvent::Deleted(e) => &e.meta,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropVarietyCreated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub name: String,
    pub category: CropCategory,
    pub days_to_maturity: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropVarietyUpdated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub name: String,
    pub category: CropCategory,
    pub days_to_maturity: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropVarietyDeleted {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub deleted_at: DateTime<Utc>,
}
