//! Plot domain events.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::{DomainEvent, EventMeta};
use crate::value_objects::SoilType;

/// Events that can occur on a plot.
///
/// Serialized without a tag: the envelope's `event_type` names the variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PlotEvent {
    Created(PlotCreated),
    Updated(PlotUpdated),
    Deleted(PlotDeleted),
}

impl DomainEvent for PlotEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PlotEvent::Created(_) => "PlotCreated",
            PlotEvent::Updated(_) => "PlotUpdated",
            PlotEvent::Deleted(_) => "PlotDeleted",
        }
    }

    fn meta(&self) -> &EventMeta {
        match self {
            PlotEvent::Created(e) => &e.meta,
            PlotEvent::Updated(e) => &e.meta,
            PlotEvent::Deleted(e) => &e.meta,
        }
    }
}

/// A plot was laid out on a farm.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotCreated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub farm_id: AggregateId,
    pub name: String,
    pub width: f64,
    pub length: f64,
    pub area: f64,
    pub soil_type: SoilType,
}

/// A plot changed. Carries every field as it is after the change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotUpdated {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub name: String,
    pub width: f64,
    pub length: f64,
    pub area: f64,
    pub soil_type: SoilType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotDeleted {
    #[serde(flatten)]
    pub meta: EventMeta,
    pub farm_id: AggregateId,
    pub deleted_at: DateTime<Utc>,
}
