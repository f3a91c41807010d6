//! Plot aggregate implementation.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, EventMeta, Factory, Lifecycle, Transition};
use crate::error::{EntityError, ValidationError};
use crate::value_objects::{Metres, Name, SoilType};

use super::{CreatePlot, PlotCreated, PlotDeleted, PlotEvent, PlotUpdated, UpdatePlot};

/// Allowed drift between a stored area and `width × length`, in units of
/// `f64::EPSILON` relative to the larger of the area and 1.
const AREA_TOLERANCE_EPSILONS: f64 = 4.0;

/// Multiplies the sides, rejecting products too large to represent.
fn checked_area(width: Metres, length: Metres) -> Result<f64, ValidationError> {
    let area = width.value() * length.value();
    if area.is_finite() {
        Ok(area)
    } else {
        Err(ValidationError::OutOfRange {
            field: "area",
            min: 0.0,
            max: f64::MAX,
            value: area,
        })
    }
}

/// A rectangular growing area on a farm.
///
/// The area is always `width × length`; it is derived, never set.
#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    id: AggregateId,
    farm_id: AggregateId,
    name: Name,
    width: Metres,
    length: Metres,
    soil_type: SoilType,
    lifecycle: Lifecycle,
}

/// Stored form of a plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotPrimitives {
    pub id: AggregateId,
    pub farm_id: AggregateId,
    pub name: String,
    pub width: f64,
    pub length: f64,
    pub area: f64,
    pub soil_type: SoilType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Query methods
impl Plot {
    pub fn farm_id(&self) -> AggregateId {
        self.farm_id
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn width(&self) -> Metres {
        self.width
    }

    pub fn length(&self) -> Metres {
        self.length
    }

    /// Surface in square metres.
    pub fn area(&self) -> f64 {
        self.width.value() * self.length.value()
    }

    pub fn soil_type(&self) -> SoilType {
        self.soil_type
    }
}

impl Aggregate for Plot {
    type Primitives = PlotPrimitives;
    type Changes = UpdatePlot;
    type Event = PlotEvent;

    fn aggregate_type() -> &'static str {
        "Plot"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn parent_id(&self) -> Option<AggregateId> {
        Some(self.farm_id)
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn to_primitives(&self) -> PlotPrimitives {
        PlotPrimitives {
            id: self.id,
            farm_id: self.farm_id,
            name: self.name.to_string(),
            width: self.width.value(),
            length: self.length.value(),
            area: self.area(),
            soil_type: self.soil_type,
            created_at: self.lifecycle.created_at(),
            updated_at: self.lifecycle.updated_at(),
            deleted_at: self.lifecycle.deleted_at(),
        }
    }

    fn from_primitives(p: PlotPrimitives) -> Result<Self, EntityError> {
        let plot = Self {
            id: p.id,
            farm_id: p.farm_id,
            name: Name::new("name", &p.name)?,
            width: Metres::new("width", p.width)?,
            length: Metres::new("length", p.length)?,
            soil_type: p.soil_type,
            lifecycle: Lifecycle::restore(p.created_at, p.updated_at, p.deleted_at),
        };

        let expected = checked_area(plot.width, plot.length)?;
        let tolerance = f64::EPSILON * expected.max(1.0) * AREA_TOLERANCE_EPSILONS;
        if (p.area - expected).abs() > tolerance {
            return Err(ValidationError::Inconsistent {
                field: "area",
                message: format!("stored area {} does not match width × length {}", p.area, expected),
            }
            .into());
        }
        Ok(plot)
    }

    fn update(&self, changes: UpdatePlot) -> Result<Transition<Self>, EntityError> {
        self.ensure_live()?;

        let name = match changes.name {
            Some(name) => Name::new("name", name)?,
            None => self.name.clone(),
        };
        let width = match changes.width {
            Some(width) => Metres::new("width", width)?,
            None => self.width,
        };
        let length = match changes.length {
            Some(length) => Metres::new("length", length)?,
            None => self.length,
        };
        checked_area(width, length)?;

        let now = Utc::now();
        let plot = Self {
            name,
            width,
            length,
            soil_type: changes.soil_type.unwrap_or(self.soil_type),
            lifecycle: self.lifecycle.touched(now),
            ..self.clone()
        };

        let event = PlotEvent::Updated(PlotUpdated {
            meta: EventMeta::new(plot.id, plot.lifecycle.updated_at()),
            name: plot.name.to_string(),
            width: plot.width.value(),
            length: plot.length.value(),
            area: plot.area(),
            soil_type: plot.soil_type,
        });
        Ok(Transition::with_event(plot, event))
    }

    fn delete(&self) -> Transition<Self> {
        let lifecycle = self.lifecycle.deleted(Utc::now());
        let deleted_at = lifecycle.deleted_at().unwrap_or(lifecycle.updated_at());
        let plot = Self {
            lifecycle,
            ..self.clone()
        };

        let event = PlotEvent::Deleted(PlotDeleted {
            meta: EventMeta::new(plot.id, deleted_at),
            farm_id: plot.farm_id,
            deleted_at,
        });
        Transition::with_event(plot, event)
    }
}

impl Factory for Plot {
    type Input = CreatePlot;

    fn create(input: CreatePlot) -> Result<Transition<Self>, EntityError> {
        let width = Metres::new("width", input.width)?;
        let length = Metres::new("length", input.length)?;
        checked_area(width, length)?;

        let now = Utc::now();
        let plot = Self {
            id: AggregateId::new(),
            farm_id: input.farm_id,
            name: Name::new("name", &input.name)?,
            width,
            length,
            soil_type: input.soil_type,
            lifecycle: Lifecycle::started(now),
        };

        let event = PlotEvent::Created(PlotCreated {
            meta: EventMeta::new(plot.id, now),
            farm_id: plot.farm_id,
            name: plot.name.to_string(),
            width: plot.width.value(),
            length: plot.length.value(),
            area: plot.area(),
            soil_type: plot.soil_type,
        });
        Ok(Transition::with_event(plot, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::DomainEvent;

    fn north_field() -> Transition<Plot> {
        Plot::create(CreatePlot::new(
            AggregateId::new(),
            "North Field",
            10.0,
            20.0,
            SoilType::Loam,
        ))
        .unwrap()
    }

    #[test]
    fn create_emits_one_event_mirroring_input() {
        let mut transition = north_field();
        let events = transition.take_events();

        assert_eq!(events.len(), 1);
        let PlotEvent::Created(created) = &events[0] else {
            panic!("expected PlotCreated, got {:?}", events[0]);
        };
        assert_eq!(created.name, "North Field");
        assert_eq!(created.width, 10.0);
        assert_eq!(created.length, 20.0);
        assert_eq!(created.area, 200.0);
        assert_eq!(created.soil_type, SoilType::Loam);
        assert_eq!(created.meta.aggregate_id, transition.entity().id());
        assert_eq!(events[0].event_type(), "PlotCreated");

        assert!(transition.take_events().is_empty());
    }

    #[test]
    fn create_rejects_invalid_dimensions() {
        let result = Plot::create(CreatePlot::new(
            AggregateId::new(),
            "North Field",
            0.0,
            20.0,
            SoilType::Clay,
        ));
        assert!(matches!(
            result,
            Err(EntityError::Validation(ValidationError::NotPositive {
                field: "width",
                ..
            }))
        ));
    }

    #[test]
    fn create_rejects_dimensions_whose_area_overflows() {
        let result = Plot::create(CreatePlot::new(
            AggregateId::new(),
            "Big",
            1e200,
            1e200,
            SoilType::Loam,
        ));
        assert!(matches!(
            result,
            Err(EntityError::Validation(ValidationError::OutOfRange {
                field: "area",
                ..
            }))
        ));
    }

    #[test]
    fn update_rejects_resize_whose_area_overflows() {
        let plot = north_field().into_entity();
        let result = plot.update(UpdatePlot::resize(1e200, 1e200));
        assert!(matches!(
            result,
            Err(EntityError::Validation(ValidationError::OutOfRange {
                field: "area",
                ..
            }))
        ));

        let result = plot.update(UpdatePlot {
            length: Some(f64::MAX),
            ..UpdatePlot::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn area_within_tolerance_rehydrates() {
        let plot = north_field().into_entity();
        let mut primitives = plot.to_primitives();
        primitives.area += f64::EPSILON * primitives.area;
        assert!(Plot::from_primitives(primitives.clone()).is_ok());

        primitives.area += 1.0;
        assert!(Plot::from_primitives(primitives).is_err());
    }

    #[test]
    fn update_keeps_unchanged_fields() {
        let plot = north_field().into_entity();
        let (updated, events) = plot
            .update(UpdatePlot::rename("North Field A"))
            .unwrap()
            .into_parts();

        assert_eq!(updated.name().as_str(), "North Field A");
        assert_eq!(updated.width().value(), 10.0);
        assert_eq!(updated.length().value(), 20.0);
        assert_eq!(updated.soil_type(), SoilType::Loam);
        assert_eq!(updated.farm_id(), plot.farm_id());
        assert_eq!(updated.lifecycle().created_at(), plot.lifecycle().created_at());
        assert!(updated.lifecycle().updated_at() >= plot.lifecycle().updated_at());

        assert_eq!(events.len(), 1);
        let PlotEvent::Updated(event) = &events[0] else {
            panic!("expected PlotUpdated");
        };
        assert_eq!(event.name, "North Field A");
        assert_eq!(event.width, 10.0);
        assert_eq!(event.length, 20.0);
    }

    #[test]
    fn resize_recomputes_area() {
        let plot = north_field().into_entity();
        let resized = plot.update(UpdatePlot::resize(4.0, 5.0)).unwrap().into_entity();
        assert_eq!(resized.area(), 20.0);
        assert_eq!(resized.to_primitives().area, 20.0);
    }

    #[test]
    fn failed_update_leaves_entity_untouched() {
        let plot = north_field().into_entity();
        let before = plot.clone();
        assert!(plot.update(UpdatePlot::rename("  ")).is_err());
        assert_eq!(plot, before);
    }

    #[test]
    fn delete_sets_deleted_at_and_blocks_updates() {
        let plot = north_field().into_entity();
        let mut transition = plot.delete();
        let events = transition.take_events();
        let deleted = transition.into_entity();

        assert!(deleted.is_deleted());
        assert_eq!(deleted.lifecycle().deleted_at(), Some(deleted.lifecycle().updated_at()));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type(), "PlotDeleted");

        assert!(matches!(
            deleted.update(UpdatePlot::rename("Again")),
            Err(EntityError::Deleted { .. })
        ));
    }

    #[test]
    fn deleting_twice_is_idempotent_field_wise() {
        let once = north_field().into_entity().delete().into_entity();
        let (twice, events) = once.delete().into_parts();

        assert_eq!(twice, once);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn primitives_round_trip_without_events() {
        let plot = north_field().into_entity();
        let primitives = plot.to_primitives();

        let restored = Plot::from_primitives(primitives.clone()).unwrap();
        assert_eq!(restored, plot);
        assert_eq!(restored.to_primitives(), primitives);
    }

    #[test]
    fn from_primitives_rejects_inconsistent_area() {
        let mut primitives = north_field().into_entity().to_primitives();
        primitives.area = 150.0;
        assert!(matches!(
            Plot::from_primitives(primitives),
            Err(EntityError::Validation(ValidationError::Inconsistent {
                field: "area",
                ..
            }))
        ));
    }
}
