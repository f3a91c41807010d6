use chrono::{DateTime, Days, NaiveDate, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, EventMeta, Factory, Lifecycle, Transition};
use crate::error::EntityError;
use crate::value_objects::{CropStatus, DaysToMaturity, Quantity};

use super::{CreateCrop, CropCreated, CropDeleted, CropEvent, CropUpdated, UpdateCrop};

/// A planting of one variety on one plot.
#[derive(Debug, Clone, PartialEq)]
pub struct Crop {
    id: AggregateId,
    plot_id: AggregateId,
    variety_id: AggregateId,
    planted_on: NaiveDate,
    status: CropStatus,
    quantity: Option<Quantity>,
    lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropPrimitives {
    pub id: AggregateId,
    pub plot_id: AggregateId,
    pub variety_id: AggregateId,
    pub planted_on: NaiveDate,
    pub status: CropStatus,
    pub quantity: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Crop {
    pub fn plot_id(&self) -> AggregateId {
        self.plot_id
    }

    pub fn variety_id(&self) -> AggregateId {
        self.variety_id
    }

    pub fn planted_on(&self) -> NaiveDate {
        self.planted_on
    }

    pub fn status(&self) -> CropStatus {
        self.status
    }

    pub fn quantity(&self) -> Option<Quantity> {
        self.quantity
    }

    /// The date the crop should be ready, given its variety's maturity.
    ///
    /// `None` if the date falls outside the calendar range.
    pub fn expected_harvest_on(&self, maturity: DaysToMaturity) -> Option<NaiveDate> {
        self.planted_on
            .checked_add_days(Days::new(u64::from(maturity.days())))
    }

    fn quantity_value(&self) -> Option<u32> {
        self.quantity.map(|q| q.value())
    }
}

fn parse_quantity(value: Option<u32>) -> Result<Option<Quantity>, EntityError> {
    Ok(value.map(Quantity::new).transpose()?)
}

impl Aggregate for Crop {
    type Primitives = CropPrimitives;
    type Changes = UpdateCrop;
    type Event = CropEvent;

    fn aggregate_type() -> &'static str {
        "Crop"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn parent_id(&self) -> Option<AggregateId> {
        Some(self.plot_id)
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn to_primitives(&self) -> CropPrimitives {
        CropPrimitives {
            id: self.id,
            plot_id: self.plot_id,
            variety_id: self.variety_id,
            planted_on: self.planted_on,
            status: self.status,
            quantity: self.quantity_value(),
            created_at: self.lifecycle.created_at(),
            updated_at: self.lifecycle.updated_at(),
            deleted_at: self.lifecycle.deleted_at(),
        }
    }

    fn from_primitives(p: CropPrimitives) -> Result<Self, EntityError> {
        Ok(Self {
            id: p.id,
            plot_id: p.plot_id,
            variety_id: p.variety_id,
            planted_on: p.planted_on,
            status: p.status,
            quantity: parse_quantity(p.quantity)?,
            lifecycle: Lifecycle::restore(p.created_at, p.updated_at, p.deleted_at),
        })
    }

    fn update(&self, changes: UpdateCrop) -> Result<Transition<Self>, EntityError> {
        self.ensure_live()?;

        let quantity = match changes.quantity {
            Some(value) => parse_quantity(value)?,
            None => self.quantity,
        };

        let crop = Self {
            variety_id: changes.variety_id.unwrap_or(self.variety_id),
            planted_on: changes.planted_on.unwrap_or(self.planted_on),
            status: changes.status.unwrap_or(self.status),
            quantity,
            lifecycle: self.lifecycle.touched(Utc::now()),
            ..self.clone()
        };

        let event = CropEvent::Updated(CropUpdated {
            meta: EventMeta::new(crop.id, crop.lifecycle.updated_at()),
            variety_id: crop.variety_id,
            planted_on: crop.planted_on,
            status: crop.status,
            quantity: crop.quantity_value(),
        });
        Ok(Transition::with_event(crop, event))
    }

    fn delete(&self) -> Transition<Self> {
        let lifecycle = self.lifecycle.deleted(Utc::now());
        let deleted_at = lifecycle.deleted_at().unwrap_or(lifecycle.updated_at());
        let crop = Self {
            lifecycle,
            ..self.clone()
        };
        let event = CropEvent::Deleted(CropDeleted {
            meta: EventMeta::new(crop.id, deleted_at),
            plot_id: crop.plot_id,
            deleted_at,
        });
        Transition::with_event(crop, event)
    }
}

impl Factory for Crop {
    type Input = CreateCrop;

    fn create(input: CreateCrop) -> Result<Transition<Self>, EntityError> {
        let now = Utc::now();
        let crop = Self {
            id: AggregateId::new(),
            plot_id: input.plot_id,
            variety_id: input.variety_id,
            planted_on: input.planted_on,
            status: input.status,
            quantity: parse_quantity(input.quantity)?,
            lifecycle: Lifecycle::started(now),
        };

        let event = CropEvent::Created(CropCreated {
            meta: EventMeta::new(crop.id, now),
            plot_id: crop.plot_id,
            variety_id: crop.variety_id,
            planted_on: crop.planted_on,
            status: crop.status,
            quantity: crop.quantity_value(),
        });
        Ok(Transition::with_event(crop, event))
    }
}
