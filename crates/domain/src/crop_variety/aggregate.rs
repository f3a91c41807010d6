use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, EventMeta, Factory, Lifecycle, Transition};
use crate::error::EntityError;
use crate::value_objects::{CropCategory, DaysToMaturity, Name};

use super::{
    CreateCropVariety, CropVarietyCreated, CropVarietyDeleted, CropVarietyEvent,
    CropVarietyUpdated, UpdateCropVariety,
};

/// A cultivar that crops are planted from.
#[derive(Debug, Clone, PartialEq)]
pub struct CropVariety {
    id: AggregateId,
    name: Name,
    category: CropCategory,
    days_to_maturity: DaysToMaturity,
    lifecycle: Lifecycle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropVarietyPrimitives {
    pub id: AggregateId,
    pub name: String,
    pub category: CropCategory,
    pub days_to_maturity: u16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CropVariety {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn category(&self) -> CropCategory {
        self.category
    }

    pub fn days_to_maturity(&self) -> DaysToMaturity {
        self.days_to_maturity
    }
}

impl Aggregate for CropVariety {
    type Primitives = CropVarietyPrimitives;
    type Changes = UpdateCropVariety;
    type Event = CropVarietyEvent;

    fn aggregate_type() -> &'static str {
        "CropVariety"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn to_primitives(&self) -> CropVarietyPrimitives {
        CropVarietyPrimitives {
            id: self.id,
            name: self.name.to_string(),
            category: self.category,
            days_to_maturity: self.days_to_maturity.days(),
            created_at: self.lifecycle.created_at(),
            updated_at: self.lifecycle.updated_at(),
            deleted_at: self.lifecycle.deleted_at(),
        }
    }

    fn from_primitives(p: CropVarietyPrimitives) -> Result<Self, EntityError> {
        Ok(Self {
            id: p.id,
            name: Name::new("name", &p.name)?,
            category: p.category,
            days_to_maturity: DaysToMaturity::new(p.days_to_maturity)?,
            lifecycle: Lifecycle::restore(p.created_at, p.updated_at, p.deleted_at),
        })
    }

    fn update(&self, changes: UpdateCropVariety) -> Result<Transition<Self>, EntityError> {
        self.ensure_live()?;

        let name = match changes.name {
            Some(name) => Name::new("name", name)?,
            None => self.name.clone(),
        };
        let days_to_maturity = match changes.days_to_maturity {
            Some(days) => DaysToMaturity::new(days)?,
            None => self.days_to_maturity,
        };

        let variety = Self {
            name,
            category: changes.category.unwrap_or(self.category),
            days_to_maturity,
            lifecycle: self.lifecycle.touched(Utc::now()),
            ..self.clone()
        };

        let event = CropVarietyEvent::Updated(CropVarietyUpdated {
            meta: EventMeta::new(variety.id, variety.lifecycle.updated_at()),
            name: variety.name.to_string(),
            category: variety.category,
            days_to_maturity: variety.days_to_maturity.days(),
        });
        Ok(Transition::with_event(variety, event))
    }

    fn delete(&self) -> Transition<Self> {
        let lifecycle = self.lifecycle.deleted(Utc::now());
        let deleted_at = lifecycle.deleted_at().unwrap_or(lifecycle.updated_at());
        let variety = Self {
            lifecycle,
            ..self.clone()
        };
        let event = CropVarietyEvent::Deleted(CropVarietyDeleted {
            meta: EventMeta::new(variety.id, deleted_at),
            deleted_at,
        });
        Transition::with_event(variety, event)
    }
}

impl Factory for CropVariety {
    type Input = CreateCropVariety;

    fn create(input: CreateCropVariety) -> Result<Transition<Self>, EntityError> {
        let now = Utc::now();
        let variety = Self {
            id: AggregateId::new(),
            name: Name::new("name", &input.name)?,
            category: input.category,
            days_to_maturity: DaysToMaturity::new(input.days_to_maturity)?,
            lifecycle: Lifecycle::started(now),
        };

        let event = CropVarietyEvent::Created(CropVarietyCreated {
            meta: EventMeta::new(variety.id, now),
            name: variety.name.to_string(),
            category: variety.category,
            days_to_maturity: variety.days_to_maturity.days(),
        });
        Ok(Transition::with_event(variety, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_out_of_range_maturity() {
        let result = CropVariety::create(CreateCropVariety::new(
            "Everlasting",
            CropCategory::Flower,
            731,
        ));
        assert!(matches!(result, Err(EntityError::Validation(_))));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let variety = CropVariety::create(CreateCropVariety::new(
            "Early Nantes",
            CropCategory::Vegetable,
            70,
        ))
        .unwrap()
        .into_entity();

        let changes = UpdateCropVariety {
            days_to_maturity: Some(65),
            ..UpdateCropVariety::default()
        };
        let updated = variety.update(changes).unwrap().into_entity();

        assert_eq!(updated.days_to_maturity().days(), 65);
        assert_eq!(updated.name().as_str(), "Early Nantes");
        assert_eq!(updated.category(), CropCategory::Vegetable);
    }

    #[test]
    fn stored_record_with_unknown_category_is_rejected() {
        let variety = CropVariety::create(CreateCropVariety::new("Basil", CropCategory::Herb, 30))
            .unwrap()
            .into_entity();
        let mut json = serde_json::to_value(variety.to_primitives()).unwrap();
        json["category"] = serde_json::json!("mineral");

        assert!(serde_json::from_value::<CropVarietyPrimitives>(json).is_err());
    }
}
