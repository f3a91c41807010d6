use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, EventMeta, Factory, Lifecycle, Transition};
use crate::error::EntityError;
use crate::value_objects::{Coordinates, Name};

use super::{CreateFarm, FarmCreated, FarmDeleted, FarmEvent, FarmUpdated, UpdateFarm};

/// A farm: the root that plots hang off.
#[derive(Debug, Clone, PartialEq)]
pub struct Farm {
    id: AggregateId,
    name: Name,
    location: Coordinates,
    owner: Option<Name>,
    lifecycle: Lifecycle,
}

/// Stored form of a farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmPrimitives {
    pub id: AggregateId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Farm {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn owner(&self) -> Option<&Name> {
        self.owner.as_ref()
    }

    fn owner_string(&self) -> Option<String> {
        self.owner.as_ref().map(Name::to_string)
    }
}

fn parse_owner(value: Option<&str>) -> Result<Option<Name>, EntityError> {
    Ok(value.map(|v| Name::new("owner", v)).transpose()?)
}

impl Aggregate for Farm {
    type Primitives = FarmPrimitives;
    type Changes = UpdateFarm;
    type Event = FarmEvent;

    fn aggregate_type() -> &'static str {
        "Farm"
    }

    fn id(&self) -> AggregateId {
        self.id
    }

    fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn to_primitives(&self) -> FarmPrimitives {
        FarmPrimitives {
            id: self.id,
            name: self.name.to_string(),
            latitude: self.location.latitude(),
            longitude: self.location.longitude(),
            owner: self.owner_string(),
            created_at: self.lifecycle.created_at(),
            updated_at: self.lifecycle.updated_at(),
            deleted_at: self.lifecycle.deleted_at(),
        }
    }

    fn from_primitives(p: FarmPrimitives) -> Result<Self, EntityError> {
        Ok(Self {
            id: p.id,
            name: Name::new("name", &p.name)?,
            location: Coordinates::new(p.latitude, p.longitude)?,
            owner: parse_owner(p.owner.as_deref())?,
            lifecycle: Lifecycle::restore(p.created_at, p.updated_at, p.deleted_at),
        })
    }

    fn update(&self, changes: UpdateFarm) -> Result<Transition<Self>, EntityError> {
        self.ensure_live()?;

        let name = match changes.name {
            Some(name) => Name::new("name", name)?,
            None => self.name.clone(),
        };
        let location = Coordinates::new(
            changes.latitude.unwrap_or(self.location.latitude()),
            changes.longitude.unwrap_or(self.location.longitude()),
        )?;
        let owner = match changes.owner {
            Some(value) => parse_owner(value.as_deref())?,
            None => self.owner.clone(),
        };

        let farm = Self {
            name,
            location,
            owner,
            lifecycle: self.lifecycle.touched(Utc::now()),
            ..self.clone()
        };

        let event = FarmEvent::Updated(FarmUpdated {
            meta: EventMeta::new(farm.id, farm.lifecycle.updated_at()),
            name: farm.name.to_string(),
            latitude: farm.location.latitude(),
            longitude: farm.location.longitude(),
            owner: farm.owner_string(),
        });
        Ok(Transition::with_event(farm, event))
    }

    fn delete(&self) -> Transition<Self> {
        let lifecycle = self.lifecycle.deleted(Utc::now());
        let deleted_at = lifecycle.deleted_at().unwrap_or(lifecycle.updated_at());
        let farm = Self {
            lifecycle,
            ..self.clone()
        };
        let event = FarmEvent::Deleted(FarmDeleted {
            meta: EventMeta::new(farm.id, deleted_at),
            deleted_at,
        });
        Transition::with_event(farm, event)
    }
}

impl Factory for Farm {
    type Input = CreateFarm;

    fn create(input: CreateFarm) -> Result<Transition<Self>, EntityError> {
        let now = Utc::now();
        let farm = Self {
            id: AggregateId::new(),
            name: Name::new("name", &input.name)?,
            location: Coordinates::new(input.latitude, input.longitude)?,
            owner: parse_owner(input.owner.as_deref())?,
            lifecycle: Lifecycle::started(now),
        };

        let event = FarmEvent::Created(FarmCreated {
            meta: EventMeta::new(farm.id, now),
            name: farm.name.to_string(),
            latitude: farm.location.latitude(),
            longitude: farm.location.longitude(),
            owner: farm.owner_string(),
        });
        Ok(Transition::with_event(farm, event))
    }
}
