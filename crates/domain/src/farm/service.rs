use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::query::QueryHandler;

use super::{CreateFarm, Farm, UpdateFarm};

/// Read model returned by farm operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FarmView {
    pub id: AggregateId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&Farm> for FarmView {
    fn from(farm: &Farm) -> Self {
        let lifecycle = farm.lifecycle();
        Self {
            id: farm.id(),
            name: farm.name().to_string(),
            latitude: farm.location().latitude(),
            longitude: farm.location().longitude(),
            owner: farm.owner().map(|o| o.to_string()),
            created_at: lifecycle.created_at(),
            updated_at: lifecycle.updated_at(),
            deleted_at: lifecycle.deleted_at(),
        }
    }
}

/// Service for farm operations.
#[derive(Clone)]
pub struct FarmService {
    commands: CommandHandler<Farm>,
    farms: QueryHandler<Farm>,
}

impl FarmService {
    pub fn new(commands: CommandHandler<Farm>, farms: QueryHandler<Farm>) -> Self {
        Self { commands, farms }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, cmd: CreateFarm) -> Result<FarmView, DomainError> {
        let result = self.commands.create(cmd).await?;
        Ok(FarmView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: AggregateId, changes: UpdateFarm) -> Result<FarmView, DomainError> {
        let result = self.commands.update(id, changes).await?;
        Ok(FarmView::from(&result.entity))
    }

    /// Soft-deletes a farm. Its plots are left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AggregateId) -> Result<FarmView, DomainError> {
        let result = self.commands.delete(id).await?;
        Ok(FarmView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AggregateId) -> Result<FarmView, DomainError> {
        let farm = self.farms.get_by_id(id).await?;
        Ok(FarmView::from(&farm))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<FarmView>, DomainError> {
        let farms = self.farms.list_all().await?;
        Ok(farms.iter().map(FarmView::from).collect())
    }
}
