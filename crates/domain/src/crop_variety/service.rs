use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::query::QueryHandler;
use crate::value_objects::CropCategory;

use super::{CreateCropVariety, CropVariety, UpdateCropVariety};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropVarietyView {
    pub id: AggregateId,
    pub name: String,
    pub category: CropCategory,
    pub days_to_maturity: u16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&CropVariety> for CropVarietyView {
    fn from(variety: &CropVariety) -> Self {
        let lifecycle = variety.lifecycle();
        Self {
            id: variety.id(),
            name: variety.name().to_string(),
            category: variety.category(),
            days_to_maturity: variety.days_to_maturity().days(),
            created_at: lifecycle.created_at(),
            updated_at: lifecycle.updated_at(),
            deleted_at: lifecycle.deleted_at(),
        }
    }
}

/// Service for the crop variety catalogue.
#[derive(Clone)]
pub struct CropVarietyService {
    commands: CommandHandler<CropVariety>,
    varieties: QueryHandler<CropVariety>,
}

impl CropVarietyService {
    pub fn new(
        commands: CommandHandler<CropVariety>,
        varieties: QueryHandler<CropVariety>,
    ) -> Self {
        Self {
            commands,
            varieties,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn create(&self, cmd: CreateCropVariety) -> Result<CropVarietyView, DomainError> {
        let result = self.commands.create(cmd).await?;
        Ok(CropVarietyView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(
        &self,
        id: AggregateId,
        changes: UpdateCropVariety,
    ) -> Result<CropVarietyView, DomainError> {
        let result = self.commands.update(id, changes).await?;
        Ok(CropVarietyView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AggregateId) -> Result<CropVarietyView, DomainError> {
        let result = self.commands.delete(id).await?;
        Ok(CropVarietyView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AggregateId) -> Result<CropVarietyView, DomainError> {
        let variety = self.varieties.get_by_id(id).await?;
        Ok(CropVarietyView::from(&variety))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CropVarietyView>, DomainError> {
        let varieties = self.varieties.list_all().await?;
        Ok(varieties.iter().map(CropVarietyView::from).collect())
    }
}
