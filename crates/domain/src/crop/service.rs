//! Crop service and projection.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::crop_variety::CropVariety;
use crate::error::DomainError;
use crate::plot::Plot;
use crate::query::QueryHandler;
use crate::value_objects::CropStatus;

use super::{CreateCrop, Crop, UpdateCrop};

/// Read model returned by crop operations.
///
/// Variety details are filled in when the variety could be resolved; they are
/// left empty for a deleted crop or a variety that no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CropView {
    pub id: AggregateId,
    pub plot_id: AggregateId,
    pub variety_id: AggregateId,
    pub variety_name: Option<String>,
    pub planted_on: NaiveDate,
    pub expected_harvest_on: Option<NaiveDate>,
    pub status: CropStatus,
    pub quantity: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CropView {
    pub fn new(crop: &Crop, variety: Option<&CropVariety>) -> Self {
        let lifecycle = crop.lifecycle();
        Self {
            id: crop.id(),
            plot_id: crop.plot_id(),
            variety_id: crop.variety_id(),
            variety_name: variety.map(|v| v.name().to_string()),
            planted_on: crop.planted_on(),
            expected_harvest_on: variety
                .and_then(|v| crop.expected_harvest_on(v.days_to_maturity())),
            status: crop.status(),
            quantity: crop.quantity().map(|q| q.value()),
            created_at: lifecycle.created_at(),
            updated_at: lifecycle.updated_at(),
            deleted_at: lifecycle.deleted_at(),
        }
    }
}

/// Service for crop operations.
///
/// The plot and the variety a command references are resolved before any
/// write; an unknown or deleted one fails the command with `NotFound`.
#[derive(Clone)]
pub struct CropService {
    commands: CommandHandler<Crop>,
    crops: QueryHandler<Crop>,
    plots: QueryHandler<Plot>,
    varieties: QueryHandler<CropVariety>,
}

impl CropService {
    pub fn new(
        commands: CommandHandler<Crop>,
        crops: QueryHandler<Crop>,
        plots: QueryHandler<Plot>,
        varieties: QueryHandler<CropVariety>,
    ) -> Self {
        Self {
            commands,
            crops,
            plots,
            varieties,
        }
    }

    #[tracing::instrument(skip(self), fields(plot_id = %cmd.plot_id, variety_id = %cmd.variety_id))]
    pub async fn create(&self, cmd: CreateCrop) -> Result<CropView, DomainError> {
        self.plots.get_by_id(cmd.plot_id).await?;
        let variety = self.varieties.get_by_id(cmd.variety_id).await?;

        let result = self.commands.create(cmd).await?;
        Ok(CropView::new(&result.entity, Some(&variety)))
    }

    /// Applies partial changes. A new variety is resolved before the crop is touched.
    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: AggregateId, changes: UpdateCrop) -> Result<CropView, DomainError> {
        let new_variety = match changes.variety_id {
            Some(variety_id) => Some(self.varieties.get_by_id(variety_id).await?),
            None => None,
        };

        let result = self.commands.update(id, changes).await?;
        let variety = match new_variety {
            Some(variety) => Some(variety),
            None => self.varieties.find_by_id(result.entity.variety_id()).await?,
        };
        Ok(CropView::new(&result.entity, variety.as_ref()))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AggregateId) -> Result<CropView, DomainError> {
        let result = self.commands.delete(id).await?;
        Ok(CropView::new(&result.entity, None))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AggregateId) -> Result<CropView, DomainError> {
        let crop = self.crops.get_by_id(id).await?;
        let variety = self.varieties.find_by_id(crop.variety_id()).await?;
        Ok(CropView::new(&crop, variety.as_ref()))
    }

    /// Lists the live crops of a plot, resolving their varieties in one batch.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_plot(&self, plot_id: AggregateId) -> Result<Vec<CropView>, DomainError> {
        let crops = self.crops.list_by_parent(plot_id).await?;
        if crops.is_empty() {
            return Ok(Vec::new());
        }

        let variety_ids: Vec<AggregateId> = crops
            .iter()
            .map(Crop::variety_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let varieties: HashMap<AggregateId, CropVariety> = self
            .varieties
            .get_many(&variety_ids)
            .await?
            .into_iter()
            .map(|v| (v.id(), v))
            .collect();

        Ok(crops
            .iter()
            .map(|crop| CropView::new(crop, varieties.get(&crop.variety_id())))
            .collect())
    }
}
