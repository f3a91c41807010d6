//! Plot service and projection.

use chrono::{DateTime, Utc};
use common::AggregateId;
use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::command::{CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::farm::Farm;
use crate::query::QueryHandler;
use crate::value_objects::SoilType;

use super::{CreatePlot, Plot, UpdatePlot};

/// Read model returned by plot operations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotView {
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

impl From<&Plot> for PlotView {
    fn from(plot: &Plot) -> Self {
        let lifecycle = plot.lifecycle();
        Self {
            id: plot.id(),
            farm_id: plot.farm_id(),
            name: plot.name().to_string(),
            width: plot.width().value(),
            length: plot.length().value(),
            area: plot.area(),
            soil_type: plot.soil_type(),
            created_at: lifecycle.created_at(),
            updated_at: lifecycle.updated_at(),
            deleted_at: lifecycle.deleted_at(),
        }
    }
}

/// Service for plot operations.
///
/// Plots always belong to a live farm; the farm is resolved before a plot is
/// created.
#[derive(Clone)]
pub struct PlotService {
    commands: CommandHandler<Plot>,
    plots: QueryHandler<Plot>,
    farms: QueryHandler<Farm>,
}

impl PlotService {
    pub fn new(
        commands: CommandHandler<Plot>,
        plots: QueryHandler<Plot>,
        farms: QueryHandler<Farm>,
    ) -> Self {
        Self {
            commands,
            plots,
            farms,
        }
    }

    /// Creates a plot on an existing farm.
    #[tracing::instrument(skip(self), fields(farm_id = %cmd.farm_id))]
    pub async fn create(&self, cmd: CreatePlot) -> Result<PlotView, DomainError> {
        self.farms.get_by_id(cmd.farm_id).await?;
        let CommandResult { entity, .. } = self.commands.create(cmd).await?;
        Ok(PlotView::from(&entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn update(&self, id: AggregateId, changes: UpdatePlot) -> Result<PlotView, DomainError> {
        let result = self.commands.update(id, changes).await?;
        Ok(PlotView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: AggregateId) -> Result<PlotView, DomainError> {
        let result = self.commands.delete(id).await?;
        Ok(PlotView::from(&result.entity))
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: AggregateId) -> Result<PlotView, DomainError> {
        let plot = self.plots.get_by_id(id).await?;
        Ok(PlotView::from(&plot))
    }

    /// Lists the live plots of a farm, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_by_farm(&self, farm_id: AggregateId) -> Result<Vec<PlotView>, DomainError> {
        let plots = self.plots.list_by_parent(farm_id).await?;
        Ok(plots.iter().map(PlotView::from).collect())
    }
}
