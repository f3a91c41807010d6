//! Crop commands.

use chrono::NaiveDate;
use common::AggregateId;

use crate::value_objects::CropStatus;

/// Command to plant (or plan) a crop on a plot.
#[derive(Debug, Clone)]
pub struct CreateCrop {
    /// The plot the crop grows on.
    pub plot_id: AggregateId,

    /// The variety being grown. Must resolve to a live variety.
    pub variety_id: AggregateId,

    pub planted_on: NaiveDate,
    pub status: CropStatus,
    pub quantity: Option<u32>,
}

impl CreateCrop {
    pub fn new(plot_id: AggregateId, variety_id: AggregateId, planted_on: NaiveDate) -> Self {
        Self {
            plot_id,
            variety_id,
            planted_on,
            status: CropStatus::Planned,
            quantity: None,
        }
    }

    pub fn with_status(mut self, status: CropStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }
}

/// Partial changes to a crop.
///
/// `quantity: Some(None)` clears the quantity.
#[derive(Debug, Clone, Default)]
pub struct UpdateCrop {
    pub variety_id: Option<AggregateId>,
    pub planted_on: Option<NaiveDate>,
    pub status: Option<CropStatus>,
    pub quantity: Option<Option<u32>>,
}

impl UpdateCrop {
    pub fn status(status: CropStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Records a harvest of `quantity` units.
    pub fn harvest(quantity: u32) -> Self {
        Self {
            status: Some(CropStatus::Harvested),
            quantity: Some(Some(quantity)),
            ..Self::default()
        }
    }
}
