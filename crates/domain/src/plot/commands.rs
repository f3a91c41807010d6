//! Plot commands.

use common::AggregateId;

use crate::value_objects::SoilType;

/// Command to create a new plot on a farm.
#[derive(Debug, Clone)]
pub struct CreatePlot {
    /// The farm the plot belongs to.
    pub farm_id: AggregateId,

    pub name: String,

    /// Width in metres.
    pub width: f64,

    /// Length in metres.
    pub length: f64,

    pub soil_type: SoilType,
}

impl CreatePlot {
    pub fn new(
        farm_id: AggregateId,
        name: impl Into<String>,
        width: f64,
        length: f64,
        soil_type: SoilType,
    ) -> Self {
        Self {
            farm_id,
            name: name.into(),
            width,
            length,
            soil_type,
        }
    }
}

/// Partial changes to a plot. Absent fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct UpdatePlot {
    pub name: Option<String>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub soil_type: Option<SoilType>,
}

impl UpdatePlot {
    /// Changes only the name.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Changes only the dimensions.
    pub fn resize(width: f64, length: f64) -> Self {
        Self {
            width: Some(width),
            length: Some(length),
            ..Self::default()
        }
    }
}
