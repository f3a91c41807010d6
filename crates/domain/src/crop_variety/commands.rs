//! Crop variety commands.

use crate::value_objects::CropCategory;

/// Command to register a crop variety.
#[derive(Debug, Clone)]
pub struct CreateCropVariety {
    pub name: String,
    pub category: CropCategory,
    pub days_to_maturity: u16,
}

impl CreateCropVariety {
    pub fn new(name: impl Into<String>, category: CropCategory, days_to_maturity: u16) -> Self {
        Self {
            name: name.into(),
            category,
            days_to_maturity,
        }
    }
}

/// Partial changes to a crop variety.
#[derive(Debug, Clone, Default)]
pub struct UpdateCropVariety {
    pub name: Option<String>,
    pub category: Option<CropCategory>,
    pub days_to_maturity: Option<u16>,
}
