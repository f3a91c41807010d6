//! Crop variety aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::{CropVariety, CropVarietyPrimitives};
pub use commands::{CreateCropVariety, UpdateCropVariety};
pub use events::{CropVarietyCreated, CropVarietyDeleted, CropVarietyEvent, CropVarietyUpdated};
pub use service::{CropVarietyService, CropVarietyView};
