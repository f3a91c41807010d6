//! Crop aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::{Crop, CropPrimitives};
pub use commands::{CreateCrop, UpdateCrop};
pub use events::{CropCreated, CropDeleted, CropEvent, CropUpdated};
pub use service::{CropService, CropView};
