//! Farm aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::{Farm, FarmPrimitives};
pub use commands::{CreateFarm, UpdateFarm};
pub use events::{FarmCreated, FarmDeleted, FarmEvent, FarmUpdated};
pub use service::{FarmService, FarmView};
