//! Aggregate lifecycle and cache-consistency engine for farm operations.
//!
//! This crate provides:
//! - Validated value objects and the immutable `Aggregate` trait, whose
//!   transitions return a `Transition` carrying the new entity and its events
//! - `Repository` and `EntityCache` ports with document-store and cache-backend adapters
//! - `CommandHandler` and `QueryHandler`, the write and cache-aside read paths
//! - `EventPublisher`, the outbound boundary for domain events
//! - The farm, plot, crop variety and crop aggregates with their services

pub mod aggregate;
pub mod command;
pub mod crop;
pub mod crop_variety;
pub mod engine;
pub mod entity_cache;
pub mod error;
pub mod farm;
pub mod plot;
pub mod policy;
pub mod publisher;
pub mod query;
pub mod repository;
pub mod value_objects;

pub use aggregate::{Aggregate, DomainEvent, EventMeta, Factory, Lifecycle, Transition};
pub use command::{CommandHandler, CommandResult};
pub use crop::{CreateCrop, Crop, CropEvent, CropService, CropView, UpdateCrop};
pub use crop_variety::{
    CreateCropVariety, CropVariety, CropVarietyEvent, CropVarietyService, CropVarietyView,
    UpdateCropVariety,
};
pub use engine::{Engine, Services};
pub use entity_cache::{CachedEntities, EntityCache};
pub use error::{DomainError, EntityError, ValidationError};
pub use farm::{CreateFarm, Farm, FarmEvent, FarmService, FarmView, UpdateFarm};
pub use plot::{CreatePlot, Plot, PlotEvent, PlotService, PlotView, UpdatePlot};
pub use policy::CacheWritePolicy;
pub use publisher::{EventPublisher, InMemoryEventPublisher, PublishError, to_envelope};
pub use query::QueryHandler;
pub use repository::{DocumentRepository, Repository};
pub use value_objects::{
    Coordinates, CropCategory, CropStatus, DaysToMaturity, Enumerated, Metres, Name, Quantity,
    SoilType,
};
