//! Plot aggregate and related types.

mod aggregate;
mod commands;
mod events;
mod service;

pub use aggregate::{Plot, PlotPrimitives};
pub use commands::{CreatePlot, UpdatePlot};
pub use events::{PlotCreated, PlotDeleted, PlotEvent, PlotUpdated};
pub use service::{PlotService, PlotView};
