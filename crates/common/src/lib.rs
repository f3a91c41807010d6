//! Shared types for the farm operations core.
//!
//! Identifiers and the serialized event envelope live here so that the
//! store, cache, domain and publisher crates agree on them without
//! depending on each other.

pub mod envelope;
pub mod types;

pub use envelope::EventEnvelope;
pub use types::{AggregateId, EventId, ParseIdError};
