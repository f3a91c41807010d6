//! Outbound delivery of farm domain events.
//!
//! - [`EventSubscriber`] trait for consumers of published envelopes
//! - [`FanOutPublisher`], the `EventPublisher` that hands each envelope to every subscriber
//! - [`LoggingSubscriber`] writing one structured log line per event
//! - [`EventCountsView`], a read model counting events by type

pub mod counts;
pub mod fan_out;
pub mod logging;
pub mod read_model;
pub mod subscriber;

pub use counts::EventCountsView;
pub use fan_out::FanOutPublisher;
pub use logging::LoggingSubscriber;
pub use read_model::ReadModel;
pub use subscriber::EventSubscriber;
