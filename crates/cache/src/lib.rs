//! Fast key/value cache used in front of the document store.
//!
//! This crate only deals in string keys and string values. Typed access,
//! key namespacing per aggregate and corruption handling live in the
//! domain crate's cache adapter.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;
pub mod pattern;

pub use backend::CacheBackend;
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use memory::{InMemoryCacheBackend, MAX_TTL};
