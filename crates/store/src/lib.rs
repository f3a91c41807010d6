//! Durable persistence for aggregate documents.
//!
//! Every aggregate is stored as one JSON document keyed by its identifier.
//! Deletion is logical: a document with `deleted_at` set is invisible to
//! every read this crate offers.

pub mod document;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod store;

pub use common::AggregateId;
pub use document::Document;
pub use error::{Result, StoreError};
pub use memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::DocumentQuery;
pub use store::{DocumentStore, DocumentStoreExt};
