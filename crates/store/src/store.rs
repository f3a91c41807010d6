use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{AggregateId, Document, DocumentQuery, Result};

/// Core trait for document store implementations.
///
/// Every read excludes documents whose `deleted_at` is set. Writes are
/// atomic per call only; nothing here spans a read-modify-write cycle.
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Inserts the document, or replaces the stored one with the same id.
    async fn upsert(&self, document: Document) -> Result<()>;

    /// Replaces a live document.
    ///
    /// Fails with `DocumentNotFound` if no live document of that kind and id exists.
    async fn update(&self, document: Document) -> Result<()>;

    /// Retrieves a live document by id.
    async fn find(&self, kind: &str, id: AggregateId) -> Result<Option<Document>>;

    /// Retrieves live documents matching a query, oldest first.
    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>>;

    /// Retrieves only the ids of live documents matching a query, oldest first.
    async fn query_ids(&self, query: DocumentQuery) -> Result<Vec<AggregateId>>;

    /// Marks a live document as deleted at the given time.
    ///
    /// Returns false if there was no live document to delete.
    async fn soft_delete(&self, kind: &str, id: AggregateId, at: DateTime<Utc>) -> Result<bool>;
}

/// Extension trait providing convenience methods for document stores.
#[async_trait]
pub trait DocumentStoreExt: DocumentStore {
    /// Retrieves every live document of a kind.
    async fn find_all(&self, kind: &str) -> Result<Vec<Document>> {
        self.query(DocumentQuery::new(kind)).await
    }

    /// Retrieves the live documents owned by a parent aggregate.
    async fn find_by_parent(&self, kind: &str, parent_id: AggregateId) -> Result<Vec<Document>> {
        self.query(DocumentQuery::new(kind).parent_id(parent_id))
            .await
    }

    /// Retrieves the live documents among the given ids.
    async fn find_many(&self, kind: &str, ids: Vec<AggregateId>) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.query(DocumentQuery::new(kind).ids(ids)).await
    }

    /// Checks if a live document exists.
    async fn exists(&self, kind: &str, id: AggregateId) -> Result<bool> {
        Ok(self.find(kind, id).await?.is_some())
    }
}

// Blanket implementation for all DocumentStore implementations
impl<T: DocumentStore + ?Sized> DocumentStoreExt for T {}

/// Sorts documents in the order every store returns them.
pub(crate) fn sort_documents(documents: &mut [Document]) {
    documents.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then(a.id.as_uuid().cmp(&b.id.as_uuid()))
    });
}
