//! Persistence port for aggregates and its document-store adapter.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use common::AggregateId;
use store::{Document, DocumentQuery, DocumentStore, DocumentStoreExt};

use crate::aggregate::Aggregate;
use crate::error::DomainError;

/// Persistence abstraction for one aggregate type.
///
/// Every read excludes soft-deleted entities. Failures propagate unchanged;
/// nothing here retries.
#[async_trait]
pub trait Repository<A: Aggregate>: Send + Sync {
    /// Inserts the entity, or replaces the stored one with the same id.
    async fn save(&self, entity: &A) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: AggregateId) -> Result<Option<A>, DomainError>;

    async fn find_all(&self) -> Result<Vec<A>, DomainError>;

    /// Returns the live entities among `ids`, in storage order.
    async fn find_many(&self, ids: &[AggregateId]) -> Result<Vec<A>, DomainError>;

    async fn find_by_parent(&self, parent_id: AggregateId) -> Result<Vec<A>, DomainError>;

    /// Returns only the ids of live entities owned by `parent_id`.
    async fn find_ids_by_parent(
        &self,
        parent_id: AggregateId,
    ) -> Result<Vec<AggregateId>, DomainError>;

    /// Replaces a live stored entity.
    async fn update(&self, entity: &A) -> Result<(), DomainError>;

    /// Soft-deletes at the store level. Returns false if nothing live matched.
    async fn delete(&self, id: AggregateId) -> Result<bool, DomainError>;
}

/// [`Repository`] backed by any [`DocumentStore`].
///
/// Entities are stored as their primitive record; the aggregate type name is
/// the document kind.
pub struct DocumentRepository<A, S> {
    store: S,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A, S> DocumentRepository<A, S>
where
    A: Aggregate,
    S: DocumentStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _aggregate: PhantomData,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn to_document(entity: &A) -> Result<Document, DomainError> {
        let lifecycle = entity.lifecycle();
        Ok(Document {
            id: entity.id(),
            kind: A::aggregate_type().to_string(),
            parent_id: entity.parent_id(),
            data: serde_json::to_value(entity.to_primitives())?,
            created_at: lifecycle.created_at(),
            updated_at: lifecycle.updated_at(),
            deleted_at: lifecycle.deleted_at(),
        })
    }

    fn from_document(document: Document) -> Result<A, DomainError> {
        let corrupt = |message: String| DomainError::Corrupt {
            aggregate_type: A::aggregate_type(),
            aggregate_id: document.id,
            message,
        };
        let primitives: A::Primitives =
            serde_json::from_value(document.data.clone()).map_err(|e| corrupt(e.to_string()))?;
        A::from_primitives(primitives).map_err(|e| corrupt(e.to_string()))
    }

    fn from_documents(documents: Vec<Document>) -> Result<Vec<A>, DomainError> {
        documents.into_iter().map(Self::from_document).collect()
    }
}

#[async_trait]
impl<A, S> Repository<A> for DocumentRepository<A, S>
where
    A: Aggregate,
    S: DocumentStore,
{
    async fn save(&self, entity: &A) -> Result<(), DomainError> {
        let document = Self::to_document(entity)?;
        self.store.upsert(document).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: AggregateId) -> Result<Option<A>, DomainError> {
        self.store
            .find(A::aggregate_type(), id)
            .await?
            .map(Self::from_document)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<A>, DomainError> {
        let documents = self.store.find_all(A::aggregate_type()).await?;
        Self::from_documents(documents)
    }

    async fn find_many(&self, ids: &[AggregateId]) -> Result<Vec<A>, DomainError> {
        let documents = self
            .store
            .find_many(A::aggregate_type(), ids.to_vec())
            .await?;
        Self::from_documents(documents)
    }

    async fn find_by_parent(&self, parent_id: AggregateId) -> Result<Vec<A>, DomainError> {
        let documents = self
            .store
            .find_by_parent(A::aggregate_type(), parent_id)
            .await?;
        Self::from_documents(documents)
    }

    async fn find_ids_by_parent(
        &self,
        parent_id: AggregateId,
    ) -> Result<Vec<AggregateId>, DomainError> {
        let ids = self
            .store
            .query_ids(DocumentQuery::new(A::aggregate_type()).parent_id(parent_id))
            .await?;
        Ok(ids)
    }

    async fn update(&self, entity: &A) -> Result<(), DomainError> {
        let document = Self::to_document(entity)?;
        self.store.update(document).await?;
        Ok(())
    }

    async fn delete(&self, id: AggregateId) -> Result<bool, DomainError> {
        let deleted = self
            .store
            .soft_delete(A::aggregate_type(), id, Utc::now())
            .await?;
        Ok(deleted)
    }
}
