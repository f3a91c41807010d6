use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{
    AggregateId, Document, DocumentQuery, Result, StoreError,
    store::{DocumentStore, sort_documents},
};

/// In-memory document store implementation.
///
/// Provides the same interface and soft-delete filtering as the PostgreSQL
/// implementation. Clones share the same underlying map.
#[derive(Clone, Default)]
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<HashMap<AggregateId, Document>>>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored documents, including soft-deleted ones.
    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    /// Returns a stored document regardless of its deletion state.
    pub async fn raw(&self, id: AggregateId) -> Option<Document> {
        self.documents.read().await.get(&id).cloned()
    }

    /// Returns how many read calls (`find`, `query`, `query_ids`) have been served.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Removes all documents.
    pub async fn clear(&self) {
        self.documents.write().await.clear();
    }

    fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::SeqCst);
    }

    fn matching(documents: &HashMap<AggregateId, Document>, query: &DocumentQuery) -> Vec<Document> {
        let mut matched: Vec<_> = documents
            .values()
            .filter(|d| {
                if d.kind != query.kind || d.is_deleted() {
                    return false;
                }
                if let Some(parent_id) = query.parent_id
                    && d.parent_id != Some(parent_id)
                {
                    return false;
                }
                if let Some(ref ids) = query.ids
                    && !ids.contains(&d.id)
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        sort_documents(&mut matched);

        let offset = query.offset.unwrap_or(0);
        let matched = matched.into_iter().skip(offset);
        match query.limit {
            Some(limit) => matched.take(limit).collect(),
            None => matched.collect(),
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(&self, document: Document) -> Result<()> {
        self.documents.write().await.insert(document.id, document);
        Ok(())
    }

    async fn update(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&document.id) {
            Some(existing) if existing.kind == document.kind && !existing.is_deleted() => {
                *existing = document;
                Ok(())
            }
            _ => Err(StoreError::DocumentNotFound {
                kind: document.kind,
                id: document.id,
            }),
        }
    }

    async fn find(&self, kind: &str, id: AggregateId) -> Result<Option<Document>> {
        self.record_read();
        let documents = self.documents.read().await;
        Ok(documents
            .get(&id)
            .filter(|d| d.kind == kind && !d.is_deleted())
            .cloned())
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        self.record_read();
        let documents = self.documents.read().await;
        Ok(Self::matching(&documents, &query))
    }

    async fn query_ids(&self, query: DocumentQuery) -> Result<Vec<AggregateId>> {
        self.record_read();
        let documents = self.documents.read().await;
        Ok(Self::matching(&documents, &query)
            .into_iter()
            .map(|d| d.id)
            .collect())
    }

    async fn soft_delete(&self, kind: &str, id: AggregateId, at: DateTime<Utc>) -> Result<bool> {
        let mut documents = self.documents.write().await;
        match documents.get_mut(&id) {
            Some(document) if document.kind == kind && !document.is_deleted() => {
                document.deleted_at = Some(at);
                document.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DocumentStoreExt;
    use chrono::Duration;

    fn document(kind: &str, parent_id: Option<AggregateId>) -> Document {
        let now = Utc::now();
        Document {
            id: AggregateId::new(),
            kind: kind.to_string(),
            parent_id,
            data: serde_json::json!({"name": "test"}),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn upsert_then_find() {
        let store = InMemoryDocumentStore::new();
        let doc = document("Plot", None);

        store.upsert(doc.clone()).await.unwrap();

        let found = store.find("Plot", doc.id).await.unwrap();
        assert_eq!(found, Some(doc));
    }

    #[tokio::test]
    async fn upsert_replaces_existing() {
        let store = InMemoryDocumentStore::new();
        let mut doc = document("Plot", None);
        store.upsert(doc.clone()).await.unwrap();

        doc.data = serde_json::json!({"name": "renamed"});
        store.upsert(doc.clone()).await.unwrap();

        assert_eq!(store.document_count().await, 1);
        let found = store.find("Plot", doc.id).await.unwrap().unwrap();
        assert_eq!(found.data["name"], "renamed");
    }

    #[tokio::test]
    async fn find_respects_kind() {
        let store = InMemoryDocumentStore::new();
        let doc = document("Plot", None);
        store.upsert(doc.clone()).await.unwrap();

        assert!(store.find("Crop", doc.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_requires_live_document() {
        let store = InMemoryDocumentStore::new();
        let doc = document("Farm", None);

        let result = store.update(doc.clone()).await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound { .. })));

        store.upsert(doc.clone()).await.unwrap();
        store.soft_delete("Farm", doc.id, Utc::now()).await.unwrap();

        let result = store.update(doc).await;
        assert!(matches!(result, Err(StoreError::DocumentNotFound { .. })));
    }

    #[tokio::test]
    async fn soft_deleted_documents_are_hidden_from_reads() {
        let store = InMemoryDocumentStore::new();
        let parent = AggregateId::new();
        let live = document("Crop", Some(parent));
        let gone = document("Crop", Some(parent));
        store.upsert(live.clone()).await.unwrap();
        store.upsert(gone.clone()).await.unwrap();

        assert!(store.soft_delete("Crop", gone.id, Utc::now()).await.unwrap());

        assert!(store.find("Crop", gone.id).await.unwrap().is_none());
        assert_eq!(store.find_all("Crop").await.unwrap(), vec![live.clone()]);
        assert_eq!(
            store.find_by_parent("Crop", parent).await.unwrap(),
            vec![live.clone()]
        );
        assert_eq!(
            store
                .query_ids(DocumentQuery::new("Crop").parent_id(parent))
                .await
                .unwrap(),
            vec![live.id]
        );

        // The row itself is retained.
        let raw = store.raw(gone.id).await.unwrap();
        assert!(raw.deleted_at.is_some());
    }

    #[tokio::test]
    async fn soft_delete_twice_reports_no_change() {
        let store = InMemoryDocumentStore::new();
        let doc = document("Plot", None);
        store.upsert(doc.clone()).await.unwrap();

        assert!(store.soft_delete("Plot", doc.id, Utc::now()).await.unwrap());
        assert!(!store.soft_delete("Plot", doc.id, Utc::now()).await.unwrap());
        assert!(
            !store
                .soft_delete("Plot", AggregateId::new(), Utc::now())
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn query_orders_oldest_first_with_paging() {
        let store = InMemoryDocumentStore::new();
        let base = Utc::now();
        let mut ids = Vec::new();
        for i in 0..5 {
            let mut doc = document("Farm", None);
            doc.created_at = base + Duration::seconds(i);
            ids.push(doc.id);
            store.upsert(doc).await.unwrap();
        }

        let page = store
            .query_ids(DocumentQuery::new("Farm").offset(1).limit(2))
            .await
            .unwrap();
        assert_eq!(page, vec![ids[1], ids[2]]);
    }

    #[tokio::test]
    async fn find_many_filters_by_ids() {
        let store = InMemoryDocumentStore::new();
        let a = document("Plot", None);
        let b = document("Plot", None);
        store.upsert(a.clone()).await.unwrap();
        store.upsert(b.clone()).await.unwrap();

        let found = store
            .find_many("Plot", vec![b.id, AggregateId::new()])
            .await
            .unwrap();
        assert_eq!(found, vec![b]);

        assert!(store.find_many("Plot", vec![]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_count_tracks_reads_only() {
        let store = InMemoryDocumentStore::new();
        let doc = document("Plot", None);
        store.upsert(doc.clone()).await.unwrap();
        assert_eq!(store.read_count(), 0);

        store.find("Plot", doc.id).await.unwrap();
        store.find_all("Plot").await.unwrap();
        assert_eq!(store.read_count(), 2);
    }
}
