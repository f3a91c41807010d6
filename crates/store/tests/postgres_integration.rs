//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container and need a Docker daemon,
//! so they are ignored by default. Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --ignored
//! ```

use std::sync::Arc;

use chrono::{Duration, Utc};
use serial_test::serial;
use sqlx::PgPool;
use store::{
    AggregateId, Document, DocumentQuery, DocumentStore, DocumentStoreExt, PostgresDocumentStore,
    StoreError,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_documents_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and a cleared table
async fn get_test_store() -> PostgresDocumentStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE documents")
        .execute(&pool)
        .await
        .unwrap();

    PostgresDocumentStore::new(pool)
}

fn document(kind: &str, parent_id: Option<AggregateId>) -> Document {
    // Postgres keeps microseconds; truncate so round-trips compare equal.
    let now = Utc::now();
    let now = now - Duration::nanoseconds(now.timestamp_subsec_nanos() as i64 % 1000);
    Document {
        id: AggregateId::new(),
        kind: kind.to_string(),
        parent_id,
        data: serde_json::json!({"name": "North Field", "width": 10.0}),
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn upsert_and_find() {
    let store = get_test_store().await;
    let doc = document("Plot", Some(AggregateId::new()));

    store.upsert(doc.clone()).await.unwrap();

    let found = store.find("Plot", doc.id).await.unwrap();
    assert_eq!(found, Some(doc));
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn upsert_overwrites_existing_row() {
    let store = get_test_store().await;
    let mut doc = document("Farm", None);
    store.upsert(doc.clone()).await.unwrap();

    doc.data = serde_json::json!({"name": "Renamed"});
    store.upsert(doc.clone()).await.unwrap();

    let all = store.find_all("Farm").await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data["name"], "Renamed");
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn update_missing_row_is_not_found() {
    let store = get_test_store().await;
    let result = store.update(document("Crop", None)).await;
    assert!(matches!(result, Err(StoreError::DocumentNotFound { .. })));
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn soft_delete_hides_rows_from_every_read() {
    let store = get_test_store().await;
    let parent = AggregateId::new();
    let live = document("Crop", Some(parent));
    let gone = document("Crop", Some(parent));
    store.upsert(live.clone()).await.unwrap();
    store.upsert(gone.clone()).await.unwrap();

    assert!(store.soft_delete("Crop", gone.id, Utc::now()).await.unwrap());
    assert!(!store.soft_delete("Crop", gone.id, Utc::now()).await.unwrap());

    assert!(store.find("Crop", gone.id).await.unwrap().is_none());
    assert_eq!(store.find_all("Crop").await.unwrap().len(), 1);
    assert_eq!(
        store
            .query_ids(DocumentQuery::new("Crop").parent_id(parent))
            .await
            .unwrap(),
        vec![live.id]
    );
}

#[tokio::test]
#[serial]
#[ignore = "requires docker"]
async fn find_many_and_paging() {
    let store = get_test_store().await;
    let mut ids = Vec::new();
    for i in 0..4 {
        let mut doc = document("Plot", None);
        doc.created_at += Duration::seconds(i);
        ids.push(doc.id);
        store.upsert(doc).await.unwrap();
    }

    let some = store
        .find_many("Plot", vec![ids[0], ids[3]])
        .await
        .unwrap();
    assert_eq!(some.len(), 2);

    let page = store
        .query_ids(DocumentQuery::new("Plot").limit(2).offset(1))
        .await
        .unwrap();
    assert_eq!(page, vec![ids[1], ids[2]]);
}
