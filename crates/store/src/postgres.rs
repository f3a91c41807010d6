use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{AggregateId, Document, DocumentQuery, Result, StoreError, store::DocumentStore};

const SELECT_COLUMNS: &str = "id, kind, parent_id, data, created_at, updated_at, deleted_at";

/// PostgreSQL-backed document store implementation.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    /// Creates a new PostgreSQL document store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_document(row: PgRow) -> Result<Document> {
        Ok(Document {
            id: AggregateId::from_uuid(row.try_get::<Uuid, _>("id")?),
            kind: row.try_get("kind")?,
            parent_id: row
                .try_get::<Option<Uuid>, _>("parent_id")?
                .map(AggregateId::from_uuid),
            data: row.try_get("data")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    /// Builds the WHERE/ORDER/LIMIT tail for a query.
    ///
    /// Parameters are numbered in the order `bind_query` binds them.
    fn filter_sql(query: &DocumentQuery) -> String {
        let mut sql = String::from(" FROM documents WHERE kind = $1 AND deleted_at IS NULL");
        let mut param_count = 1;

        if query.parent_id.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND parent_id = ${param_count}"));
        }
        if query.ids.is_some() {
            param_count += 1;
            sql.push_str(&format!(" AND id = ANY(${param_count})"));
        }

        sql.push_str(" ORDER BY created_at ASC, id ASC");

        if query.limit.is_some() {
            param_count += 1;
            sql.push_str(&format!(" LIMIT ${param_count}"));
        }
        if query.offset.is_some() {
            param_count += 1;
            sql.push_str(&format!(" OFFSET ${param_count}"));
        }
        sql
    }

    fn bind_query<'q>(
        mut sqlx_query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        query: DocumentQuery,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        sqlx_query = sqlx_query.bind(query.kind);
        if let Some(parent_id) = query.parent_id {
            sqlx_query = sqlx_query.bind(parent_id.as_uuid());
        }
        if let Some(ids) = query.ids {
            let ids: Vec<Uuid> = ids.into_iter().map(|id| id.as_uuid()).collect();
            sqlx_query = sqlx_query.bind(ids);
        }
        if let Some(limit) = query.limit {
            sqlx_query = sqlx_query.bind(limit as i64);
        }
        if let Some(offset) = query.offset {
            sqlx_query = sqlx_query.bind(offset as i64);
        }
        sqlx_query
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn upsert(&self, document: Document) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO documents (id, kind, parent_id, data, created_at, updated_at, deleted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                kind = EXCLUDED.kind,
                parent_id = EXCLUDED.parent_id,
                data = EXCLUDED.data,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at,
                deleted_at = EXCLUDED.deleted_at
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(&document.kind)
        .bind(document.parent_id.map(|id| id.as_uuid()))
        .bind(&document.data)
        .bind(document.created_at)
        .bind(document.updated_at)
        .bind(document.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, document: Document) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET parent_id = $3, data = $4, updated_at = $5, deleted_at = $6
            WHERE id = $1 AND kind = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(document.id.as_uuid())
        .bind(&document.kind)
        .bind(document.parent_id.map(|id| id.as_uuid()))
        .bind(&document.data)
        .bind(document.updated_at)
        .bind(document.deleted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DocumentNotFound {
                kind: document.kind,
                id: document.id,
            });
        }
        Ok(())
    }

    async fn find(&self, kind: &str, id: AggregateId) -> Result<Option<Document>> {
        let row: Option<PgRow> = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM documents WHERE id = $1 AND kind = $2 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .bind(kind)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_document).transpose()
    }

    async fn query(&self, query: DocumentQuery) -> Result<Vec<Document>> {
        let sql = format!("SELECT {SELECT_COLUMNS}{}", Self::filter_sql(&query));
        let rows = Self::bind_query(sqlx::query(&sql), query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Self::row_to_document).collect()
    }

    async fn query_ids(&self, query: DocumentQuery) -> Result<Vec<AggregateId>> {
        let sql = format!("SELECT id{}", Self::filter_sql(&query));
        let rows = Self::bind_query(sqlx::query(&sql), query)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| Ok(AggregateId::from_uuid(row.try_get::<Uuid, _>("id")?)))
            .collect()
    }

    async fn soft_delete(&self, kind: &str, id: AggregateId, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET deleted_at = $3, updated_at = $3
            WHERE id = $1 AND kind = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(kind)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
