//! Composition root: binds the store, cache and publisher to every service.

use std::sync::Arc;

use cache::InMemoryCacheBackend;
use domain::{CacheWritePolicy, Engine, Services};
use publisher::{EventCountsView, FanOutPublisher, LoggingSubscriber};
use sqlx::postgres::PgPoolOptions;
use store::{DocumentStore, InMemoryDocumentStore, PostgresDocumentStore};

use crate::config::Config;
use crate::error::ServerError;

const MAX_DB_CONNECTIONS: u32 = 10;

/// Every long-lived component of the running process.
#[derive(Clone)]
pub struct AppContainer {
    pub services: Services,
    pub event_counts: EventCountsView,
    pub store_kind: &'static str,
    pub cache_write_policy: CacheWritePolicy,
}

impl AppContainer {
    /// Wires services over the given store, an in-memory cache backend and a
    /// fan-out publisher with the logging and counting subscribers.
    pub fn build<S>(store: S, store_kind: &'static str, config: &Config) -> Self
    where
        S: DocumentStore + Clone + 'static,
    {
        let event_counts = EventCountsView::new();
        let publisher = FanOutPublisher::new()
            .with_subscriber(Arc::new(LoggingSubscriber::new()))
            .with_subscriber(Arc::new(event_counts.clone()));

        let services = Engine::new(store, InMemoryCacheBackend::new(), Arc::new(publisher))
            .with_cache_config(config.cache.clone())
            .with_cache_policy(config.cache_write_policy)
            .services();

        Self {
            services,
            event_counts,
            store_kind,
            cache_write_policy: config.cache_write_policy,
        }
    }

    pub fn in_memory(config: &Config) -> Self {
        Self::build(InMemoryDocumentStore::new(), "memory", config)
    }

    /// Selects the store from `DATABASE_URL`: PostgreSQL when set, with
    /// migrations applied, otherwise in memory.
    pub async fn from_config(config: &Config) -> Result<Self, ServerError> {
        let Some(url) = config.database_url.as_deref() else {
            tracing::warn!("DATABASE_URL not set, documents are kept in memory");
            return Ok(Self::in_memory(config));
        };

        let pool = PgPoolOptions::new()
            .max_connections(MAX_DB_CONNECTIONS)
            .connect(url)
            .await?;
        let store = PostgresDocumentStore::new(pool);
        store.run_migrations().await?;
        tracing::info!("connected to PostgreSQL document store");

        Ok(Self::build(store, "postgres", config))
    }
}
