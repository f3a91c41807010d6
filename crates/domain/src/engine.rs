//! Wiring of ports and handlers for every aggregate.

use std::sync::Arc;

use cache::{CacheBackend, CacheConfig};
use store::DocumentStore;

use crate::aggregate::Aggregate;
use crate::command::CommandHandler;
use crate::crop::{Crop, CropService};
use crate::crop_variety::{CropVariety, CropVarietyService};
use crate::entity_cache::{CachedEntities, EntityCache};
use crate::farm::{Farm, FarmService};
use crate::plot::{Plot, PlotService};
use crate::policy::CacheWritePolicy;
use crate::publisher::EventPublisher;
use crate::query::QueryHandler;
use crate::repository::{DocumentRepository, Repository};

/// Binds one store, one cache backend and one publisher to every aggregate.
///
/// Handlers built here share the adapters; each carries a span named after
/// its aggregate type.
#[derive(Clone)]
pub struct Engine<S, B> {
    store: S,
    backend: B,
    cache_config: CacheConfig,
    publisher: Arc<dyn EventPublisher>,
    cache_policy: CacheWritePolicy,
}

/// Every service, ready to use.
#[derive(Clone)]
pub struct Services {
    pub farms: FarmService,
    pub plots: PlotService,
    pub varieties: CropVarietyService,
    pub crops: CropService,
}

impl<S, B> Engine<S, B>
where
    S: DocumentStore + Clone + 'static,
    B: CacheBackend + Clone + 'static,
{
    pub fn new(store: S, backend: B, publisher: Arc<dyn EventPublisher>) -> Self {
        Self {
            store,
            backend,
            cache_config: CacheConfig::default(),
            publisher,
            cache_policy: CacheWritePolicy::default(),
        }
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn with_cache_policy(mut self, policy: CacheWritePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    pub fn repository<A: Aggregate>(&self) -> Arc<dyn Repository<A>> {
        Arc::new(DocumentRepository::<A, S>::new(self.store.clone()))
    }

    pub fn cache<A: Aggregate>(&self) -> Arc<dyn EntityCache<A>> {
        Arc::new(CachedEntities::<A, B>::new(
            self.backend.clone(),
            &self.cache_config,
        ))
    }

    /// Builds the command and query handlers for one aggregate type.
    pub fn handlers<A: Aggregate>(&self) -> (CommandHandler<A>, QueryHandler<A>) {
        let repository = self.repository::<A>();
        let cache = self.cache::<A>();
        let span = tracing::info_span!("aggregate", kind = A::aggregate_type());

        let commands = CommandHandler::new(
            Arc::clone(&repository),
            Arc::clone(&cache),
            Arc::clone(&self.publisher),
        )
        .with_cache_policy(self.cache_policy)
        .with_span(span.clone());
        let queries = QueryHandler::new(repository, cache)
            .with_cache_policy(self.cache_policy)
            .with_span(span);
        (commands, queries)
    }

    pub fn services(&self) -> Services {
        let (farm_commands, farm_queries) = self.handlers::<Farm>();
        let (plot_commands, plot_queries) = self.handlers::<Plot>();
        let (variety_commands, variety_queries) = self.handlers::<CropVariety>();
        let (crop_commands, crop_queries) = self.handlers::<Crop>();

        Services {
            farms: FarmService::new(farm_commands, farm_queries.clone()),
            plots: PlotService::new(plot_commands, plot_queries.clone(), farm_queries),
            varieties: CropVarietyService::new(variety_commands, variety_queries.clone()),
            crops: CropService::new(crop_commands, crop_queries, plot_queries, variety_queries),
        }
    }
}
