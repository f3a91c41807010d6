//! Port-interaction tests for the command and query handlers.
//!
//! The repository and cache are mocked so each test can state exactly
//! which port calls must, and must not, happen.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cache::CacheError;
use chrono::NaiveDate;
use common::AggregateId;
use domain::{
    Aggregate, CacheWritePolicy, CommandHandler, CreateCrop, Crop, DomainError, EntityCache, Factory,
    InMemoryEventPublisher, QueryHandler, Repository, UpdateCrop,
};
use mockall::{mock, predicate::eq};

mock! {
    CropRepository {}

    #[async_trait]
    impl Repository<Crop> for CropRepository {
        async fn save(&self, entity: &Crop) -> Result<(), DomainError>;
        async fn find_by_id(&self, id: AggregateId) -> Result<Option<Crop>, DomainError>;
        async fn find_all(&self) -> Result<Vec<Crop>, DomainError>;
        async fn find_many(&self, ids: &[AggregateId]) -> Result<Vec<Crop>, DomainError>;
        async fn find_by_parent(&self, parent_id: AggregateId) -> Result<Vec<Crop>, DomainError>;
        async fn find_ids_by_parent(&self, parent_id: AggregateId) -> Result<Vec<AggregateId>, DomainError>;
        async fn update(&self, entity: &Crop) -> Result<(), DomainError>;
        async fn delete(&self, id: AggregateId) -> Result<bool, DomainError>;
    }
}

mock! {
    CropCache {}

    #[async_trait]
    impl EntityCache<Crop> for CropCache {
        async fn get(&self, id: AggregateId) -> Result<Option<Crop>, CacheError>;
        async fn set(&self, entity: &Crop, ttl: Option<Duration>) -> Result<(), CacheError>;
        async fn remove(&self, id: AggregateId) -> Result<bool, CacheError>;
        async fn get_many(&self, ids: &[AggregateId]) -> Result<Vec<Crop>, CacheError>;
        async fn set_many(&self, entities: &[Crop], ttl: Option<Duration>) -> Result<(), CacheError>;
        async fn delete_many(&self, ids: &[AggregateId]) -> Result<usize, CacheError>;
        async fn get_keys(&self, pattern: &str) -> Result<Vec<String>, CacheError>;
        async fn expire(&self, id: AggregateId, ttl: Duration) -> Result<bool, CacheError>;
        async fn clear(&self) -> Result<usize, CacheError>;
    }
}

fn crop() -> Crop {
    let planted_on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    Crop::create(CreateCrop::new(AggregateId::new(), AggregateId::new(), planted_on))
        .unwrap()
        .into_entity()
}

fn handler(
    repository: MockCropRepository,
    cache: MockCropCache,
    publisher: &InMemoryEventPublisher,
) -> CommandHandler<Crop> {
    CommandHandler::new(
        Arc::new(repository),
        Arc::new(cache),
        Arc::new(publisher.clone()),
    )
}

#[tokio::test]
async fn deleting_missing_crop_never_touches_store_or_cache() {
    let id = AggregateId::new();

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_by_id()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(None));
    repository.expect_update().never();
    repository.expect_save().never();

    let mut cache = MockCropCache::new();
    cache.expect_remove().never();
    cache.expect_set().never();

    let publisher = InMemoryEventPublisher::new();
    let result = handler(repository, cache, &publisher).delete(id).await;

    assert!(matches!(
        result,
        Err(DomainError::NotFound {
            aggregate_type: "Crop",
            ..
        })
    ));
    assert!(publisher.published().await.is_empty());
}

#[tokio::test]
async fn delete_updates_store_then_removes_cache_entry() {
    let existing = crop();
    let id = existing.id();

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    repository
        .expect_update()
        .withf(|crop: &Crop| crop.lifecycle().is_deleted())
        .times(1)
        .returning(|_| Ok(()));

    let mut cache = MockCropCache::new();
    cache
        .expect_remove()
        .with(eq(id))
        .times(1)
        .returning(|_| Ok(true));
    cache.expect_set().never();

    let publisher = InMemoryEventPublisher::new();
    let result = handler(repository, cache, &publisher)
        .delete(id)
        .await
        .unwrap();

    assert!(result.entity.lifecycle().is_deleted());
    assert_eq!(publisher.event_types().await, vec!["CropDeleted"]);
}

#[tokio::test]
async fn store_failure_stops_before_cache_and_publish() {
    let existing = crop();
    let id = existing.id();

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    repository.expect_update().times(1).returning(move |_| {
        Err(DomainError::not_found("Crop", id))
    });

    let mut cache = MockCropCache::new();
    cache.expect_set().never();
    cache.expect_remove().never();

    let publisher = InMemoryEventPublisher::new();
    let result = handler(repository, cache, &publisher)
        .update(id, UpdateCrop::harvest(5))
        .await;

    assert!(result.is_err());
    assert!(publisher.published().await.is_empty());
}

#[tokio::test]
async fn best_effort_policy_invalidates_and_still_publishes() {
    let mut repository = MockCropRepository::new();
    repository.expect_save().times(1).returning(|_| Ok(()));

    let mut cache = MockCropCache::new();
    cache
        .expect_set()
        .times(1)
        .returning(|_, _| Err(CacheError::backend("connection reset")));
    cache.expect_remove().times(1).returning(|_| Ok(false));

    let publisher = InMemoryEventPublisher::new();
    let handler = handler(repository, cache, &publisher);
    assert_eq!(handler.cache_policy(), CacheWritePolicy::BestEffort);

    let planted_on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let result = handler
        .create(CreateCrop::new(AggregateId::new(), AggregateId::new(), planted_on))
        .await
        .unwrap();

    assert_eq!(result.events.len(), 1);
    assert_eq!(publisher.event_types().await, vec!["CropCreated"]);
}

#[tokio::test]
async fn strict_policy_surfaces_cache_failure_and_skips_publish() {
    let mut repository = MockCropRepository::new();
    repository.expect_save().times(1).returning(|_| Ok(()));

    let mut cache = MockCropCache::new();
    cache
        .expect_set()
        .times(1)
        .returning(|_, _| Err(CacheError::backend("connection reset")));
    cache.expect_remove().never();

    let publisher = InMemoryEventPublisher::new();
    let handler = handler(repository, cache, &publisher).with_cache_policy(CacheWritePolicy::Strict);

    let planted_on = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    let result = handler
        .create(CreateCrop::new(AggregateId::new(), AggregateId::new(), planted_on))
        .await;

    assert!(matches!(result, Err(DomainError::Cache(_))));
    assert!(publisher.published().await.is_empty());
}

#[tokio::test]
async fn query_hit_skips_repository() {
    let cached = crop();
    let id = cached.id();

    let mut repository = MockCropRepository::new();
    repository.expect_find_by_id().never();

    let mut cache = MockCropCache::new();
    cache
        .expect_get()
        .with(eq(id))
        .times(1)
        .returning(move |_| Ok(Some(cached.clone())));
    cache.expect_set().never();

    let queries = QueryHandler::new(Arc::new(repository), Arc::new(cache));
    let found = queries.get_by_id(id).await.unwrap();
    assert_eq!(found.id(), id);
}

#[tokio::test]
async fn query_miss_reads_repository_then_populates_cache() {
    let stored = crop();
    let id = stored.id();

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_by_id()
        .with(eq(id))
        .times(1)
        .returning(move |_| Ok(Some(stored.clone())));

    let mut cache = MockCropCache::new();
    cache.expect_get().times(1).returning(|_| Ok(None));
    cache
        .expect_set()
        .withf(move |crop: &Crop, ttl: &Option<Duration>| crop.id() == id && ttl.is_none())
        .times(1)
        .returning(|_, _| Ok(()));

    let queries = QueryHandler::new(Arc::new(repository), Arc::new(cache));
    queries.get_by_id(id).await.unwrap();
}

#[tokio::test]
async fn query_cache_read_failure_falls_back_to_repository() {
    let stored = crop();
    let id = stored.id();

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_by_id()
        .times(1)
        .returning(move |_| Ok(Some(stored.clone())));

    let mut cache = MockCropCache::new();
    cache
        .expect_get()
        .returning(|_| Err(CacheError::backend("timeout")));
    cache.expect_set().returning(|_, _| Ok(()));

    let queries = QueryHandler::new(Arc::new(repository), Arc::new(cache));
    assert_eq!(queries.get_by_id(id).await.unwrap().id(), id);
}

#[tokio::test]
async fn query_miss_everywhere_is_not_found() {
    let mut repository = MockCropRepository::new();
    repository.expect_find_by_id().returning(|_| Ok(None));

    let mut cache = MockCropCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache.expect_set().never();

    let queries = QueryHandler::new(Arc::new(repository), Arc::new(cache));
    assert!(matches!(
        queries.get_by_id(AggregateId::new()).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn get_many_fetches_only_cache_gaps() {
    let hit = crop();
    let gap = crop();
    let ids = vec![hit.id(), gap.id(), AggregateId::new()];
    let gap_id = gap.id();

    let mut cache = MockCropCache::new();
    cache
        .expect_get_many()
        .times(1)
        .returning(move |_| Ok(vec![hit.clone()]));
    cache
        .expect_set_many()
        .withf(move |entities: &[Crop], _: &Option<Duration>| {
            entities.len() == 1 && entities[0].id() == gap_id
        })
        .times(1)
        .returning(|_, _| Ok(()));

    let mut repository = MockCropRepository::new();
    repository
        .expect_find_many()
        .withf(move |requested: &[AggregateId]| requested.len() == 2 && requested[0] == gap_id)
        .times(1)
        .returning(move |_| Ok(vec![gap.clone()]));

    let queries = QueryHandler::new(Arc::new(repository), Arc::new(cache));
    let found = queries.get_many(&ids).await.unwrap();

    let found_ids: Vec<_> = found.iter().map(|c| c.id()).collect();
    assert_eq!(found_ids, vec![ids[0], ids[1]]);
}
