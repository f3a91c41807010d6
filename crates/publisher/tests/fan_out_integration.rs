//! Integration tests: farm services -> FanOutPublisher -> subscribers.

use std::sync::Arc;

use async_trait::async_trait;
use cache::InMemoryCacheBackend;
use chrono::NaiveDate;
use common::EventEnvelope;
use domain::{
    CreateCrop, CreateCropVariety, CreateFarm, CreatePlot, CropCategory, DomainError, Engine,
    PublishError, Services, SoilType, UpdateCrop, UpdatePlot,
};
use publisher::{EventCountsView, EventSubscriber, FanOutPublisher, LoggingSubscriber};
use store::InMemoryDocumentStore;

/// Helper to wire services to a fan-out publisher with the given subscribers.
fn services(subscribers: Vec<Arc<dyn EventSubscriber>>) -> (Services, InMemoryDocumentStore) {
    let mut fan_out = FanOutPublisher::new();
    for subscriber in subscribers {
        fan_out.register(subscriber);
    }
    let store = InMemoryDocumentStore::new();
    let engine = Engine::new(store.clone(), InMemoryCacheBackend::new(), Arc::new(fan_out));
    (engine.services(), store)
}

/// Rejects every event of one type.
struct RejectEventType(&'static str);

#[async_trait]
impl EventSubscriber for RejectEventType {
    fn name(&self) -> &'static str {
        "RejectEventType"
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<(), PublishError> {
        if event.event_type == self.0 {
            return Err(PublishError::delivery(&event.event_type, "downstream unavailable"));
        }
        Ok(())
    }
}

#[tokio::test]
async fn full_farm_lifecycle_is_counted_by_type() {
    let counts = EventCountsView::new();
    let (services, _) = services(vec![
        Arc::new(LoggingSubscriber::new()),
        Arc::new(counts.clone()),
    ]);

    let farm = services
        .farms
        .create(CreateFarm::new("Green Acres", 52.1, -1.3))
        .await
        .unwrap();
    let plot = services
        .plots
        .create(CreatePlot::new(farm.id, "North Field", 10.0, 20.0, SoilType::Loam))
        .await
        .unwrap();
    services
        .plots
        .update(plot.id, UpdatePlot::rename("North Field A"))
        .await
        .unwrap();
    let variety = services
        .varieties
        .create(CreateCropVariety::new("Nantes", CropCategory::Vegetable, 70))
        .await
        .unwrap();
    let crop = services
        .crops
        .create(CreateCrop::new(
            plot.id,
            variety.id,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ))
        .await
        .unwrap();
    services
        .crops
        .update(crop.id, UpdateCrop::harvest(120))
        .await
        .unwrap();
    services.crops.delete(crop.id).await.unwrap();

    assert_eq!(counts.count_for("FarmCreated").await, 1);
    assert_eq!(counts.count_for("PlotCreated").await, 1);
    assert_eq!(counts.count_for("PlotUpdated").await, 1);
    assert_eq!(counts.count_for("CropVarietyCreated").await, 1);
    assert_eq!(counts.count_for_aggregate("Crop").await, 3);
    assert_eq!(counts.total().await, 7);
}

#[tokio::test]
async fn subscriber_failure_surfaces_after_the_write_is_durable() {
    let counts = EventCountsView::new();
    let (services, store) = services(vec![
        Arc::new(RejectEventType("FarmCreated")),
        Arc::new(counts.clone()),
    ]);

    let result = services
        .farms
        .create(CreateFarm::new("Green Acres", 52.1, -1.3))
        .await;

    assert!(matches!(result, Err(DomainError::Publish(_))));
    assert_eq!(store.document_count().await, 1);
    assert_eq!(counts.total().await, 0);
}

#[tokio::test]
async fn failure_for_one_event_type_leaves_others_delivered() {
    let counts = EventCountsView::new();
    let (services, _) = services(vec![
        Arc::new(RejectEventType("FarmDeleted")),
        Arc::new(counts.clone()),
    ]);

    let farm = services
        .farms
        .create(CreateFarm::new("Green Acres", 52.1, -1.3))
        .await
        .unwrap();
    assert!(services.farms.delete(farm.id).await.is_err());

    assert_eq!(counts.count_for("FarmCreated").await, 1);
    assert_eq!(counts.count_for("FarmDeleted").await, 0);
}
