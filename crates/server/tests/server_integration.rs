//! Integration tests for the operational endpoints.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{CreateFarm, CreatePlot, SoilType};
use metrics_exporter_prometheus::PrometheusHandle;
use server::{AppContainer, Config};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            metrics_exporter_prometheus::PrometheusBuilder::new()
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, Arc<AppContainer>) {
    let container = Arc::new(AppContainer::in_memory(&Config::default()));
    let app = server::create_app(Arc::clone(&container), get_metrics_handle());
    (app, container)
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let (status, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["store"], "memory");
    assert_eq!(json["cache_write_policy"], "best_effort");
    assert_eq!(json["events_published"], 0);
}

#[tokio::test]
async fn test_health_reports_published_events() {
    let (app, container) = setup();
    let farm = container
        .services
        .farms
        .create(CreateFarm::new("Green Acres", 52.1, -1.3))
        .await
        .unwrap();
    container
        .services
        .plots
        .create(CreatePlot::new(farm.id, "North Field", 10.0, 20.0, SoilType::Loam))
        .await
        .unwrap();

    let (_, body) = get(app, "/health").await;

    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["events_published"], 2);
}

#[tokio::test]
async fn test_metrics_exposes_command_counters() {
    let (app, container) = setup();
    container
        .services
        .farms
        .create(CreateFarm::new("Metrics Farm", 0.0, 0.0))
        .await
        .unwrap();

    let (status, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("commands_executed_total"));
    assert!(body.contains("events_published_total"));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (app, _) = setup();
    let (status, _) = get(app, "/farms").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
