//! Operational endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::container::AppContainer;

const PROMETHEUS_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
    pub cache_write_policy: String,
    pub events_published: u64,
}

/// GET /health: process status and the wiring it runs with.
pub async fn health(State(container): State<Arc<AppContainer>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        store: container.store_kind,
        cache_write_policy: container.cache_write_policy.to_string(),
        events_published: container.event_counts.total().await,
    })
}

/// GET /metrics: cache, command and publication counters in Prometheus text format.
pub async fn metrics(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    ([(CONTENT_TYPE, PROMETHEUS_TEXT)], handle.render())
}
