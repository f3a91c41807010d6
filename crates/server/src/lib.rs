//! Process bootstrap for the farm operations core.
//!
//! Loads configuration, builds the [`AppContainer`] and serves the
//! operational endpoints (`/health`, `/metrics`). Domain operations are
//! reached through the container's services; no business routes are exposed.

pub mod config;
pub mod container;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use container::AppContainer;
pub use error::{ConfigError, ServerError};

/// Creates the router for the operational endpoints.
pub fn create_app(container: Arc<AppContainer>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health))
        .with_state(container)
        .merge(metrics_router)
        .layer(TraceLayer::new_for_http())
}
