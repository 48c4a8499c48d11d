//! Small health/metrics surface. Not a read-API for distribution state —
//! this exists only so an operator's process supervisor and Prometheus
//! scraper have something to hit.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;

#[derive(Clone)]
pub struct ApiState {
    pub metrics: PrometheusHandle,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn metrics(State(state): State<ApiState>) -> (StatusCode, String) {
    (StatusCode::OK, state.metrics.render())
}
