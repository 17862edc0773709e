use crate::infra::AppState;
use crate::limiter::{enforce_rate_limit, FixedWindowLimiter};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware, Extension, Json, Router};
use scope_pricing::workflows::estimate::{estimate_router, EstimateService, GenerativeEstimator};
use serde_json::json;
use std::sync::Arc;

/// Probe and metrics routes plus the rate-limited estimate API.
pub(crate) fn with_estimate_routes<G>(
    service: Arc<EstimateService<G>>,
    limiter: Arc<FixedWindowLimiter>,
) -> Router
where
    G: GenerativeEstimator + 'static,
{
    let estimates =
        estimate_router(service).layer(middleware::from_fn_with_state(limiter, enforce_rate_limit));

    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(estimates)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
