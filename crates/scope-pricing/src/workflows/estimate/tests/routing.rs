use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tower::ServiceExt;

use super::common::*;

use crate::workflows::estimate::router::estimate_handler;
use crate::workflows::estimate::{estimate_router, Trade};

fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::post(uri)
        .header(axum::http::header::CONTENT_TYPE, "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .expect("request builds")
}

#[tokio::test]
async fn estimate_route_returns_priced_outcome() {
    let (service, _) = static_service();
    let router = estimate_router(Arc::new(service));

    let response = router
        .oneshot(post_json(
            "/api/v1/estimates",
            json!({
                "trade": "plumbing",
                "state": "TX",
                "scope": "Replace 3 toilets and 2 faucets"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["source"], "reconciled");
    assert_eq!(payload["deterministic"]["job_type"], "fixture_swaps");
    assert_eq!(payload["deterministic"]["signals"]["trade"], "plumbing");
    assert!(payload["pricing"]["total"].as_f64().expect("total") > 0.0);
}

#[tokio::test]
async fn estimate_route_rejects_unpriceable_scopes() {
    let response = failing_router()
        .oneshot(post_json(
            "/api/v1/estimates",
            json!({ "trade": "drywall", "scope": "" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["trade"], "drywall");
    assert_eq!(payload["notes"][0], "scope text is empty");
}

#[tokio::test]
async fn estimate_route_rejects_unknown_trades() {
    let response = failing_router()
        .oneshot(post_json(
            "/api/v1/estimates",
            json!({ "trade": "roofing", "scope": "reshingle 20 squares" }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn deterministic_route_reports_classification() {
    let response = failing_router()
        .oneshot(post_json(
            "/api/v1/estimates/deterministic",
            json!({
                "trade": "electric",
                "state": "ny",
                "scope": "Install a new 240v EV charger circuit"
            }),
        ))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["job_type"], "ev_charger");
    assert_eq!(payload["ok_for_deterministic"], true);
    assert_eq!(payload["ok_for_verified"], false);
}

#[tokio::test]
async fn handler_maps_missing_pricing_to_unprocessable() {
    let service = Arc::new(failing_service());
    let response = estimate_handler(
        State(service),
        axum::Json(request(Trade::Electrical, "TX", "look at the wiring")),
    )
    .await
    .into_response();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["error"], "no pricing available for electrical");
    assert_eq!(payload["trade"], "electrical");
    assert!(payload["notes"].as_array().is_some_and(|notes| !notes.is_empty()));
}
