use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::domain::DeterministicResult;
use super::service::{EstimateOutcome, EstimateRequest, EstimateService, GenerativeEstimator};
use crate::error::AppError;

/// Router builder exposing the estimate endpoints.
pub fn estimate_router<G>(service: Arc<EstimateService<G>>) -> Router
where
    G: GenerativeEstimator + 'static,
{
    Router::new()
        .route("/api/v1/estimates", post(estimate_handler::<G>))
        .route(
            "/api/v1/estimates/deterministic",
            post(deterministic_handler::<G>),
        )
        .with_state(service)
}

pub(crate) async fn estimate_handler<G>(
    State(service): State<Arc<EstimateService<G>>>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<EstimateOutcome>, AppError>
where
    G: GenerativeEstimator + 'static,
{
    let outcome = service.estimate(request)?;
    Ok(Json(outcome))
}

pub(crate) async fn deterministic_handler<G>(
    State(service): State<Arc<EstimateService<G>>>,
    Json(request): Json<EstimateRequest>,
) -> Json<DeterministicResult>
where
    G: GenerativeEstimator + 'static,
{
    Json(service.deterministic(&request))
}
