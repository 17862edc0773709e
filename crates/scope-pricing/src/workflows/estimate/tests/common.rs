use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::estimate::{
    compute_deterministic, estimate_router, DeterministicResult, EstimateRequest,
    EstimateService, GenerativeError, GenerativeEstimate, GenerativeEstimator, PricingConfig,
    ScopeInput, Trade,
};

pub(super) fn quote(trade: Trade, text: &str) -> DeterministicResult {
    compute_deterministic(trade, &ScopeInput::new(text), &PricingConfig::default())
}

pub(super) fn quote_in(trade: Trade, text: &str, state_multiplier: f64) -> DeterministicResult {
    compute_deterministic(
        trade,
        &ScopeInput::new(text).with_state_multiplier(state_multiplier),
        &PricingConfig::default(),
    )
}

pub(super) fn total(trade: Trade, text: &str) -> f64 {
    quote(trade, text)
        .pricing
        .unwrap_or_else(|| panic!("expected a deterministic price for {text:?}"))
        .total
}

pub(super) fn flat_estimate() -> GenerativeEstimate {
    GenerativeEstimate {
        labor: 300.0,
        materials: 100.0,
        subs: 50.0,
        markup: None,
        total: Some(540.0),
    }
}

/// Estimator that always answers with the same figures and counts its calls.
pub(super) struct StaticEstimator {
    estimate: GenerativeEstimate,
    calls: AtomicUsize,
}

impl StaticEstimator {
    pub(super) fn new(estimate: GenerativeEstimate) -> Self {
        Self {
            estimate,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GenerativeEstimator for StaticEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.estimate)
    }
}

pub(super) struct FailingEstimator;

impl GenerativeEstimator for FailingEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError> {
        Err(GenerativeError::Unavailable("upstream timeout".to_string()))
    }
}

pub(super) fn static_service() -> (EstimateService<StaticEstimator>, Arc<StaticEstimator>) {
    let estimator = Arc::new(StaticEstimator::new(flat_estimate()));
    let service = EstimateService::new(estimator.clone(), PricingConfig::default());
    (service, estimator)
}

pub(super) fn failing_service() -> EstimateService<FailingEstimator> {
    EstimateService::new(Arc::new(FailingEstimator), PricingConfig::default())
}

pub(super) fn request(trade: Trade, state: &str, scope: &str) -> EstimateRequest {
    EstimateRequest::new(trade, state, scope)
}

pub(super) fn failing_router() -> axum::Router {
    estimate_router(Arc::new(failing_service()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
