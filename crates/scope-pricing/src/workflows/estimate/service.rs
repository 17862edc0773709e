use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::config::PricingConfig;
use super::domain::{
    DeterministicResult, GenerativeEstimate, Measurements, PaintScope, Pricing, ScopeInput, Trade,
};
use super::reconcile::PricingSource;
use super::states::{normalize_state, state_multiplier};
use super::trades::compute_deterministic;
use super::EstimateError;

/// Pricing engine bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct DeterministicEngine {
    config: PricingConfig,
}

impl DeterministicEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    pub fn compute(&self, trade: Trade, input: &ScopeInput) -> DeterministicResult {
        compute_deterministic(trade, input, &self.config)
    }
}

/// One priced request as received over HTTP, the CLI, or a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub trade: Trade,
    /// USPS state code; unknown or missing codes price at the baseline.
    #[serde(default)]
    pub state: String,
    pub scope: String,
    #[serde(default)]
    pub measurements: Option<Measurements>,
    #[serde(default)]
    pub paint_scope: Option<PaintScope>,
    /// Caller-supplied generative estimate; skips the estimator call when present.
    #[serde(default)]
    pub generative: Option<GenerativeEstimate>,
}

impl EstimateRequest {
    pub fn new(trade: Trade, state: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            trade,
            state: state.into(),
            scope: scope.into(),
            measurements: None,
            paint_scope: None,
            generative: None,
        }
    }

    pub fn scope_input(&self, state_multiplier: f64) -> ScopeInput {
        ScopeInput {
            text: self.scope.clone(),
            state_multiplier,
            measurements: self.measurements.clone(),
            paint_scope: self.paint_scope,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EstimateOutcome {
    pub trade: Trade,
    pub state: String,
    pub state_multiplier: f64,
    pub pricing: Pricing,
    pub source: PricingSource,
    pub adjustments: Vec<String>,
    pub deterministic: DeterministicResult,
    pub generated_at: DateTime<Utc>,
}

/// Opaque external pricing call. Implementations own retries and timeouts.
pub trait GenerativeEstimator: Send + Sync {
    fn estimate(&self, request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError>;
}

/// Failure reported by a generative estimator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerativeError {
    #[error("generative estimator unavailable: {0}")]
    Unavailable(String),
    #[error("generative estimate rejected: {0}")]
    Rejected(String),
    #[error("generative estimate malformed: {0}")]
    Malformed(String),
}

/// Service composing the deterministic engine, state table, and generative estimator.
pub struct EstimateService<G> {
    engine: Arc<DeterministicEngine>,
    estimator: Arc<G>,
}

impl<G> EstimateService<G>
where
    G: GenerativeEstimator + 'static,
{
    pub fn new(estimator: Arc<G>, config: PricingConfig) -> Self {
        Self {
            engine: Arc::new(DeterministicEngine::new(config)),
            estimator,
        }
    }

    pub fn engine(&self) -> &DeterministicEngine {
        &self.engine
    }

    /// Core-only pass: no estimator call, no reconciliation.
    pub fn deterministic(&self, request: &EstimateRequest) -> DeterministicResult {
        let multiplier = state_multiplier(&request.state);
        self.engine
            .compute(request.trade, &request.scope_input(multiplier))
    }

    /// Price a request, reconciling the generative estimate with any deterministic floor.
    pub fn estimate(&self, request: EstimateRequest) -> Result<EstimateOutcome, EstimateError> {
        let state = normalize_state(&request.state);
        let multiplier = state_multiplier(&state);
        let deterministic = self
            .engine
            .compute(request.trade, &request.scope_input(multiplier));

        let generative = match request.generative {
            Some(supplied) => Some(supplied),
            None => match self.estimator.estimate(&request) {
                Ok(estimate) => Some(estimate),
                Err(error) => {
                    warn!(
                        trade = %request.trade,
                        state = %state,
                        error = %error,
                        "generative estimator failed; continuing without it"
                    );
                    None
                }
            },
        };

        let floors: Vec<Pricing> = deterministic.pricing.into_iter().collect();
        let Some(reconciliation) = self.engine.config().reconciliation.reconcile(
            request.trade,
            generative.as_ref(),
            &floors,
            multiplier,
        ) else {
            return Err(EstimateError::NoPricingAvailable {
                trade: request.trade,
                notes: deterministic.notes,
            });
        };

        info!(
            trade = %request.trade,
            state = %state,
            job_type = %deterministic.job_type,
            source = ?reconciliation.source,
            total = reconciliation.pricing.total,
            "estimate priced"
        );

        Ok(EstimateOutcome {
            trade: request.trade,
            state,
            state_multiplier: multiplier,
            pricing: reconciliation.pricing,
            source: reconciliation.source,
            adjustments: reconciliation.adjustments,
            deterministic,
            generated_at: Utc::now(),
        })
    }
}
