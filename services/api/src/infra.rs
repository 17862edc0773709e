use metrics_exporter_prometheus::PrometheusHandle;
use scope_pricing::workflows::estimate::{
    EstimateRequest, GenerativeError, GenerativeEstimate, GenerativeEstimator,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Estimator used when no generative backend is wired in.
///
/// Requests may still carry a caller-supplied estimate; everything else is
/// priced from the deterministic floor alone.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct OfflineEstimator;

impl GenerativeEstimator for OfflineEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError> {
        Err(GenerativeError::Unavailable(
            "no generative backend configured".to_string(),
        ))
    }
}
