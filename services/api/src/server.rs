use crate::cli::ServeArgs;
use crate::infra::{AppState, OfflineEstimator};
use crate::limiter::FixedWindowLimiter;
use crate::routes::with_estimate_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use scope_pricing::config::AppConfig;
use scope_pricing::error::AppError;
use scope_pricing::telemetry;
use scope_pricing::workflows::estimate::EstimateService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let estimate_service = Arc::new(EstimateService::new(
        Arc::new(OfflineEstimator),
        config.pricing.clone(),
    ));
    let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit));

    let app = with_estimate_routes(estimate_service, limiter)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window.as_secs(),
        "scope pricing guard ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
