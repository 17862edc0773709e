use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::estimate::EstimateError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Estimate(EstimateError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Estimate(err) => write!(f, "estimate error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Estimate(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Estimate(EstimateError::NoPricingAvailable { trade, notes }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": format!("no pricing available for {trade}"),
                    "trade": trade,
                    "notes": notes,
                }),
            ),
            AppError::Estimate(err @ EstimateError::UnsupportedTrade(_)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": err.to_string() }),
            ),
            other => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": other.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<EstimateError> for AppError {
    fn from(value: EstimateError) -> Self {
        Self::Estimate(value)
    }
}
