//! Deterministic pricing guard for small residential trade jobs.
//!
//! Scope text is parsed into quantities per trade, classified into a pricing
//! archetype, priced from fixed production rates, and reconciled with any
//! generative estimate so the deterministic price acts as an economic floor.

pub mod batch;
pub mod clamp;
pub mod config;
pub mod domain;
pub(crate) mod matcher;
pub(crate) mod pricing;
pub mod reconcile;
pub mod router;
pub(crate) mod rules;
pub mod service;
pub mod states;
pub mod trades;

#[cfg(test)]
mod tests;

pub use batch::parse_batch;
pub use clamp::{clamp_markup, clamp_pricing};
pub use config::{
    DrywallRates, ElectricalRates, IntentMultipliers, MobilizationTiers, PaintingRates,
    PlumbingRates, PricingConfig, UnitRate,
};
pub use domain::{
    DeterministicResult, GenerativeEstimate, JobType, MeasurementRow, Measurements, PaintScope,
    Pricing, ScopeInput, Signals, Trade,
};
pub use reconcile::{PricingSource, Reconciliation, ReconciliationPolicy};
pub use router::estimate_router;
pub use service::{
    DeterministicEngine, EstimateOutcome, EstimateRequest, EstimateService, GenerativeError,
    GenerativeEstimator,
};
pub use states::state_multiplier;
pub use trades::{compute_deterministic, WorkIntent};

/// Error raised at the service and I/O edges of the estimate workflow.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("unsupported trade: {0}")]
    UnsupportedTrade(String),
    #[error("no pricing available for {trade}")]
    NoPricingAvailable { trade: Trade, notes: Vec<String> },
    #[error("batch row {row}: {source}")]
    BatchRow {
        row: usize,
        source: Box<EstimateError>,
    },
    #[error("invalid batch CSV: {0}")]
    Csv(#[from] csv::Error),
}
