//! Deterministic pricing guard for free-text construction scopes.
//!
//! The estimate workflow parses a scope of work per trade, decides whether a
//! fixed production-rate formula can safely price it, and reconciles that
//! price with an externally produced generative estimate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
