//! Per-trade rule engines: extraction, classification rules, and pricers.

mod drywall;
mod electrical;
mod painting;
mod plumbing;

pub use drywall::DrywallSignals;
pub use electrical::{DeviceBreakdown, ElectricalSignals};
pub use painting::PaintingSignals;
pub use plumbing::{FixtureBreakdown, PlumbingSignals};

use std::sync::LazyLock;

use serde::Serialize;
use tracing::debug;

use super::config::{IntentMultipliers, PricingConfig};
use super::domain::{DeterministicResult, JobType, Pricing, ScopeInput, Signals, Trade};
use super::matcher::{normalize, Vocabulary};
use super::rules::{classify, Governing, Rule, TradeSignals};

/// Contract every trade engine fulfils; the shared pipeline lives in [`run`].
pub(crate) trait TradeEngine {
    type Signals: TradeSignals + 'static;

    const TRADE: Trade;
    /// Note emitted when no archetype claims the scope.
    const FALLBACK: &'static str;

    fn extract(text: &str, input: &ScopeInput, config: &PricingConfig) -> Self::Signals;

    /// Archetypes in precedence order.
    fn rules() -> &'static [Rule<Self::Signals>];

    fn price(
        job_type: JobType,
        governing: Governing,
        signals: &Self::Signals,
        state_multiplier: f64,
        config: &PricingConfig,
    ) -> Option<(Pricing, Vec<String>)>;

    fn wrap(signals: Self::Signals) -> Signals;
}

fn run<E: TradeEngine>(input: &ScopeInput, config: &PricingConfig) -> DeterministicResult {
    let text = normalize(&input.text);
    let signals = E::extract(&text, input, config);
    let classification = classify(&text, E::rules(), &signals, E::FALLBACK);
    let mut notes = classification.notes;

    let pricing = match (classification.ok_for_deterministic, classification.governing) {
        (true, Some(governing)) => E::price(
            classification.job_type,
            governing,
            &signals,
            input.effective_state_multiplier(),
            config,
        )
        .map(|(pricing, extra)| {
            notes.extend(extra);
            pricing
        }),
        _ => None,
    };

    let result = DeterministicResult::new(
        classification.ok_for_deterministic,
        classification.ok_for_verified,
        pricing,
        classification.job_type,
        E::wrap(signals),
        notes,
    );

    debug!(
        trade = %E::TRADE,
        job_type = %result.job_type,
        deterministic = result.ok_for_deterministic,
        verified = result.ok_for_verified,
        total = result.pricing.map(|pricing| pricing.total),
        "scope classified"
    );

    result
}

/// Run the deterministic engine for one trade. Never fails: unsafe or
/// unparseable scopes come back as `unknown` with explanatory notes.
pub fn compute_deterministic(
    trade: Trade,
    input: &ScopeInput,
    config: &PricingConfig,
) -> DeterministicResult {
    match trade {
        Trade::Painting => run::<painting::PaintingEngine>(input, config),
        Trade::Drywall => run::<drywall::DrywallEngine>(input, config),
        Trade::Electrical => run::<electrical::ElectricalEngine>(input, config),
        Trade::Plumbing => run::<plumbing::PlumbingEngine>(input, config),
    }
}

static ADD_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "add",
        "adding",
        "added",
        "new",
        "install",
        "installing",
        "run",
        "running",
        "additional",
        "extra",
    ])
});

static SWAP_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "replace",
        "replacing",
        "replaced",
        "replacement",
        "swap",
        "swapping",
        "swap out",
        "change out",
        "changing out",
        "existing",
        "like for like",
    ])
});

/// Whether unit work reads as new installation or like-for-like replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkIntent {
    #[default]
    Unspecified,
    Add,
    Swap,
}

impl WorkIntent {
    /// Swap wording wins; add rates apply only when add wording stands alone.
    pub(crate) fn detect(text: &str) -> Self {
        let swap = SWAP_WORDS.matches(text);
        let add = ADD_WORDS.matches(text);
        match (add, swap) {
            (_, true) => WorkIntent::Swap,
            (true, false) => WorkIntent::Add,
            (false, false) => WorkIntent::Unspecified,
        }
    }

    pub(crate) fn multiplier(&self, rates: &IntentMultipliers) -> f64 {
        match self {
            WorkIntent::Add => rates.add,
            WorkIntent::Swap => rates.swap,
            WorkIntent::Unspecified => 1.0,
        }
    }

    pub(crate) fn note(&self) -> &'static str {
        match self {
            WorkIntent::Add => "add rate applied (new installation wording)",
            WorkIntent::Swap => "swap rate applied (replacement wording)",
            WorkIntent::Unspecified => "standard rate applied (no add or swap wording)",
        }
    }
}
