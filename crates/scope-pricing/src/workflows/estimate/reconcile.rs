//! Reconciliation of an untrusted generative estimate with deterministic floors.
//!
//! Deterministic prices act as an economic floor: every component of the final
//! price is the maximum of the generative and deterministic values, and the
//! total is always re-derived from the merged components. Without a floor the
//! generative estimate passes through a realism pass instead.

use serde::{Deserialize, Serialize};

use super::clamp::clamp_markup;
use super::domain::{GenerativeEstimate, Pricing, Trade};

/// Allowed share of labor within `labor + materials`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShareBounds {
    pub min: f64,
    pub max: f64,
}

impl ShareBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaborShareBounds {
    pub painting: ShareBounds,
    pub drywall: ShareBounds,
    pub electrical: ShareBounds,
    pub plumbing: ShareBounds,
}

impl Default for LaborShareBounds {
    fn default() -> Self {
        Self {
            painting: ShareBounds::new(0.55, 0.85),
            drywall: ShareBounds::new(0.45, 0.75),
            electrical: ShareBounds::new(0.45, 0.80),
            plumbing: ShareBounds::new(0.40, 0.75),
        }
    }
}

impl LaborShareBounds {
    pub fn for_trade(&self, trade: Trade) -> ShareBounds {
        match trade {
            Trade::Painting => self.painting,
            Trade::Drywall => self.drywall,
            Trade::Electrical => self.electrical,
            Trade::Plumbing => self.plumbing,
        }
    }
}

/// Policy object for merging and sanity-checking estimates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconciliationPolicy {
    /// Markup used when the generative markup is missing or degenerate.
    pub default_markup: f64,
    /// Relative gap between a stated and implied total that triggers a recompute note.
    pub max_total_deviation: f64,
    /// Cap on `subs / (labor + materials)` for generative-only estimates.
    pub max_subs_ratio: f64,
    pub labor_share: LaborShareBounds,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            default_markup: 20.0,
            max_total_deviation: 0.20,
            max_subs_ratio: 0.35,
            labor_share: LaborShareBounds::default(),
        }
    }
}

/// Where the final price came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingSource {
    Deterministic,
    Generative,
    Reconciled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub pricing: Pricing,
    pub source: PricingSource,
    /// Human-readable record of every adjustment made.
    pub adjustments: Vec<String>,
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn effective_multiplier(multiplier: f64) -> f64 {
    if multiplier.is_finite() && multiplier > 0.0 {
        multiplier
    } else {
        1.0
    }
}

impl ReconciliationPolicy {
    /// Markup rule: the generative markup when present and usable, else the default; always clamped.
    pub fn select_markup(&self, generative: Option<f64>) -> f64 {
        let markup = generative
            .filter(|markup| markup.is_finite() && *markup > 0.0)
            .unwrap_or(self.default_markup);
        clamp_markup(markup)
    }

    /// Full decision: merge when a floor exists, realism pass when only the
    /// generative estimate exists, `None` when nothing priced the request.
    /// A generative estimate without any positive cost counts as absent.
    pub fn reconcile(
        &self,
        trade: Trade,
        generative: Option<&GenerativeEstimate>,
        floors: &[Pricing],
        state_multiplier: f64,
    ) -> Option<Reconciliation> {
        match (generative.filter(|estimate| estimate.has_costs()), floors) {
            (None, []) => None,
            (None, floors) => Some(self.deterministic_only(floors)),
            (Some(generative), []) => Some(self.realism(trade, generative, state_multiplier)),
            (Some(generative), floors) => Some(self.merge(generative, floors, state_multiplier)),
        }
    }

    fn deterministic_only(&self, floors: &[Pricing]) -> Reconciliation {
        let (pricing, adjustments) = match floors {
            [single] => (*single, Vec::new()),
            _ => {
                let markup = floors
                    .iter()
                    .max_by(|left, right| left.total.total_cmp(&right.total))
                    .map_or(self.default_markup, |leader| leader.markup);
                let pricing = Pricing::from_components(
                    floors.iter().map(|floor| floor.labor).fold(0.0, f64::max),
                    floors.iter().map(|floor| floor.materials).fold(0.0, f64::max),
                    floors.iter().map(|floor| floor.subs).fold(0.0, f64::max),
                    markup,
                );
                (
                    pricing,
                    vec![format!(
                        "{} deterministic estimates combined component-wise",
                        floors.len()
                    )],
                )
            }
        };

        Reconciliation {
            pricing,
            source: PricingSource::Deterministic,
            adjustments,
        }
    }

    /// Component-wise maximum of the state-adjusted generative estimate and every floor.
    pub fn merge(
        &self,
        generative: &GenerativeEstimate,
        floors: &[Pricing],
        state_multiplier: f64,
    ) -> Reconciliation {
        let multiplier = effective_multiplier(state_multiplier);
        let mut adjustments = Vec::new();

        let mut labor = (non_negative(generative.labor) * multiplier).round();
        let mut materials = non_negative(generative.materials).round();
        let mut subs = non_negative(generative.subs).round();

        for floor in floors {
            if floor.labor > labor {
                labor = floor.labor;
                adjustments.push(format!("labor raised to deterministic floor {}", floor.labor));
            }
            if floor.materials > materials {
                materials = floor.materials;
                adjustments.push(format!(
                    "materials raised to deterministic floor {}",
                    floor.materials
                ));
            }
            if floor.subs > subs {
                subs = floor.subs;
                adjustments.push(format!("subs raised to deterministic floor {}", floor.subs));
            }
        }

        let markup = self.select_markup(generative.markup);
        if generative.markup != Some(markup) {
            adjustments.push(format!("markup set to {markup}"));
        }

        let pricing = Pricing::from_components(labor, materials, subs, markup);
        if generative.total != Some(pricing.total) {
            adjustments.push(format!("total recomputed as {}", pricing.total));
        }

        Reconciliation {
            pricing,
            source: PricingSource::Reconciled,
            adjustments,
        }
    }

    /// Sanity pass for a generative estimate with no deterministic floor.
    pub fn realism(
        &self,
        trade: Trade,
        generative: &GenerativeEstimate,
        state_multiplier: f64,
    ) -> Reconciliation {
        let mut adjustments = Vec::new();
        let mut labor = non_negative(generative.labor);
        let mut materials = non_negative(generative.materials);
        let mut subs = non_negative(generative.subs);

        let direct = labor + materials;
        if direct > 0.0 {
            let bounds = self.labor_share.for_trade(trade);
            let share = labor / direct;
            let bounded = share.clamp(bounds.min, bounds.max);
            if bounded != share {
                labor = (direct * bounded).round();
                materials = direct - labor;
                adjustments.push(format!(
                    "labor share {:.2} outside [{:.2}, {:.2}]; rebalanced to {:.2}",
                    share, bounds.min, bounds.max, bounded
                ));
            }

            let subs_cap = (direct * self.max_subs_ratio).round();
            if subs > subs_cap {
                adjustments.push(format!("subs capped at {subs_cap}"));
                subs = subs_cap;
            }
        }

        let markup = self.select_markup(generative.markup);
        let implied = ((labor + materials + subs) * (1.0 + markup / 100.0)).round();
        if let Some(stated) = generative.total.filter(|total| total.is_finite()) {
            if implied > 0.0 && ((stated - implied) / implied).abs() > self.max_total_deviation {
                adjustments.push(format!(
                    "generative total {stated} deviates more than {:.0}% from components; recomputed",
                    self.max_total_deviation * 100.0
                ));
            }
        }

        let multiplier = effective_multiplier(state_multiplier);
        let labor = (labor.round() * multiplier).round();
        if multiplier != 1.0 {
            adjustments.push(format!("state labor multiplier {multiplier} applied"));
        }

        Reconciliation {
            pricing: Pricing::from_components(labor, materials, subs, markup),
            source: PricingSource::Generative,
            adjustments,
        }
    }
}
