use super::clamp::clamp_pricing;
use super::domain::Pricing;

/// Quantities a pricer derives before overhead, markup, and regional labor are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) struct Takeoff {
    pub(crate) labor_hours: f64,
    pub(crate) materials: f64,
    pub(crate) mobilization: f64,
    pub(crate) permit: f64,
}

impl Takeoff {
    pub(crate) fn plus(self, other: Takeoff) -> Takeoff {
        Takeoff {
            labor_hours: self.labor_hours + other.labor_hours,
            materials: self.materials + other.materials,
            mobilization: self.mobilization + other.mobilization,
            permit: self.permit + other.permit,
        }
    }
}

/// Trade-level knobs applied on top of a takeoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Overheads {
    pub(crate) labor_rate: f64,
    pub(crate) supervision_pct: f64,
    pub(crate) markup: f64,
}

/// Turn a takeoff into a clamped price.
///
/// Rounding happens after hours x rate, again after the state multiplier, and
/// once more for the total; intermediate ratios are never rounded.
pub(crate) fn finalize(takeoff: &Takeoff, overheads: &Overheads, state_multiplier: f64) -> Pricing {
    let labor = (takeoff.labor_hours * overheads.labor_rate).round();
    let labor = (labor * state_multiplier).round();
    let materials = takeoff.materials.round();
    let supervision = (overheads.supervision_pct * (labor + materials)).round();
    let subs = takeoff.mobilization + takeoff.permit + supervision;
    let total = ((labor + materials + subs) * (1.0 + overheads.markup / 100.0)).round();

    clamp_pricing(Pricing {
        labor,
        materials,
        subs,
        markup: overheads.markup,
        total,
    })
}
