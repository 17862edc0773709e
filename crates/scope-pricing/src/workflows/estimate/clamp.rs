use super::domain::Pricing;

pub const MARKUP_FLOOR: f64 = 15.0;
pub const MARKUP_CEILING: f64 = 25.0;
pub const DEFAULT_MARKUP: f64 = 20.0;
pub const MAX_TOTAL: f64 = 10_000_000.0;

fn component(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value.round()
    } else {
        0.0
    }
}

pub fn clamp_markup(markup: f64) -> f64 {
    if markup.is_finite() {
        markup.clamp(MARKUP_FLOOR, MARKUP_CEILING)
    } else {
        DEFAULT_MARKUP
    }
}

/// Normalize a pricing into safe bounds and re-derive the total from its components.
///
/// When the derived total would exceed [`MAX_TOTAL`] the components are scaled
/// down together so that `total = round((labor + materials + subs) * (1 + markup / 100))`
/// still holds at the cap.
pub fn clamp_pricing(pricing: Pricing) -> Pricing {
    let markup = clamp_markup(pricing.markup);
    let mut labor = component(pricing.labor);
    let mut materials = component(pricing.materials);
    let mut subs = component(pricing.subs);

    let factor = 1.0 + markup / 100.0;
    let raw_total = (labor + materials + subs) * factor;
    if raw_total > MAX_TOTAL {
        let scale = MAX_TOTAL / raw_total;
        labor = (labor * scale).floor();
        materials = (materials * scale).floor();
        subs = (subs * scale).floor();
    }

    let total = ((labor + materials + subs) * factor).round().min(MAX_TOTAL);

    Pricing {
        labor,
        materials,
        subs,
        markup,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pricing(labor: f64, materials: f64, subs: f64, markup: f64, total: f64) -> Pricing {
        Pricing {
            labor,
            materials,
            subs,
            markup,
            total,
        }
    }

    #[test]
    fn negative_and_non_finite_components_become_zero() {
        let clamped = clamp_pricing(pricing(-50.0, f64::NAN, f64::INFINITY, 20.0, 99.0));
        assert_eq!(clamped.labor, 0.0);
        assert_eq!(clamped.materials, 0.0);
        assert_eq!(clamped.subs, 0.0);
        assert_eq!(clamped.total, 0.0);
    }

    #[test]
    fn markup_is_bounded() {
        assert_eq!(clamp_pricing(pricing(100.0, 0.0, 0.0, 3.0, 0.0)).markup, 15.0);
        assert_eq!(clamp_pricing(pricing(100.0, 0.0, 0.0, 60.0, 0.0)).markup, 25.0);
        assert_eq!(
            clamp_pricing(pricing(100.0, 0.0, 0.0, f64::NAN, 0.0)).markup,
            DEFAULT_MARKUP
        );
    }

    #[test]
    fn total_is_rederived_from_components() {
        let clamped = clamp_pricing(pricing(1000.0, 500.0, 250.0, 20.0, 1.0));
        assert_eq!(clamped.total, 2100.0);
        assert_eq!(clamped.total, clamped.implied_total());
    }

    #[test]
    fn oversized_totals_are_capped_without_breaking_the_identity() {
        let clamped = clamp_pricing(pricing(9_000_000.0, 4_000_000.0, 1_000_000.0, 25.0, 0.0));
        assert!(clamped.total <= MAX_TOTAL);
        assert_eq!(clamped.total, clamped.implied_total());
        assert!(clamped.labor > clamped.materials);
    }
}
