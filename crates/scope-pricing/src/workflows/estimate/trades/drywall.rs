use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::super::config::{DrywallRates, PricingConfig};
use super::super::domain::{JobType, Pricing, ScopeInput, Signals, Trade};
use super::super::matcher::{sum_sheets, sum_sqft, QuantityPattern, Vocabulary};
use super::super::pricing::{finalize, Overheads, Takeoff};
use super::super::rules::{Governing, Rule, TradeSignals};
use super::TradeEngine;

static PATCHES: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("patch(?:es)?|holes?|dents?|cracks?|damaged (?:spots?|areas?)").with_labels()
});

static FINISH_LEVEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:level\s*-?\s*([3-5])|l([3-5]))\b").expect("FINISH_LEVEL regex should compile")
});

static SKIM: LazyLock<Vocabulary> =
    LazyLock::new(|| Vocabulary::new(&["skim[- ]?coat(?:ing|ed)?", "smooth wall", "smooth finish"]));

static TEXTURE: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "texture(?:d)?(?: match(?:ing)?)?",
        "orange peel",
        "knock[- ]?down",
        "popcorn",
        "skip trowel",
    ])
});

static CEILINGS: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(&["ceilings?"]));

static HANG: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "hang(?:ing)?",
        "install(?:ing)?",
        "new drywall",
        "sheetrock",
        "board up",
        "tape(?: and| &)? (?:mud|finish)",
        "taping",
        "mud(?:ding)?",
        "finish(?:ing)?",
    ])
});

static PATCH_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "patch(?:es|ing)?",
        "holes?",
        "dents?",
        "cracks?",
        "repair(?:s|ing)?",
        "nail pops?",
    ])
});

static HEAVY: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "water damage",
        "flood(?:ed|ing)?",
        "fire damage",
        "mold",
        "asbestos",
        "gut",
        "remodel(?:ing)?",
        "whole house",
        "entire house",
        "demo(?:lition)?",
    ])
});

/// Quantities and flags read from a drywall scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrywallSignals {
    pub text_sqft: Option<f64>,
    pub sheets: Option<u32>,
    pub sheet_sqft: Option<f64>,
    pub measured_sqft: Option<f64>,
    pub patches: Option<u32>,
    pub mentions_hang: bool,
    pub mentions_patch: bool,
    pub texture: bool,
    pub ceilings: bool,
    pub finish_level: Option<u8>,
    pub heavy_term: Option<String>,
}

impl DrywallSignals {
    fn area(&self) -> Option<Governing> {
        self.text_sqft
            .or(self.sheet_sqft)
            .map(Governing::explicit)
            .or_else(|| self.measured_sqft.map(Governing::inferred))
    }

    /// Extra finishing effort above the level 3 baseline.
    fn finish_increment(&self, level4: f64, level5: f64) -> f64 {
        match self.finish_level {
            Some(5) => level5,
            Some(4) => level4,
            _ => 0.0,
        }
    }
}

impl TradeSignals for DrywallSignals {
    fn heavy_term(&self) -> Option<&str> {
        self.heavy_term.as_deref()
    }

    fn has_explicit_units(&self) -> bool {
        self.text_sqft.is_some() || self.sheets.is_some() || self.patches.is_some()
    }
}

fn parse_finish_level(text: &str) -> Option<u8> {
    let stated = FINISH_LEVEL.captures(text).and_then(|captures| {
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .and_then(|level| level.as_str().parse::<u8>().ok())
    });
    stated.or_else(|| SKIM.matches(text).then_some(5))
}

static RULES: [Rule<DrywallSignals>; 2] = [
    Rule {
        job_type: JobType::InstallFinish,
        // A patch count only yields to install work when hanging wording and an area are both present.
        claims: |s| {
            let has_area = s.area().is_some();
            if s.patches.is_some() {
                s.mentions_hang && has_area
            } else {
                s.mentions_hang || has_area
            }
        },
        governing: DrywallSignals::area,
        missing: "no square footage or sheet count found",
    },
    Rule {
        job_type: JobType::PatchRepair,
        claims: |s| s.patches.is_some() || s.mentions_patch,
        governing: |s| s.patches.map(|patches| Governing::explicit(f64::from(patches))),
        missing: "no patch or hole count found",
    },
];

fn install_takeoff(sqft: f64, signals: &DrywallSignals, rates: &DrywallRates) -> Takeoff {
    let mut hours_per_sqft = rates.hang_hours_per_sqft + rates.finish_hours_per_sqft;
    let mut materials_per_sqft = rates.materials_per_sqft;
    hours_per_sqft += signals.finish_increment(
        rates.level4_extra_hours_per_sqft,
        rates.level5_extra_hours_per_sqft,
    );
    if signals.ceilings {
        hours_per_sqft += rates.ceiling_extra_hours_per_sqft;
    }
    if signals.texture {
        hours_per_sqft += rates.texture_extra_hours_per_sqft;
        materials_per_sqft += rates.texture_materials_per_sqft;
    }

    Takeoff {
        labor_hours: rates.setup_hours + sqft * hours_per_sqft,
        materials: rates.material_allowance + sqft * materials_per_sqft,
        mobilization: rates.area_tiers.fee(sqft),
        permit: 0.0,
    }
}

fn patch_takeoff(patches: f64, signals: &DrywallSignals, rates: &DrywallRates) -> Takeoff {
    let mut hours_per_patch = rates.hours_per_patch;
    if signals.ceilings {
        hours_per_patch += rates.patch_ceiling_extra_hours;
    }
    if signals.texture {
        hours_per_patch += rates.patch_texture_extra_hours;
    }
    hours_per_patch +=
        signals.finish_increment(rates.patch_level4_extra_hours, rates.patch_level5_extra_hours);

    Takeoff {
        labor_hours: rates.patch_setup_hours + patches * hours_per_patch,
        materials: rates.patch_material_allowance + patches * rates.materials_per_patch,
        mobilization: rates.patch_tiers.fee(patches),
        permit: 0.0,
    }
}

fn adjustment_notes(signals: &DrywallSignals) -> Vec<String> {
    let mut notes = Vec::new();
    if let Some(level) = signals.finish_level {
        notes.push(format!("finish level {level} detected"));
    }
    if signals.ceilings {
        notes.push("ceiling work increment applied".to_string());
    }
    if signals.texture {
        notes.push("texture match increment applied".to_string());
    }
    notes
}

pub(crate) struct DrywallEngine;

impl TradeEngine for DrywallEngine {
    type Signals = DrywallSignals;

    const TRADE: Trade = Trade::Drywall;
    const FALLBACK: &'static str = "no square footage, sheet count, or patch count found";

    fn extract(text: &str, input: &ScopeInput, config: &PricingConfig) -> DrywallSignals {
        let sheets = sum_sheets(text, config.drywall.default_sheet_sqft);
        DrywallSignals {
            text_sqft: sum_sqft(text),
            sheets: sheets.map(|tally| tally.sheets),
            sheet_sqft: sheets.map(|tally| tally.sqft),
            measured_sqft: input.measured_sqft(),
            patches: PATCHES.count(text),
            mentions_hang: HANG.matches(text),
            mentions_patch: PATCH_WORDS.matches(text),
            texture: TEXTURE.matches(text),
            ceilings: CEILINGS.matches(text),
            finish_level: parse_finish_level(text),
            heavy_term: HEAVY.first(text).map(str::to_string),
        }
    }

    fn rules() -> &'static [Rule<DrywallSignals>] {
        &RULES
    }

    fn price(
        job_type: JobType,
        governing: Governing,
        signals: &DrywallSignals,
        state_multiplier: f64,
        config: &PricingConfig,
    ) -> Option<(Pricing, Vec<String>)> {
        let rates = &config.drywall;
        let mut notes = adjustment_notes(signals);
        let takeoff = match job_type {
            JobType::InstallFinish => {
                if signals.text_sqft.is_none() {
                    if let Some(sheets) = signals.sheets {
                        notes.push(format!(
                            "{sheets} sheet(s) converted to {} sq ft",
                            governing.quantity
                        ));
                    }
                }
                install_takeoff(governing.quantity, signals, rates)
            }
            JobType::PatchRepair => patch_takeoff(governing.quantity, signals, rates),
            _ => return None,
        };

        let overheads = Overheads {
            labor_rate: rates.labor_rate,
            supervision_pct: config.supervision_pct,
            markup: config.default_markup,
        };
        Some((finalize(&takeoff, &overheads, state_multiplier), notes))
    }

    fn wrap(signals: DrywallSignals) -> Signals {
        Signals::Drywall(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::super::compute_deterministic;
    use super::*;
    use crate::workflows::estimate::domain::Measurements;
    use crate::workflows::estimate::DeterministicResult;

    fn run(text: &str) -> DeterministicResult {
        compute_deterministic(Trade::Drywall, &ScopeInput::new(text), &PricingConfig::default())
    }

    #[test]
    fn sheets_become_square_footage() {
        let result = run("Hang and finish 12 sheets of 4x12 drywall in the garage");
        assert_eq!(result.job_type, JobType::InstallFinish);
        assert!(result.ok_for_verified);
        match &result.signals {
            Signals::Drywall(signals) => {
                assert_eq!(signals.sheets, Some(12));
                assert_eq!(signals.sheet_sqft, Some(576.0));
            }
            other => panic!("expected drywall signals, got {other:?}"),
        }
    }

    #[test]
    fn patch_counts_win_over_bare_repair_wording() {
        let result = run("patch 4 holes in hallway walls and match texture");
        assert_eq!(result.job_type, JobType::PatchRepair);
        assert!(result.ok_for_verified);
        assert!(result
            .notes
            .iter()
            .any(|note| note.contains("texture match")));
    }

    #[test]
    fn patch_wording_without_count_is_refused() {
        let result = run("repair a few spots of drywall in the bedroom");
        assert_eq!(result.job_type, JobType::Unknown);
        assert!(result.notes[0].contains("patch_repair"));
    }

    #[test]
    fn hang_wording_without_area_is_refused() {
        let result = run("hang new drywall in the basement");
        assert_eq!(result.job_type, JobType::Unknown);
        assert!(result.notes[0].contains("install_finish"));
    }

    #[test]
    fn finish_level_and_ceiling_increase_install_price() {
        let plain = run("hang and finish 800 sq ft of drywall")
            .pricing
            .expect("priced");
        let level5 = run("hang and finish 800 sq ft of drywall, level 5")
            .pricing
            .expect("priced");
        let ceiling = run("hang and finish 800 sq ft of drywall on ceilings, level 5")
            .pricing
            .expect("priced");
        assert!(plain.labor < level5.labor);
        assert!(level5.labor < ceiling.labor);
    }

    #[test]
    fn each_higher_finish_level_adds_labor() {
        let labor = |text: &str| run(text).pricing.expect("priced").labor;
        let level3 = labor("hang and finish 800 sq ft of drywall, level 3");
        let level4 = labor("hang and finish 800 sq ft of drywall, level 4");
        let level5 = labor("hang and finish 800 sq ft of drywall, level 5");
        assert_eq!(level3, labor("hang and finish 800 sq ft of drywall"));
        assert!(level3 < level4);
        assert!(level4 < level5);
        assert!(labor("patch 4 holes, level 3") < labor("patch 4 holes, level 4"));
        assert!(labor("patch 4 holes, level 4") < labor("patch 4 holes, level 5"));
    }

    #[test]
    fn skim_coat_reads_as_level_five() {
        assert_eq!(parse_finish_level("skim coat 300 sq ft"), Some(5));
        assert_eq!(parse_finish_level("finish to l4"), Some(4));
        assert_eq!(parse_finish_level("level 2 finish"), None);
        assert_eq!(parse_finish_level("hang 10 sheets"), None);
    }

    #[test]
    fn measurement_area_is_unverified() {
        let result = compute_deterministic(
            Trade::Drywall,
            &ScopeInput::new("hang and tape drywall in the addition")
                .with_measurements(Measurements::from_total(640.0)),
            &PricingConfig::default(),
        );
        assert_eq!(result.job_type, JobType::InstallFinish);
        assert!(result.ok_for_deterministic);
        assert!(!result.ok_for_verified);
    }

    #[test]
    fn water_damage_without_counts_is_refused() {
        let result = run("water damage in the kitchen, replace drywall as needed");
        assert_eq!(result.job_type, JobType::Unknown);
        assert!(result.notes[0].contains("water damage"));
    }

    #[test]
    fn water_damage_with_area_still_prices() {
        let result = run("water damage: replace 200 sq ft of drywall");
        assert_eq!(result.job_type, JobType::InstallFinish);
    }
}
