use std::sync::LazyLock;

use serde::Serialize;

use super::super::config::{PlumbingRates, PricingConfig, UnitRate};
use super::super::domain::{JobType, Pricing, ScopeInput, Signals, Trade};
use super::super::matcher::{QuantityPattern, Vocabulary};
use super::super::pricing::{finalize, Overheads, Takeoff};
use super::super::rules::{Governing, Rule, TradeSignals};
use super::{TradeEngine, WorkIntent};

static TOILETS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("toilets?|commodes?").with_labels());

static FAUCETS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("faucets?")
        .with_labels()
        .rejecting_gap(&["outdoor", "exterior"])
});

static SINKS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("sinks?").with_labels());

static VANITIES: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("vanit(?:y|ies)")
        .rejecting_next(&["faucet", "faucets", "sink", "sinks", "light", "lights"])
});

static DISPOSALS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("(?:garbage )?disposals?|disposers?"));

static SHOWER_VALVES: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("shower valves?|tub valves?|mixing valves?|shower cartridges?")
});

static WATER_HEATERS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("water heaters?|tankless(?: water)? heaters?|tankless units?")
});

static HOSE_BIBS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("hose bibb?s?|spigots?|sillcocks?|outdoor faucets?|exterior faucets?")
});

static BATHROOMS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("bathrooms?|baths?"));

static FIXTURE_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "toilets?",
        "faucets?",
        "sinks?",
        "vanit(?:y|ies)",
        "disposals?",
        "shower valves?",
        "water heaters?",
        "hose bibb?s?",
        "fixtures?",
    ])
});

static ROUGH_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "rough[- ]?in",
        "valves?",
        "drains?",
        "supply lines?",
        "supplies",
        "relocat(?:e|ed|ing|ion)",
        "vents?",
        "venting",
        "stack",
    ])
});

static DEMO_TILE_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "demo(?:lition)?",
        "gut",
        "tear[- ]?out",
        "tile",
        "remodel(?:ing)?",
        "renovat(?:e|ion|ing)",
    ])
});

static TROUBLESHOOTING: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "leak(?:s|ing|y)?",
        "clog(?:s|ged)?",
        "diagnos(?:e|is|tic)",
        "troubleshoot(?:ing)?",
        "running toilets?",
        "low (?:water )?pressure",
        "no hot water",
    ])
});

static HEAVY: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "re-?pip(?:e|ed|ing)",
        "trench(?:ing)?",
        "sewer lines?",
        "main line",
        "slab leak",
        "gut",
        "whole house",
        "entire house",
        "water main",
    ])
});

/// Structured tally of the fixtures named in a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixtureBreakdown {
    pub toilets: u32,
    pub faucets: u32,
    pub sinks: u32,
    pub vanities: u32,
    pub disposals: u32,
    pub shower_valves: u32,
    pub water_heaters: u32,
    pub hose_bibs: u32,
}

impl FixtureBreakdown {
    fn parse(text: &str) -> Self {
        let count = |pattern: &QuantityPattern| pattern.count(text).unwrap_or(0);
        Self {
            toilets: count(&TOILETS),
            faucets: count(&FAUCETS),
            sinks: count(&SINKS),
            vanities: count(&VANITIES),
            disposals: count(&DISPOSALS),
            shower_valves: count(&SHOWER_VALVES),
            water_heaters: count(&WATER_HEATERS),
            hose_bibs: count(&HOSE_BIBS),
        }
    }

    fn lines<'r>(&self, rates: &'r PlumbingRates) -> [(u32, &'static str, &'r UnitRate); 8] {
        [
            (self.toilets, "toilet", &rates.toilet),
            (self.faucets, "faucet", &rates.faucet),
            (self.sinks, "sink", &rates.sink),
            (self.vanities, "vanity", &rates.vanity),
            (self.disposals, "disposal", &rates.disposal),
            (self.shower_valves, "shower valve", &rates.shower_valve),
            (self.water_heaters, "water heater", &rates.water_heater),
            (self.hose_bibs, "hose bib", &rates.hose_bib),
        ]
    }

    pub fn total(&self) -> u32 {
        [
            self.toilets,
            self.faucets,
            self.sinks,
            self.vanities,
            self.disposals,
            self.shower_valves,
            self.water_heaters,
            self.hose_bibs,
        ]
        .into_iter()
        .fold(0u32, u32::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Quantities and flags read from a plumbing scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlumbingSignals {
    pub fixtures: FixtureBreakdown,
    pub bathrooms: Option<u32>,
    pub mentions_fixture: bool,
    pub mentions_rough_in: bool,
    pub mentions_demo_or_tile: bool,
    pub troubleshooting: bool,
    pub intent: WorkIntent,
    pub heavy_term: Option<String>,
}

impl PlumbingSignals {
    /// Replacement wording aimed at named fixtures.
    pub fn looks_like_fixture_replacement(&self) -> bool {
        self.intent == WorkIntent::Swap && (!self.fixtures.is_empty() || self.mentions_fixture)
    }
}

impl TradeSignals for PlumbingSignals {
    fn heavy_term(&self) -> Option<&str> {
        self.heavy_term.as_deref()
    }

    fn has_explicit_units(&self) -> bool {
        !self.fixtures.is_empty() || self.bathrooms.is_some()
    }
}

static RULES: [Rule<PlumbingSignals>; 2] = [
    Rule {
        job_type: JobType::BathPlumbingRoughIn,
        claims: |s| {
            s.mentions_rough_in && s.mentions_demo_or_tile && !s.looks_like_fixture_replacement()
        },
        governing: |s| {
            Some(
                s.bathrooms
                    .map(|baths| Governing::explicit(f64::from(baths)))
                    .unwrap_or_else(|| Governing::inferred(1.0)),
            )
        },
        missing: "no bathroom count found",
    },
    Rule {
        job_type: JobType::FixtureSwaps,
        claims: |s| !s.fixtures.is_empty() || s.mentions_fixture,
        governing: |s| {
            let total = s.fixtures.total();
            (total > 0).then(|| Governing::explicit(f64::from(total)))
        },
        missing: "no fixture counts found",
    },
];

fn fixture_takeoff(signals: &PlumbingSignals, rates: &PlumbingRates) -> (Takeoff, Vec<String>) {
    let mut hours = 0.0;
    let mut materials = 0.0;
    let mut items = Vec::new();
    for (count, name, unit) in signals.fixtures.lines(rates) {
        if count == 0 {
            continue;
        }
        hours += f64::from(count) * unit.hours;
        materials += f64::from(count) * unit.materials;
        items.push(format!("{count} {name}(s)"));
    }

    let mut notes = vec![
        format!("fixture breakdown: {}", items.join(", ")),
        signals.intent.note().to_string(),
    ];
    let heaters = signals.fixtures.water_heaters;
    let permit = if heaters > 0 {
        notes.push("water heater permit allowance added".to_string());
        f64::from(heaters) * rates.water_heater_permit
    } else {
        0.0
    };

    let takeoff = Takeoff {
        labor_hours: hours * signals.intent.multiplier(&rates.intent) + rates.setup_hours,
        materials,
        mobilization: rates.fixture_tiers.fee(f64::from(signals.fixtures.total())),
        permit,
    };
    (takeoff, notes)
}

pub(crate) struct PlumbingEngine;

impl TradeEngine for PlumbingEngine {
    type Signals = PlumbingSignals;

    const TRADE: Trade = Trade::Plumbing;
    const FALLBACK: &'static str = "no fixture counts or bathroom rough-in scope found";

    fn extract(text: &str, _input: &ScopeInput, _config: &PricingConfig) -> PlumbingSignals {
        PlumbingSignals {
            fixtures: FixtureBreakdown::parse(text),
            bathrooms: BATHROOMS.count(text),
            mentions_fixture: FIXTURE_WORDS.matches(text),
            mentions_rough_in: ROUGH_WORDS.matches(text),
            mentions_demo_or_tile: DEMO_TILE_WORDS.matches(text),
            troubleshooting: TROUBLESHOOTING.matches(text),
            intent: WorkIntent::detect(text),
            heavy_term: HEAVY.first(text).map(str::to_string),
        }
    }

    fn rules() -> &'static [Rule<PlumbingSignals>] {
        &RULES
    }

    fn price(
        job_type: JobType,
        governing: Governing,
        signals: &PlumbingSignals,
        state_multiplier: f64,
        config: &PricingConfig,
    ) -> Option<(Pricing, Vec<String>)> {
        let rates = &config.plumbing;
        let (mut takeoff, mut notes) = match job_type {
            JobType::FixtureSwaps => fixture_takeoff(signals, rates),
            JobType::BathPlumbingRoughIn => {
                let baths = governing.quantity;
                (
                    Takeoff {
                        labor_hours: baths * rates.rough_in_per_bath.hours,
                        materials: baths * rates.rough_in_per_bath.materials,
                        mobilization: rates.bath_tiers.fee(baths),
                        permit: rates.rough_in_permit,
                    },
                    vec![format!("{baths} bathroom rough-in(s) with permit allowance")],
                )
            }
            _ => return None,
        };

        if signals.troubleshooting {
            takeoff.labor_hours += rates.troubleshooting_hours;
            notes.push("troubleshooting allowance added".to_string());
        }

        let overheads = Overheads {
            labor_rate: rates.labor_rate,
            supervision_pct: config.supervision_pct,
            markup: config.default_markup,
        };
        Some((finalize(&takeoff, &overheads, state_multiplier), notes))
    }

    fn wrap(signals: PlumbingSignals) -> Signals {
        Signals::Plumbing(signals)
    }
}
