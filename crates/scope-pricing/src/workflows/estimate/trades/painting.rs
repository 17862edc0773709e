use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::super::config::{PaintingRates, PricingConfig};
use super::super::domain::{JobType, PaintScope, Pricing, ScopeInput, Signals, Trade};
use super::super::matcher::{sum_sqft, QuantityPattern, Vocabulary};
use super::super::pricing::{finalize, Overheads, Takeoff};
use super::super::rules::{Governing, Rule, TradeSignals};
use super::TradeEngine;

static ROOMS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new(
        "rooms?|bedrooms?|bathrooms?|baths?|kitchens?|offices?|hallways?|dens?|nurser(?:y|ies)|foyers?|lofts?",
    )
    .rejecting_next(&["door", "doors"])
});

static DOORS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("doors?|door slabs?").with_labels());

static COATS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(one|two|three|single|double|[1-4])[\s-]*coats?\b")
        .expect("COATS regex should compile")
});

static CEILINGS: LazyLock<Vocabulary> = LazyLock::new(|| Vocabulary::new(&["ceilings?"]));

static TRIM: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "trim",
        "casings?",
        "frames?",
        "baseboards?",
        "jambs?",
        "mou?ldings?",
    ])
});

static HEAVY: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "exterior",
        "siding",
        "stucco",
        r"lead(?:[- ]based)? (?:paint|abatement)",
        "wallpaper removal",
        "remov(?:e|ing) (?:the )?wallpaper",
        "water damage",
        "fire damage",
        "popcorn (?:ceiling )?removal",
        "remodel(?:ing)?",
        "gut",
        "whole house",
        "entire house",
    ])
});

/// Quantities and flags read from a painting scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaintingSignals {
    pub rooms: Option<u32>,
    pub doors: Option<u32>,
    pub text_sqft: Option<f64>,
    pub measured_sqft: Option<f64>,
    pub coats: Option<u32>,
    pub includes_ceilings: bool,
    pub mentions_trim: bool,
    pub paint_scope: PaintScope,
    pub heavy_term: Option<String>,
}

impl TradeSignals for PaintingSignals {
    fn heavy_term(&self) -> Option<&str> {
        self.heavy_term.as_deref()
    }

    fn has_explicit_units(&self) -> bool {
        self.rooms.is_some() || self.doors.is_some() || self.text_sqft.is_some()
    }
}

fn parse_coats(text: &str) -> Option<u32> {
    let captures = COATS.captures(text)?;
    match captures.get(1)?.as_str() {
        "one" | "single" | "1" => Some(1),
        "two" | "double" | "2" => Some(2),
        "three" | "3" => Some(3),
        "4" => Some(4),
        _ => None,
    }
}

static RULES: [Rule<PaintingSignals>; 4] = [
    Rule {
        job_type: JobType::RoomsAndDoors,
        claims: |s| s.rooms.is_some() && s.doors.is_some(),
        governing: |s| {
            Some(Governing::explicit(f64::from(
                s.rooms?.saturating_add(s.doors?),
            )))
        },
        missing: "room and door counts are required",
    },
    Rule {
        job_type: JobType::Rooms,
        claims: |s| s.rooms.is_some(),
        governing: |s| s.rooms.map(|rooms| Governing::explicit(f64::from(rooms))),
        missing: "no room count found",
    },
    Rule {
        job_type: JobType::Doors,
        claims: |s| s.doors.is_some(),
        governing: |s| s.doors.map(|doors| Governing::explicit(f64::from(doors))),
        missing: "no door count found",
    },
    Rule {
        job_type: JobType::WallArea,
        claims: |s| s.text_sqft.is_some() || s.measured_sqft.is_some(),
        governing: |s| {
            s.text_sqft
                .map(Governing::explicit)
                .or_else(|| s.measured_sqft.map(Governing::inferred))
        },
        missing: "no paintable square footage found",
    },
];

fn gallons(coated_sqft: f64, rates: &PaintingRates) -> f64 {
    if rates.coverage_sqft_per_gallon <= 0.0 {
        return 0.0;
    }
    (coated_sqft / rates.coverage_sqft_per_gallon * (1.0 + rates.waste_factor)).ceil()
}

fn coats(signals: &PaintingSignals, rates: &PaintingRates) -> f64 {
    f64::from(signals.coats.unwrap_or(rates.default_coats).max(1))
}

fn room_takeoff(rooms: f64, signals: &PaintingSignals, rates: &PaintingRates) -> Takeoff {
    let scope = signals.paint_scope;
    let walls = rooms * rates.room_perimeter_ft * rates.wall_height_ft;
    let ceilings = if scope.includes_ceilings() {
        rooms * rates.ceiling_sqft_per_room
    } else {
        0.0
    };
    let coated = (walls + ceilings) * coats(signals, rates);

    let mut labor_hours =
        coated / rates.sqft_per_labor_hour + rooms * rates.prep_hours_per_room;
    let mut materials =
        gallons(coated, rates) * rates.paint_cost_per_gallon + rooms * rates.sundries_per_room;

    if scope.includes_trim() {
        labor_hours += rooms * rates.trim_hours_per_room;
        materials += rooms * rates.trim_materials_per_room;
    }

    Takeoff {
        labor_hours,
        materials,
        ..Takeoff::default()
    }
}

fn door_takeoff(doors: f64, signals: &PaintingSignals, rates: &PaintingRates) -> Takeoff {
    let mut per_door_hours = rates.hours_per_door + rates.door_trim_hours;
    if signals.mentions_trim {
        per_door_hours += rates.door_trim_mention_hours;
    }

    Takeoff {
        labor_hours: doors * per_door_hours,
        materials: doors * (rates.materials_per_door + rates.door_trim_materials),
        ..Takeoff::default()
    }
}

fn area_takeoff(sqft: f64, signals: &PaintingSignals, rates: &PaintingRates) -> Takeoff {
    let coated = sqft * coats(signals, rates);
    Takeoff {
        labor_hours: coated / rates.sqft_per_labor_hour,
        materials: gallons(coated, rates) * rates.paint_cost_per_gallon
            + sqft * rates.sundries_per_sqft,
        ..Takeoff::default()
    }
}

fn scope_notes(signals: &PaintingSignals, rates: &PaintingRates, job_type: JobType) -> Vec<String> {
    let mut notes = Vec::new();
    let coat_count = signals.coats.unwrap_or(rates.default_coats);
    match signals.coats {
        Some(_) => notes.push(format!("{coat_count} coat(s) stated in scope")),
        None => notes.push(format!("{coat_count} coat(s) assumed")),
    }

    if matches!(job_type, JobType::Rooms | JobType::RoomsAndDoors) {
        let scope = signals.paint_scope;
        notes.push(format!("paint scope selector: {scope:?}"));
        if signals.includes_ceilings && !scope.includes_ceilings() {
            notes.push("ceilings mentioned but excluded by paint scope selector".to_string());
        }
        if signals.mentions_trim && !scope.includes_trim() {
            notes.push("trim mentioned but excluded by paint scope selector".to_string());
        }
    }

    if matches!(job_type, JobType::Doors | JobType::RoomsAndDoors) {
        if signals.mentions_trim {
            notes.push("door trim/casing allowance increased (trim mentioned)".to_string());
        } else {
            notes.push("door trim/casing allowance included".to_string());
        }
    }

    notes
}

pub(crate) struct PaintingEngine;

impl TradeEngine for PaintingEngine {
    type Signals = PaintingSignals;

    const TRADE: Trade = Trade::Painting;
    const FALLBACK: &'static str = "no room count, door count, or square footage found";

    fn extract(text: &str, input: &ScopeInput, _config: &PricingConfig) -> PaintingSignals {
        PaintingSignals {
            rooms: ROOMS.count(text),
            doors: DOORS.count(text),
            text_sqft: sum_sqft(text),
            measured_sqft: input.measured_sqft(),
            coats: parse_coats(text),
            includes_ceilings: CEILINGS.matches(text),
            mentions_trim: TRIM.matches(text),
            paint_scope: input.paint_scope.unwrap_or_default(),
            heavy_term: HEAVY.first(text).map(str::to_string),
        }
    }

    fn rules() -> &'static [Rule<PaintingSignals>] {
        &RULES
    }

    fn price(
        job_type: JobType,
        governing: Governing,
        signals: &PaintingSignals,
        state_multiplier: f64,
        config: &PricingConfig,
    ) -> Option<(Pricing, Vec<String>)> {
        let rates = &config.painting;
        let takeoff = match job_type {
            JobType::Rooms => {
                let rooms = f64::from(signals.rooms?);
                Takeoff {
                    labor_hours: rates.setup_hours,
                    mobilization: rates.room_tiers.fee(rooms),
                    ..Takeoff::default()
                }
                .plus(room_takeoff(rooms, signals, rates))
            }
            JobType::Doors => {
                let doors = f64::from(signals.doors?);
                Takeoff {
                    labor_hours: rates.door_setup_hours,
                    mobilization: rates.door_tiers.fee(doors),
                    ..Takeoff::default()
                }
                .plus(door_takeoff(doors, signals, rates))
            }
            JobType::RoomsAndDoors => {
                let rooms = f64::from(signals.rooms?);
                let doors = f64::from(signals.doors?);
                Takeoff {
                    labor_hours: rates.setup_hours,
                    mobilization: rates.room_tiers.fee(rooms).max(rates.door_tiers.fee(doors)),
                    ..Takeoff::default()
                }
                .plus(room_takeoff(rooms, signals, rates))
                .plus(door_takeoff(doors, signals, rates))
            }
            JobType::WallArea => {
                let sqft = governing.quantity;
                Takeoff {
                    labor_hours: rates.setup_hours,
                    mobilization: rates.area_tiers.fee(sqft),
                    ..Takeoff::default()
                }
                .plus(area_takeoff(sqft, signals, rates))
            }
            _ => return None,
        };

        let overheads = Overheads {
            labor_rate: rates.labor_rate,
            supervision_pct: config.supervision_pct,
            markup: config.default_markup,
        };
        let mut notes = scope_notes(signals, rates, job_type);
        if job_type == JobType::WallArea && !governing.explicit {
            notes.push("square footage taken from measurements".to_string());
        }

        Some((finalize(&takeoff, &overheads, state_multiplier), notes))
    }

    fn wrap(signals: PaintingSignals) -> Signals {
        Signals::Painting(signals)
    }
}
