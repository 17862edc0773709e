use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::trades::{DrywallSignals, ElectricalSignals, PaintingSignals, PlumbingSignals};
use super::EstimateError;

/// Trades with a deterministic rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Trade {
    Painting,
    Drywall,
    Electrical,
    Plumbing,
}

impl Trade {
    pub const ALL: [Trade; 4] = [
        Trade::Painting,
        Trade::Drywall,
        Trade::Electrical,
        Trade::Plumbing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Trade::Painting => "painting",
            Trade::Drywall => "drywall",
            Trade::Electrical => "electrical",
            Trade::Plumbing => "plumbing",
        }
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Trade {
    type Err = EstimateError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "painting" | "paint" | "painter" => Ok(Trade::Painting),
            "drywall" | "sheetrock" => Ok(Trade::Drywall),
            "electrical" | "electric" | "electrician" => Ok(Trade::Electrical),
            "plumbing" | "plumber" => Ok(Trade::Plumbing),
            _ => Err(EstimateError::UnsupportedTrade(value.trim().to_string())),
        }
    }
}

impl TryFrom<String> for Trade {
    type Error = EstimateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Pricing archetype selected for a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Unknown,
    Rooms,
    Doors,
    RoomsAndDoors,
    WallArea,
    InstallFinish,
    PatchRepair,
    DeviceWork,
    DedicatedCircuits,
    PanelReplacement,
    EvCharger,
    FixtureSwaps,
    BathPlumbingRoughIn,
}

impl JobType {
    pub fn label(&self) -> &'static str {
        match self {
            JobType::Unknown => "unknown",
            JobType::Rooms => "rooms",
            JobType::Doors => "doors",
            JobType::RoomsAndDoors => "rooms_and_doors",
            JobType::WallArea => "wall_area",
            JobType::InstallFinish => "install_finish",
            JobType::PatchRepair => "patch_repair",
            JobType::DeviceWork => "device_work",
            JobType::DedicatedCircuits => "dedicated_circuits",
            JobType::PanelReplacement => "panel_replacement",
            JobType::EvCharger => "ev_charger",
            JobType::FixtureSwaps => "fixture_swaps",
            JobType::BathPlumbingRoughIn => "bath_plumbing_rough_in",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Line-itemized price in whole dollars; `markup` is a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub labor: f64,
    pub materials: f64,
    pub subs: f64,
    pub markup: f64,
    pub total: f64,
}

impl Pricing {
    /// Build a pricing from components; the total is always derived.
    pub fn from_components(labor: f64, materials: f64, subs: f64, markup: f64) -> Self {
        super::clamp::clamp_pricing(Pricing {
            labor,
            materials,
            subs,
            markup,
            total: 0.0,
        })
    }

    pub fn base(&self) -> f64 {
        self.labor + self.materials + self.subs
    }

    pub fn implied_total(&self) -> f64 {
        (self.base() * (1.0 + self.markup / 100.0)).round()
    }
}

/// Untrusted estimate produced outside the deterministic engine.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerativeEstimate {
    #[serde(default)]
    pub labor: f64,
    #[serde(default)]
    pub materials: f64,
    #[serde(default)]
    pub subs: f64,
    #[serde(default)]
    pub markup: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

impl GenerativeEstimate {
    /// True when at least one cost component is a positive, finite amount.
    pub fn has_costs(&self) -> bool {
        [self.labor, self.materials, self.subs]
            .into_iter()
            .any(|amount| amount.is_finite() && amount > 0.0)
    }
}

/// Selector deciding which surfaces painting-by-room includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaintScope {
    #[default]
    Walls,
    WallsCeilings,
    Full,
}

impl PaintScope {
    pub fn includes_ceilings(&self) -> bool {
        matches!(self, PaintScope::WallsCeilings | PaintScope::Full)
    }

    pub fn includes_trim(&self) -> bool {
        matches!(self, PaintScope::Full)
    }
}

impl FromStr for PaintScope {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "walls" => Ok(PaintScope::Walls),
            "walls_ceilings" => Ok(PaintScope::WallsCeilings),
            "full" => Ok(PaintScope::Full),
            other => Err(format!(
                "unknown paint scope '{other}' (expected walls, walls_ceilings, or full)"
            )),
        }
    }
}

/// Structured takeoff measurements supplied alongside the scope text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Measurements {
    #[serde(default)]
    pub total_sqft: Option<f64>,
    #[serde(default)]
    pub rows: Vec<MeasurementRow>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasurementRow {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub length_ft: Option<f64>,
    #[serde(default)]
    pub width_ft: Option<f64>,
    #[serde(default)]
    pub sqft: Option<f64>,
}

impl MeasurementRow {
    fn area(&self) -> Option<f64> {
        let direct = self.sqft.filter(|value| value.is_finite() && *value > 0.0);
        direct.or_else(|| match (self.length_ft, self.width_ft) {
            (Some(length), Some(width)) => Some(length * width),
            _ => None,
        })
        .filter(|value| value.is_finite() && *value > 0.0)
    }
}

impl Measurements {
    pub fn from_total(total_sqft: f64) -> Self {
        Self {
            total_sqft: Some(total_sqft),
            rows: Vec::new(),
        }
    }

    /// Positive total when supplied, otherwise the sum of usable rows.
    pub fn effective_sqft(&self) -> Option<f64> {
        if let Some(total) = self.total_sqft.filter(|value| value.is_finite() && *value > 0.0) {
            return Some(total);
        }

        let summed: f64 = self.rows.iter().filter_map(MeasurementRow::area).sum();
        (summed > 0.0).then_some(summed)
    }
}

/// Everything a trade engine reads for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeInput {
    pub text: String,
    pub state_multiplier: f64,
    pub measurements: Option<Measurements>,
    pub paint_scope: Option<PaintScope>,
}

impl ScopeInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state_multiplier: 1.0,
            measurements: None,
            paint_scope: None,
        }
    }

    pub fn with_state_multiplier(mut self, multiplier: f64) -> Self {
        self.state_multiplier = multiplier;
        self
    }

    pub fn with_measurements(mut self, measurements: Measurements) -> Self {
        self.measurements = Some(measurements);
        self
    }

    pub fn with_paint_scope(mut self, paint_scope: PaintScope) -> Self {
        self.paint_scope = Some(paint_scope);
        self
    }

    pub(crate) fn measured_sqft(&self) -> Option<f64> {
        self.measurements
            .as_ref()
            .and_then(Measurements::effective_sqft)
    }

    /// Multiplier actually applied; degenerate values fall back to the baseline.
    pub(crate) fn effective_state_multiplier(&self) -> f64 {
        if self.state_multiplier.is_finite() && self.state_multiplier > 0.0 {
            self.state_multiplier
        } else {
            1.0
        }
    }
}

/// Per-trade signals extracted from the scope text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "trade", rename_all = "snake_case")]
pub enum Signals {
    Painting(PaintingSignals),
    Drywall(DrywallSignals),
    Electrical(ElectricalSignals),
    Plumbing(PlumbingSignals),
}

impl Signals {
    pub fn trade(&self) -> Trade {
        match self {
            Signals::Painting(_) => Trade::Painting,
            Signals::Drywall(_) => Trade::Drywall,
            Signals::Electrical(_) => Trade::Electrical,
            Signals::Plumbing(_) => Trade::Plumbing,
        }
    }
}

/// Outcome of a trade engine: classification, optional price, and the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeterministicResult {
    pub ok_for_deterministic: bool,
    pub ok_for_verified: bool,
    pub pricing: Option<Pricing>,
    pub job_type: JobType,
    pub signals: Signals,
    pub notes: Vec<String>,
}

impl DeterministicResult {
    pub(crate) fn new(
        ok_for_deterministic: bool,
        ok_for_verified: bool,
        pricing: Option<Pricing>,
        job_type: JobType,
        signals: Signals,
        mut notes: Vec<String>,
    ) -> Self {
        let pricing = if ok_for_deterministic { pricing } else { None };
        if ok_for_deterministic && pricing.is_none() && job_type != JobType::Unknown {
            notes.push(format!("{job_type} produced no price; downgraded to unknown"));
        }
        let ok_for_deterministic = ok_for_deterministic && pricing.is_some();

        Self {
            ok_for_deterministic,
            ok_for_verified: ok_for_verified && ok_for_deterministic,
            pricing,
            job_type: if ok_for_deterministic {
                job_type
            } else {
                JobType::Unknown
            },
            signals,
            notes,
        }
    }

    pub fn trade(&self) -> Trade {
        self.signals.trade()
    }
}
