use std::sync::LazyLock;

use serde::Serialize;

use super::super::config::{ElectricalRates, PricingConfig, UnitRate};
use super::super::domain::{JobType, Pricing, ScopeInput, Signals, Trade};
use super::super::matcher::{QuantityPattern, Vocabulary};
use super::super::pricing::{finalize, Overheads, Takeoff};
use super::super::rules::{Governing, Rule, TradeSignals};
use super::{TradeEngine, WorkIntent};

static OUTLETS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("outlets?|receptacles?|gfcis?|usb outlets?").with_labels()
});

static SWITCHES: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("switch(?:es)?|dimmers?").with_labels());

static RECESSED: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new(
        "recessed(?: can)? lights?|can lights?|pot lights?|recessed cans?|downlights?|wafer lights?",
    )
});

static FIXTURES: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new(
        "light fixtures?|vanity lights?|fixtures?|pendants?|lights?|sconces?|chandeliers?",
    )
    .rejecting_gap(&["recessed", "can", "pot", "wafer"])
    .rejecting_next(&["switch", "switches"])
});

static FANS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("ceiling fans?|fans?|exhaust fans?"));

static CIRCUITS: LazyLock<QuantityPattern> =
    LazyLock::new(|| QuantityPattern::new("circuits?|home runs?").with_labels());

static PANELS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("panels?|subpanels?|sub-panels?|load centers?|breaker box(?:es)?")
        .rejecting_gap(&["solar"])
});

static EV_CHARGERS: LazyLock<QuantityPattern> = LazyLock::new(|| {
    QuantityPattern::new("ev chargers?|chargers?|charging stations?|wall connectors?")
});

static DEVICE_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "outlets?",
        "receptacles?",
        "gfcis?",
        "switch(?:es)?",
        "dimmers?",
        "recessed",
        "can lights?",
        "light fixtures?",
        "fixtures?",
        "sconces?",
        "pendants?",
        "ceiling fans?",
    ])
});

static CIRCUIT_WORDS: LazyLock<Vocabulary> =
    LazyLock::new(|| Vocabulary::new(&["dedicated", "circuits?", "home runs?"]));

static PANEL_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        r"(?:electrical |main |breaker |service )?panel (?:replacement|upgrade|swap|change ?out)",
        r"(?:replace|replacing|upgrade|upgrading|swap|swapping|change out)(?: the| an?| my)?(?: old| existing)?(?: \d+ ?(?:a|amp|amps))?(?: electrical| main| breaker| service)? (?:panel|subpanel|sub-panel|load center|breaker box)",
        "service upgrade",
        "heavy[- ]up",
        "new (?:electrical |main |breaker )?(?:panel|subpanel|load center)",
    ])
});

static EV_WORDS: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "ev",
        "electric vehicle",
        "ev charg(?:er|ers|ing)",
        "tesla",
        "wall connector",
        "level 2 charger",
        "nema 14-50",
    ])
});

static TROUBLESHOOTING: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "troubleshoot(?:ing)?",
        "diagnos(?:e|is|tic)",
        "not working",
        "trip(?:s|ping)",
        "flicker(?:s|ing)?",
        "dead",
        "no power",
    ])
});

static HEAVY: LazyLock<Vocabulary> = LazyLock::new(|| {
    Vocabulary::new(&[
        "rewir(?:e|ing)",
        "gut",
        "remodel(?:ing)?",
        "knob[- ]and[- ]tube",
        "aluminum wiring",
        "trench(?:ing)?",
        "new construction",
        "whole house",
        "entire house",
        "addition",
    ])
});

/// Structured tally of the devices named in a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeviceBreakdown {
    pub outlets: u32,
    pub switches: u32,
    pub recessed_lights: u32,
    pub light_fixtures: u32,
    pub ceiling_fans: u32,
}

impl DeviceBreakdown {
    fn parse(text: &str) -> Self {
        Self {
            outlets: OUTLETS.count(text).unwrap_or(0),
            switches: SWITCHES.count(text).unwrap_or(0),
            recessed_lights: RECESSED.count(text).unwrap_or(0),
            light_fixtures: FIXTURES.count(text).unwrap_or(0),
            ceiling_fans: FANS.count(text).unwrap_or(0),
        }
    }

    pub fn total(&self) -> u32 {
        self.outlets
            .saturating_add(self.switches)
            .saturating_add(self.recessed_lights)
            .saturating_add(self.light_fixtures)
            .saturating_add(self.ceiling_fans)
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    fn lines<'r>(&self, rates: &'r ElectricalRates) -> [(u32, &'static str, &'r UnitRate); 5] {
        [
            (self.outlets, "outlet", &rates.outlet),
            (self.switches, "switch", &rates.switch),
            (self.recessed_lights, "recessed light", &rates.recessed_light),
            (self.light_fixtures, "light fixture", &rates.light_fixture),
            (self.ceiling_fans, "ceiling fan", &rates.ceiling_fan),
        ]
    }
}

/// Quantities and flags read from an electrical scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElectricalSignals {
    pub devices: DeviceBreakdown,
    pub circuits: Option<u32>,
    pub panels: Option<u32>,
    pub ev_chargers: Option<u32>,
    pub mentions_devices: bool,
    pub mentions_circuit: bool,
    pub mentions_panel: bool,
    pub mentions_ev: bool,
    pub troubleshooting: bool,
    pub intent: WorkIntent,
    pub heavy_term: Option<String>,
}

impl TradeSignals for ElectricalSignals {
    fn heavy_term(&self) -> Option<&str> {
        self.heavy_term.as_deref()
    }

    fn has_explicit_units(&self) -> bool {
        !self.devices.is_empty()
            || self.circuits.is_some()
            || self.panels.is_some()
            || self.ev_chargers.is_some()
    }
}

/// Stated count, or one unit when only the vocabulary is present.
fn count_or_single(count: Option<u32>, mentioned: bool) -> Option<Governing> {
    count
        .map(|count| Governing::explicit(f64::from(count)))
        .or_else(|| mentioned.then(|| Governing::inferred(1.0)))
}

static RULES: [Rule<ElectricalSignals>; 4] = [
    Rule {
        job_type: JobType::PanelReplacement,
        claims: |s| s.panels.is_some() || s.mentions_panel,
        governing: |s| count_or_single(s.panels, s.mentions_panel),
        missing: "no panel count found",
    },
    Rule {
        job_type: JobType::EvCharger,
        claims: |s| s.ev_chargers.is_some() || s.mentions_ev,
        governing: |s| count_or_single(s.ev_chargers, s.mentions_ev),
        missing: "no charger count found",
    },
    Rule {
        job_type: JobType::DedicatedCircuits,
        // Circuit wording alongside counted devices describes device work on an existing circuit.
        claims: |s| s.circuits.is_some() || (s.mentions_circuit && s.devices.is_empty()),
        governing: |s| s.circuits.map(|count| Governing::explicit(f64::from(count))),
        missing: "no circuit count found",
    },
    Rule {
        job_type: JobType::DeviceWork,
        claims: |s| !s.devices.is_empty() || s.mentions_devices,
        governing: |s| {
            let total = s.devices.total();
            (total > 0).then(|| Governing::explicit(f64::from(total)))
        },
        missing: "no device counts found",
    },
];

fn unit_takeoff(count: f64, unit: &UnitRate) -> Takeoff {
    Takeoff {
        labor_hours: count * unit.hours,
        materials: count * unit.materials,
        ..Takeoff::default()
    }
}

fn device_takeoff(signals: &ElectricalSignals, rates: &ElectricalRates) -> (Takeoff, Vec<String>) {
    let mut hours = 0.0;
    let mut materials = 0.0;
    let mut items = Vec::new();
    for (count, name, unit) in signals.devices.lines(rates) {
        if count == 0 {
            continue;
        }
        hours += f64::from(count) * unit.hours;
        materials += f64::from(count) * unit.materials;
        items.push(format!("{count} {name}(s)"));
    }

    let takeoff = Takeoff {
        labor_hours: hours * signals.intent.multiplier(&rates.intent) + rates.device_setup_hours,
        materials,
        mobilization: rates
            .device_tiers
            .fee(f64::from(signals.devices.total())),
        permit: 0.0,
    };
    let notes = vec![
        format!("device breakdown: {}", items.join(", ")),
        signals.intent.note().to_string(),
    ];
    (takeoff, notes)
}

pub(crate) struct ElectricalEngine;

impl TradeEngine for ElectricalEngine {
    type Signals = ElectricalSignals;

    const TRADE: Trade = Trade::Electrical;
    const FALLBACK: &'static str = "no device, circuit, charger, or panel work found";

    fn extract(text: &str, _input: &ScopeInput, _config: &PricingConfig) -> ElectricalSignals {
        ElectricalSignals {
            devices: DeviceBreakdown::parse(text),
            circuits: CIRCUITS.count(text),
            panels: PANELS.count(text),
            ev_chargers: EV_CHARGERS.count(text),
            mentions_devices: DEVICE_WORDS.matches(text),
            mentions_circuit: CIRCUIT_WORDS.matches(text),
            mentions_panel: PANEL_WORDS.matches(text),
            mentions_ev: EV_WORDS.matches(text),
            troubleshooting: TROUBLESHOOTING.matches(text),
            intent: WorkIntent::detect(text),
            heavy_term: HEAVY.first(text).map(str::to_string),
        }
    }

    fn rules() -> &'static [Rule<ElectricalSignals>] {
        &RULES
    }

    fn price(
        job_type: JobType,
        governing: Governing,
        signals: &ElectricalSignals,
        state_multiplier: f64,
        config: &PricingConfig,
    ) -> Option<(Pricing, Vec<String>)> {
        let rates = &config.electrical;
        let count = governing.quantity;
        let (mut takeoff, mut notes) = match job_type {
            JobType::DeviceWork => device_takeoff(signals, rates),
            JobType::DedicatedCircuits => (
                Takeoff {
                    mobilization: rates.circuit_tiers.fee(count),
                    permit: rates.circuit_permit,
                    ..unit_takeoff(count, &rates.circuit)
                },
                vec![format!("{count} dedicated circuit(s) with permit allowance")],
            ),
            JobType::EvCharger => (
                Takeoff {
                    mobilization: rates.circuit_tiers.fee(count),
                    permit: rates.ev_permit,
                    ..unit_takeoff(count, &rates.ev_charger)
                },
                vec![format!("{count} EV charger circuit(s) with permit allowance")],
            ),
            JobType::PanelReplacement => (
                Takeoff {
                    mobilization: rates.panel_tiers.fee(count),
                    permit: rates.panel_permit,
                    ..unit_takeoff(count, &rates.panel)
                },
                vec![format!("{count} panel replacement(s) with permit allowance")],
            ),
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

    fn wrap(signals: ElectricalSignals) -> Signals {
        Signals::Electrical(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::super::compute_deterministic;
    use super::*;
    use crate::workflows::estimate::DeterministicResult;

    fn run(text: &str) -> DeterministicResult {
        compute_deterministic(
            Trade::Electrical,
            &ScopeInput::new(text),
            &PricingConfig::default(),
        )
    }

    fn devices(text: &str) -> DeviceBreakdown {
        DeviceBreakdown::parse(&crate::workflows::estimate::matcher::normalize(text))
    }

    #[test]
    fn device_breakdown_separates_recessed_from_fixtures() {
        let tally = devices("Install 4 new recessed can lights and 2 pendant lights, 3 light switches");
        assert_eq!(tally.recessed_lights, 4);
        assert_eq!(tally.light_fixtures, 2);
        assert_eq!(tally.switches, 3);
        assert_eq!(tally.total(), 9);
    }

    #[test]
    fn labeled_device_counts_are_read() {
        let tally = devices("outlets: 5, switches: 2");
        assert_eq!(tally.outlets, 5);
        assert_eq!(tally.switches, 2);
    }

    #[test]
    fn device_work_is_verified_with_counts() {
        let result = run("Replace 6 outlets and 4 switches in the kitchen");
        assert_eq!(result.job_type, JobType::DeviceWork);
        assert!(result.ok_for_verified);
        assert!(result
            .notes
            .iter()
            .any(|note| note.contains("swap rate")));
    }

    #[test]
    fn add_wording_costs_more_than_swap_wording() {
        let add = run("Add 6 outlets").pricing.expect("priced");
        let swap = run("Replace 6 outlets").pricing.expect("priced");
        assert!(add.labor > swap.labor);
    }

    #[test]
    fn panel_dominates_circuit_language() {
        let result = run("Replace main panel and add 2 dedicated circuits");
        assert_eq!(result.job_type, JobType::PanelReplacement);
        assert!(result.ok_for_deterministic);
        assert!(!result.ok_for_verified);
    }

    #[test]
    fn amperage_is_not_a_panel_count() {
        let result = run("Replace 200 amp panel");
        assert_eq!(result.job_type, JobType::PanelReplacement);
        match &result.signals {
            Signals::Electrical(signals) => assert_eq!(signals.panels, None),
            other => panic!("expected electrical signals, got {other:?}"),
        }
    }

    #[test]
    fn ratings_never_become_circuit_or_charger_counts() {
        let microwave = run("Add a dedicated 20 amp circuit for the microwave");
        assert_eq!(microwave.job_type, JobType::Unknown);
        assert!(microwave.pricing.is_none());
        assert!(!microwave.ok_for_verified);

        let dryer = run("Run a 240 volt circuit for the dryer");
        assert_eq!(dryer.job_type, JobType::Unknown);
        assert!(dryer.pricing.is_none());

        let tesla = run("Install a 48 amp Tesla wall connector");
        assert_eq!(tesla.job_type, JobType::EvCharger);
        assert!(tesla.ok_for_deterministic);
        assert!(!tesla.ok_for_verified);
        match &tesla.signals {
            Signals::Electrical(signals) => assert_eq!(signals.ev_chargers, None),
            other => panic!("expected electrical signals, got {other:?}"),
        }
        let single = run("Install EV charger").pricing.expect("priced");
        assert_eq!(tesla.pricing.expect("priced").total, single.total);
    }

    #[test]
    fn ev_charger_defaults_to_one_unverified() {
        let implied = run("Install EV charger in garage");
        assert_eq!(implied.job_type, JobType::EvCharger);
        assert!(implied.ok_for_deterministic);
        assert!(!implied.ok_for_verified);

        let stated = run("Install 2 ev chargers in garage");
        assert!(stated.ok_for_verified);
        let implied = implied.pricing.expect("priced");
        let stated = stated.pricing.expect("priced");
        assert!(stated.total > implied.total);
    }

    #[test]
    fn ev_circuit_outprices_generic_circuit() {
        let ev = run("Install EV charger").pricing.expect("priced");
        let circuit = run("Run 1 dedicated circuit").pricing.expect("priced");
        assert!(ev.total > circuit.total);
    }

    #[test]
    fn circuit_counts_classify_as_dedicated_circuits() {
        let result = run("Run 2 dedicated 20a circuits for the kitchen");
        assert_eq!(result.job_type, JobType::DedicatedCircuits);
        assert!(result.ok_for_verified);
    }

    #[test]
    fn circuit_wording_without_count_is_refused() {
        let result = run("Add dedicated circuit for the microwave");
        assert_eq!(result.job_type, JobType::Unknown);
        assert!(result.notes[0].contains("no circuit count"));
    }

    #[test]
    fn circuit_mention_does_not_steal_device_work() {
        let result = run("Replace 4 outlets on the kitchen circuit");
        assert_eq!(result.job_type, JobType::DeviceWork);
    }

    #[test]
    fn troubleshooting_adds_hours() {
        let plain = run("Replace 2 outlets").pricing.expect("priced");
        let diag = run("Troubleshoot and replace 2 dead outlets")
            .pricing
            .expect("priced");
        assert!(diag.labor > plain.labor);
    }

    #[test]
    fn rewire_without_counts_is_refused() {
        let result = run("Rewire the whole house");
        assert_eq!(result.job_type, JobType::Unknown);
        assert!(result.pricing.is_none());
    }
}
