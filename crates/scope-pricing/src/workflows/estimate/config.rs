use serde::{Deserialize, Serialize};

use super::reconcile::ReconciliationPolicy;

/// Injectable pricing constants. Every table deserializes with defaults so
/// partial overrides are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub default_markup: f64,
    pub supervision_pct: f64,
    pub painting: PaintingRates,
    pub drywall: DrywallRates,
    pub electrical: ElectricalRates,
    pub plumbing: PlumbingRates,
    pub reconciliation: ReconciliationPolicy,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            default_markup: 20.0,
            supervision_pct: 0.05,
            painting: PaintingRates::default(),
            drywall: DrywallRates::default(),
            electrical: ElectricalRates::default(),
            plumbing: PlumbingRates::default(),
            reconciliation: ReconciliationPolicy::default(),
        }
    }
}

/// Step function for crew dispatch overhead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MobilizationTiers {
    pub small_max: f64,
    pub medium_max: f64,
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

impl MobilizationTiers {
    pub const fn new(small_max: f64, medium_max: f64, small: f64, medium: f64, large: f64) -> Self {
        Self {
            small_max,
            medium_max,
            small,
            medium,
            large,
        }
    }

    pub fn fee(&self, quantity: f64) -> f64 {
        if quantity <= self.small_max {
            self.small
        } else if quantity <= self.medium_max {
            self.medium
        } else {
            self.large
        }
    }
}

/// Hour multipliers for new installs versus like-for-like swaps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntentMultipliers {
    pub add: f64,
    pub swap: f64,
}

impl Default for IntentMultipliers {
    fn default() -> Self {
        Self {
            add: 1.35,
            swap: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaintingRates {
    pub labor_rate: f64,
    pub room_perimeter_ft: f64,
    pub wall_height_ft: f64,
    pub ceiling_sqft_per_room: f64,
    pub default_coats: u32,
    pub sqft_per_labor_hour: f64,
    pub setup_hours: f64,
    pub prep_hours_per_room: f64,
    pub trim_hours_per_room: f64,
    pub coverage_sqft_per_gallon: f64,
    pub waste_factor: f64,
    pub paint_cost_per_gallon: f64,
    pub sundries_per_room: f64,
    pub trim_materials_per_room: f64,
    pub sundries_per_sqft: f64,
    pub hours_per_door: f64,
    pub door_setup_hours: f64,
    pub door_trim_hours: f64,
    pub door_trim_mention_hours: f64,
    pub materials_per_door: f64,
    pub door_trim_materials: f64,
    pub room_tiers: MobilizationTiers,
    pub door_tiers: MobilizationTiers,
    pub area_tiers: MobilizationTiers,
}

impl Default for PaintingRates {
    fn default() -> Self {
        Self {
            labor_rate: 62.0,
            room_perimeter_ft: 48.0,
            wall_height_ft: 8.0,
            ceiling_sqft_per_room: 144.0,
            default_coats: 2,
            sqft_per_labor_hour: 160.0,
            setup_hours: 2.0,
            prep_hours_per_room: 1.0,
            trim_hours_per_room: 1.5,
            coverage_sqft_per_gallon: 350.0,
            waste_factor: 0.10,
            paint_cost_per_gallon: 45.0,
            sundries_per_room: 20.0,
            trim_materials_per_room: 12.0,
            sundries_per_sqft: 0.05,
            hours_per_door: 1.25,
            door_setup_hours: 1.5,
            door_trim_hours: 0.35,
            door_trim_mention_hours: 0.25,
            materials_per_door: 14.0,
            door_trim_materials: 4.0,
            room_tiers: MobilizationTiers::new(2.0, 5.0, 150.0, 250.0, 400.0),
            door_tiers: MobilizationTiers::new(5.0, 15.0, 150.0, 250.0, 400.0),
            area_tiers: MobilizationTiers::new(500.0, 1500.0, 150.0, 250.0, 400.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrywallRates {
    pub labor_rate: f64,
    pub hang_hours_per_sqft: f64,
    pub finish_hours_per_sqft: f64,
    pub level4_extra_hours_per_sqft: f64,
    pub level5_extra_hours_per_sqft: f64,
    pub ceiling_extra_hours_per_sqft: f64,
    pub texture_extra_hours_per_sqft: f64,
    pub setup_hours: f64,
    pub materials_per_sqft: f64,
    pub texture_materials_per_sqft: f64,
    pub material_allowance: f64,
    pub default_sheet_sqft: f64,
    pub hours_per_patch: f64,
    pub patch_ceiling_extra_hours: f64,
    pub patch_texture_extra_hours: f64,
    pub patch_level4_extra_hours: f64,
    pub patch_level5_extra_hours: f64,
    pub patch_setup_hours: f64,
    pub materials_per_patch: f64,
    pub patch_material_allowance: f64,
    pub area_tiers: MobilizationTiers,
    pub patch_tiers: MobilizationTiers,
}

impl Default for DrywallRates {
    fn default() -> Self {
        Self {
            labor_rate: 68.0,
            hang_hours_per_sqft: 0.016,
            finish_hours_per_sqft: 0.022,
            level4_extra_hours_per_sqft: 0.006,
            level5_extra_hours_per_sqft: 0.012,
            ceiling_extra_hours_per_sqft: 0.006,
            texture_extra_hours_per_sqft: 0.005,
            setup_hours: 2.0,
            materials_per_sqft: 0.55,
            texture_materials_per_sqft: 0.06,
            material_allowance: 60.0,
            default_sheet_sqft: 32.0,
            hours_per_patch: 1.25,
            patch_ceiling_extra_hours: 0.5,
            patch_texture_extra_hours: 0.5,
            patch_level4_extra_hours: 0.25,
            patch_level5_extra_hours: 0.5,
            patch_setup_hours: 2.0,
            materials_per_patch: 10.0,
            patch_material_allowance: 35.0,
            area_tiers: MobilizationTiers::new(400.0, 1500.0, 175.0, 300.0, 450.0),
            patch_tiers: MobilizationTiers::new(3.0, 10.0, 125.0, 200.0, 300.0),
        }
    }
}

/// Hours and material allowance for one kind of installed unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitRate {
    pub hours: f64,
    pub materials: f64,
}

impl UnitRate {
    pub const fn new(hours: f64, materials: f64) -> Self {
        Self { hours, materials }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalRates {
    pub labor_rate: f64,
    pub outlet: UnitRate,
    pub switch: UnitRate,
    pub recessed_light: UnitRate,
    pub light_fixture: UnitRate,
    pub ceiling_fan: UnitRate,
    pub intent: IntentMultipliers,
    pub device_setup_hours: f64,
    pub troubleshooting_hours: f64,
    pub circuit: UnitRate,
    pub circuit_permit: f64,
    pub ev_charger: UnitRate,
    pub ev_permit: f64,
    pub panel: UnitRate,
    pub panel_permit: f64,
    pub device_tiers: MobilizationTiers,
    pub circuit_tiers: MobilizationTiers,
    pub panel_tiers: MobilizationTiers,
}

impl Default for ElectricalRates {
    fn default() -> Self {
        Self {
            labor_rate: 95.0,
            outlet: UnitRate::new(0.6, 14.0),
            switch: UnitRate::new(0.45, 10.0),
            recessed_light: UnitRate::new(1.1, 38.0),
            light_fixture: UnitRate::new(0.9, 20.0),
            ceiling_fan: UnitRate::new(1.4, 30.0),
            intent: IntentMultipliers::default(),
            device_setup_hours: 1.0,
            troubleshooting_hours: 2.0,
            circuit: UnitRate::new(3.5, 160.0),
            circuit_permit: 150.0,
            ev_charger: UnitRate::new(6.0, 420.0),
            ev_permit: 225.0,
            panel: UnitRate::new(10.0, 1350.0),
            panel_permit: 350.0,
            device_tiers: MobilizationTiers::new(5.0, 15.0, 125.0, 200.0, 325.0),
            circuit_tiers: MobilizationTiers::new(1.0, 4.0, 150.0, 250.0, 400.0),
            panel_tiers: MobilizationTiers::new(1.0, 2.0, 300.0, 450.0, 600.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumbingRates {
    pub labor_rate: f64,
    pub toilet: UnitRate,
    pub faucet: UnitRate,
    pub sink: UnitRate,
    pub vanity: UnitRate,
    pub disposal: UnitRate,
    pub shower_valve: UnitRate,
    pub water_heater: UnitRate,
    pub hose_bib: UnitRate,
    pub intent: IntentMultipliers,
    pub setup_hours: f64,
    pub troubleshooting_hours: f64,
    pub water_heater_permit: f64,
    pub rough_in_per_bath: UnitRate,
    pub rough_in_permit: f64,
    pub fixture_tiers: MobilizationTiers,
    pub bath_tiers: MobilizationTiers,
}

impl Default for PlumbingRates {
    fn default() -> Self {
        Self {
            labor_rate: 105.0,
            toilet: UnitRate::new(1.5, 30.0),
            faucet: UnitRate::new(1.0, 18.0),
            sink: UnitRate::new(1.5, 25.0),
            vanity: UnitRate::new(2.5, 40.0),
            disposal: UnitRate::new(1.25, 22.0),
            shower_valve: UnitRate::new(2.0, 55.0),
            water_heater: UnitRate::new(4.0, 110.0),
            hose_bib: UnitRate::new(1.0, 20.0),
            intent: IntentMultipliers::default(),
            setup_hours: 1.0,
            troubleshooting_hours: 1.5,
            water_heater_permit: 125.0,
            rough_in_per_bath: UnitRate::new(22.0, 620.0),
            rough_in_permit: 275.0,
            fixture_tiers: MobilizationTiers::new(3.0, 8.0, 150.0, 225.0, 350.0),
            bath_tiers: MobilizationTiers::new(1.0, 2.0, 250.0, 400.0, 550.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobilization_is_a_step_function() {
        let tiers = MobilizationTiers::new(5.0, 15.0, 150.0, 250.0, 400.0);
        assert_eq!(tiers.fee(1.0), 150.0);
        assert_eq!(tiers.fee(5.0), 150.0);
        assert_eq!(tiers.fee(6.0), 250.0);
        assert_eq!(tiers.fee(15.0), 250.0);
        assert_eq!(tiers.fee(16.0), 400.0);
    }

    #[test]
    fn add_work_costs_more_than_swaps() {
        let intent = IntentMultipliers::default();
        assert!(intent.add > 1.0);
        assert!(intent.swap < 1.0);
    }

    #[test]
    fn ev_circuits_carry_higher_allowances_than_generic_circuits() {
        let rates = ElectricalRates::default();
        assert!(rates.ev_charger.hours > rates.circuit.hours);
        assert!(rates.ev_charger.materials > rates.circuit.materials);
    }

    #[test]
    fn partial_json_keeps_remaining_defaults() {
        let config: PricingConfig =
            serde_json::from_str(r#"{ "plumbing": { "labor_rate": 120.0 } }"#).expect("parses");
        assert_eq!(config.plumbing.labor_rate, 120.0);
        assert_eq!(config.plumbing.toilet, PlumbingRates::default().toilet);
        assert_eq!(config.default_markup, 20.0);
    }
}
