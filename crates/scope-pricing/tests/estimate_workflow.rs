use std::sync::Arc;

use scope_pricing::workflows::estimate::{
    compute_deterministic, state_multiplier, EstimateRequest, EstimateService, GenerativeError,
    GenerativeEstimate, GenerativeEstimator, JobType, Measurements, PaintScope, PricingConfig,
    PricingSource, ScopeInput, Trade,
};

struct FixedEstimator(GenerativeEstimate);

impl GenerativeEstimator for FixedEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError> {
        Ok(self.0)
    }
}

struct OfflineEstimator;

impl GenerativeEstimator for OfflineEstimator {
    fn estimate(&self, _request: &EstimateRequest) -> Result<GenerativeEstimate, GenerativeError> {
        Err(GenerativeError::Unavailable("offline".to_string()))
    }
}

#[test]
fn painting_rooms_follow_the_paint_scope_selector() {
    let config = PricingConfig::default();
    let text = "Repaint 3 bedrooms and the hallway ceilings, 2 coats";

    let walls = compute_deterministic(Trade::Painting, &ScopeInput::new(text), &config);
    let full = compute_deterministic(
        Trade::Painting,
        &ScopeInput::new(text).with_paint_scope(PaintScope::Full),
        &config,
    );

    assert_eq!(walls.job_type, JobType::Rooms);
    let walls = walls.pricing.expect("walls priced");
    let full = full.pricing.expect("full priced");
    assert!(full.labor > walls.labor);
    assert!(full.materials > walls.materials);
}

#[test]
fn measurements_price_drywall_without_verifying_it() {
    let measurements = Measurements {
        total_sqft: None,
        rows: vec![
            scope_pricing::workflows::estimate::MeasurementRow {
                label: Some("garage walls".to_string()),
                length_ft: Some(40.0),
                width_ft: Some(9.0),
                sqft: None,
            },
            scope_pricing::workflows::estimate::MeasurementRow {
                label: Some("garage ceiling".to_string()),
                length_ft: None,
                width_ft: None,
                sqft: Some(440.0),
            },
        ],
    };

    let result = compute_deterministic(
        Trade::Drywall,
        &ScopeInput::new("hang and finish drywall in the garage")
            .with_state_multiplier(state_multiplier("CO"))
            .with_measurements(measurements),
        &PricingConfig::default(),
    );

    assert_eq!(result.job_type, JobType::InstallFinish);
    assert!(result.ok_for_deterministic);
    assert!(!result.ok_for_verified);
}

#[test]
fn service_reconciles_and_reports_its_sources() {
    let lowball = GenerativeEstimate {
        labor: 200.0,
        materials: 50.0,
        subs: 0.0,
        markup: Some(12.0),
        total: Some(280.0),
    };
    let service = EstimateService::new(Arc::new(FixedEstimator(lowball)), PricingConfig::default());

    let outcome = service
        .estimate(EstimateRequest::new(
            Trade::Electrical,
            "MA",
            "Replace main panel",
        ))
        .expect("priced");

    assert_eq!(outcome.source, PricingSource::Reconciled);
    assert_eq!(outcome.pricing.markup, 15.0);
    let floor = outcome.deterministic.pricing.expect("panel floor");
    assert_eq!(outcome.pricing.labor, floor.labor);
    assert_eq!(outcome.pricing.materials, floor.materials);
    assert_eq!(outcome.pricing.subs, floor.subs);
    assert_eq!(outcome.pricing.total, outcome.pricing.implied_total());
    assert!(!outcome.adjustments.is_empty());
}

#[test]
fn offline_estimator_still_prices_countable_work() {
    let service = EstimateService::new(Arc::new(OfflineEstimator), PricingConfig::default());
    let outcome = service
        .estimate(EstimateRequest::new(
            Trade::Drywall,
            "OR",
            "Patch 6 holes and match knockdown texture",
        ))
        .expect("deterministic only");

    assert_eq!(outcome.source, PricingSource::Deterministic);
    assert_eq!(outcome.deterministic.job_type, JobType::PatchRepair);
}

#[test]
fn outcome_serializes_for_api_consumers() {
    let service = EstimateService::new(Arc::new(OfflineEstimator), PricingConfig::default());
    let outcome = service
        .estimate(EstimateRequest::new(Trade::Plumbing, "FL", "Replace 2 faucets"))
        .expect("priced");

    let json = serde_json::to_value(&outcome).expect("serializes");
    assert_eq!(json["trade"], "plumbing");
    assert_eq!(json["source"], "deterministic");
    assert_eq!(json["deterministic"]["signals"]["intent"], "swap");
    assert!(json["generated_at"].is_string());
}
