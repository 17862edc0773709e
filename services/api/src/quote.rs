use crate::infra::OfflineEstimator;
use clap::Args;
use scope_pricing::config::AppConfig;
use scope_pricing::error::AppError;
use scope_pricing::workflows::estimate::{
    parse_batch, EstimateError, EstimateOutcome, EstimateRequest, EstimateService,
    GenerativeEstimate, Measurements, PaintScope, Pricing, Trade,
};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Trade to price (painting, drywall, electrical, plumbing)
    #[arg(long)]
    pub(crate) trade: Trade,
    /// Two-letter state code used for the labor multiplier
    #[arg(long, default_value = "")]
    pub(crate) state: String,
    /// Free-text scope of work
    #[arg(long)]
    pub(crate) scope: String,
    /// Measured square footage from a takeoff
    #[arg(long)]
    pub(crate) sqft: Option<f64>,
    /// Surfaces included when painting by room (walls, walls_ceilings, full)
    #[arg(long)]
    pub(crate) paint_scope: Option<PaintScope>,
    /// Generative estimate as JSON, e.g. '{"labor":900,"materials":200,"subs":0}'
    #[arg(long, value_parser = parse_generative)]
    pub(crate) generative: Option<GenerativeEstimate>,
    /// Emit the full outcome as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV file with `trade,state,scope[,sqft]` columns
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Emit one JSON document per row instead of a table line
    #[arg(long)]
    pub(crate) json: bool,
}

fn parse_generative(raw: &str) -> Result<GenerativeEstimate, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid generative estimate JSON ({err})"))
}

fn offline_service() -> Result<EstimateService<OfflineEstimator>, AppError> {
    let config = AppConfig::load()?;
    Ok(EstimateService::new(Arc::new(OfflineEstimator), config.pricing))
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let service = offline_service()?;
    let json = args.json;
    let request = quote_request(args);

    match service.estimate(request) {
        Ok(outcome) if json => println!("{}", to_json(&outcome)?),
        Ok(outcome) => print!("{}", render_outcome(&outcome)),
        Err(EstimateError::NoPricingAvailable { trade, notes }) => {
            println!("{}", render_unpriced(trade, &notes));
        }
        Err(other) => return Err(other.into()),
    }
    Ok(())
}

fn quote_request(args: QuoteArgs) -> EstimateRequest {
    let mut request = EstimateRequest::new(args.trade, args.state, args.scope);
    request.measurements = args.sqft.map(Measurements::from_total);
    request.paint_scope = args.paint_scope;
    request.generative = args.generative;
    request
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let service = offline_service()?;
    let file = File::open(&args.csv)?;
    let requests = parse_batch(BufReader::new(file))?;

    let mut priced = 0usize;
    for (index, request) in requests.into_iter().enumerate() {
        let row = index + 1;
        match service.estimate(request) {
            Ok(outcome) => {
                priced += 1;
                if args.json {
                    println!("{}", to_json(&outcome)?);
                } else {
                    println!("row {row}: {}", summary_line(&outcome));
                }
            }
            Err(EstimateError::NoPricingAvailable { trade, notes }) => {
                println!("row {row}: {}", render_unpriced(trade, &notes));
            }
            Err(other) => return Err(other.into()),
        }
    }

    if !args.json {
        println!("{priced} row(s) priced");
    }
    Ok(())
}

fn to_json(outcome: &EstimateOutcome) -> Result<String, AppError> {
    serde_json::to_string_pretty(outcome).map_err(|err| AppError::Io(err.into()))
}

fn format_pricing(pricing: &Pricing) -> String {
    format!(
        "labor ${:.0} | materials ${:.0} | subs ${:.0} | markup {:.0}% | total ${:.0}",
        pricing.labor, pricing.materials, pricing.subs, pricing.markup, pricing.total
    )
}

fn summary_line(outcome: &EstimateOutcome) -> String {
    format!(
        "{} {} ({:?}) {}",
        outcome.trade,
        outcome.deterministic.job_type,
        outcome.source,
        format_pricing(&outcome.pricing)
    )
}

pub(crate) fn render_outcome(outcome: &EstimateOutcome) -> String {
    let mut out = String::new();
    let state = if outcome.state.is_empty() {
        "baseline"
    } else {
        outcome.state.as_str()
    };
    out.push_str(&format!(
        "{} estimate ({state}, labor x{:.2})\n",
        outcome.trade, outcome.state_multiplier
    ));
    out.push_str(&format!("- {}\n", format_pricing(&outcome.pricing)));
    out.push_str(&format!(
        "- source: {:?} | job type: {} | verified: {}\n",
        outcome.source,
        outcome.deterministic.job_type,
        if outcome.deterministic.ok_for_verified {
            "yes"
        } else {
            "no"
        }
    ));
    if let Some(floor) = &outcome.deterministic.pricing {
        out.push_str(&format!("- deterministic floor: {}\n", format_pricing(floor)));
    }
    for adjustment in &outcome.adjustments {
        out.push_str(&format!("  * {adjustment}\n"));
    }
    for note in &outcome.deterministic.notes {
        out.push_str(&format!("  - {note}\n"));
    }
    out
}

fn render_unpriced(trade: Trade, notes: &[String]) -> String {
    if notes.is_empty() {
        format!("no pricing available for {trade}")
    } else {
        format!("no pricing available for {trade}: {}", notes.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scope_pricing::workflows::estimate::PricingConfig;

    fn service() -> EstimateService<OfflineEstimator> {
        EstimateService::new(Arc::new(OfflineEstimator), PricingConfig::default())
    }

    fn args(trade: Trade, scope: &str) -> QuoteArgs {
        QuoteArgs {
            trade,
            state: String::new(),
            scope: scope.to_string(),
            sqft: None,
            paint_scope: None,
            generative: None,
            json: false,
        }
    }

    #[test]
    fn quote_request_carries_optional_inputs() {
        let mut quote = args(Trade::Painting, "repaint the living room walls");
        quote.sqft = Some(450.0);
        quote.paint_scope = Some(PaintScope::Full);
        let request = quote_request(quote);
        assert_eq!(request.measurements, Some(Measurements::from_total(450.0)));
        assert_eq!(request.paint_scope, Some(PaintScope::Full));
        assert!(request.generative.is_none());
    }

    #[test]
    fn rendered_outcome_lists_floor_and_notes() {
        let request = quote_request(args(Trade::Plumbing, "Replace 3 toilets and 2 faucets"));
        let outcome = service().estimate(request).expect("priced");
        let text = render_outcome(&outcome);
        assert!(text.starts_with("plumbing estimate (baseline, labor x1.00)"));
        assert!(text.contains("total $1249"));
        assert!(text.contains("job type: fixture_swaps"));
        assert!(text.contains("verified: yes"));
    }

    #[test]
    fn generative_flag_parses_json() {
        let estimate =
            parse_generative(r#"{"labor":900,"materials":200,"subs":0,"markup":25}"#)
                .expect("parses");
        assert_eq!(estimate.labor, 900.0);
        assert_eq!(estimate.markup, Some(25.0));
        assert!(parse_generative("labor=900").is_err());
    }

    #[test]
    fn unpriced_scope_explains_why() {
        let line = render_unpriced(Trade::Drywall, &["no patch count".to_string()]);
        assert_eq!(line, "no pricing available for drywall: no patch count");
        assert_eq!(
            render_unpriced(Trade::Drywall, &[]),
            "no pricing available for drywall"
        );
    }
}
