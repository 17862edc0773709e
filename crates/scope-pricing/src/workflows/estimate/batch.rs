use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::domain::{Measurements, Trade};
use super::service::EstimateRequest;
use super::EstimateError;

#[derive(Debug, Deserialize)]
struct BatchRow {
    trade: String,
    #[serde(default)]
    state: String,
    scope: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    sqft: Option<f64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .replace(',', "")
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Read `trade,state,scope[,sqft]` rows into estimate requests.
///
/// Row numbers in errors are 1-based data rows (the header is not counted).
pub fn parse_batch<R: Read>(reader: R) -> Result<Vec<EstimateRequest>, EstimateError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut requests = Vec::new();

    for (index, record) in csv_reader.deserialize::<BatchRow>().enumerate() {
        let row_number = index + 1;
        let row = record?;
        let trade = row
            .trade
            .parse::<Trade>()
            .map_err(|source| EstimateError::BatchRow {
                row: row_number,
                source: Box::new(source),
            })?;

        let mut request = EstimateRequest::new(trade, row.state, row.scope);
        request.measurements = row.sqft.map(Measurements::from_total);
        requests.push(request);
    }

    Ok(requests)
}
