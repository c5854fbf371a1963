//! CSV ingestion for batch jobs: text to loosely typed rows, rows to model
//! inputs via header aliases, and per-row prediction with captured errors.

use crate::{
    errors::ServiceError,
    ml::{
        CarbonFootprintInput, CarbonFootprintModel, EsgInput, EsgModel, PackagingInput,
        PackagingModel, ProductInput, ProductRecommendationModel, SustainabilityModel,
    },
    models::{BatchRowResult, ModelType},
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// A single CSV cell: numeric when the text parses as a finite number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(_) => None,
        }
    }

    fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Number(n) => Some(n.to_string()),
            CellValue::Text(s) if !s.is_empty() => Some(s.clone()),
            CellValue::Text(_) => None,
        }
    }
}

pub type CsvRow = BTreeMap<String, CellValue>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CsvError {
    #[error("CSV must have at least a header and one data row")]
    TooFewLines,
}

impl From<CsvError> for ServiceError {
    fn from(err: CsvError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

fn split_fields(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().replace('"', ""))
        .collect()
}

/// Parses CSV text into rows keyed by header.
///
/// Quoting is not interpreted: quotes are stripped and every comma separates
/// fields. Rows whose field count differs from the header are dropped.
pub fn parse_csv(content: &str) -> Result<Vec<CsvRow>, CsvError> {
    let lines: Vec<&str> = content
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    if lines.len() < 2 {
        return Err(CsvError::TooFewLines);
    }

    let headers = split_fields(lines[0]);
    let rows = lines[1..]
        .iter()
        .map(|line| split_fields(line))
        .filter(|values| values.len() == headers.len())
        .map(|values| {
            headers
                .iter()
                .cloned()
                .zip(values.iter().map(|v| CellValue::parse(v)))
                .collect()
        })
        .collect();

    Ok(rows)
}

fn number(row: &CsvRow, aliases: &[&str], default: f64) -> f64 {
    aliases
        .iter()
        .find_map(|key| row.get(*key).and_then(CellValue::as_number))
        .unwrap_or(default)
}

fn text(row: &CsvRow, aliases: &[&str], default: &str) -> String {
    aliases
        .iter()
        .find_map(|key| row.get(*key).and_then(CellValue::as_text))
        .unwrap_or_else(|| default.to_string())
}

/// Builds a model input from a CSV row. The first alias holding a usable
/// value wins; otherwise the field default applies.
pub trait FromCsvRow: Sized {
    fn from_csv_row(row: &CsvRow) -> Self;
}

impl FromCsvRow for PackagingInput {
    fn from_csv_row(row: &CsvRow) -> Self {
        Self {
            material_type: text(row, &["Material_Type", "material_type"], "Glass"),
            product_weight: number(row, &["Product_Weight_g", "weight"], 150.0),
            fragility: text(row, &["Fragility", "fragility"], "Medium"),
            recyclable: text(row, &["Recyclable", "recyclable"], "Yes"),
            transport_mode: text(row, &["Transport_Mode", "transport_mode"], "Land"),
            lca_emission: number(row, &["LCA_Emission_kgCO2", "emissions"], 1.5),
        }
    }
}

impl FromCsvRow for CarbonFootprintInput {
    fn from_csv_row(row: &CsvRow) -> Self {
        Self {
            total_purchases: number(row, &["Total_Purchases", "purchases"], 10.0),
            avg_distance: number(row, &["Avg_Distance_km", "distance"], 300.0),
            preferred_packaging: text(row, &["Preferred_Packaging", "packaging"], "Cardboard"),
            returns_percent: number(row, &["Returns_%", "returns"], 2.0),
            electricity: number(row, &["Electricity_kWh", "electricity"], 250.0),
            travel: number(row, &["Travel_km", "travel"], 800.0),
            service_usage: number(row, &["Service_Usage_hr", "service"], 20.0),
        }
    }
}

impl FromCsvRow for ProductInput {
    fn from_csv_row(row: &CsvRow) -> Self {
        Self {
            category: text(row, &["category", "Category"], "Unknown"),
            material: text(row, &["material", "Material"], "Unknown"),
            brand: text(row, &["brand", "Brand"], "Unknown"),
            price: number(row, &["price", "Price"], 50.0),
            rating: number(row, &["rating", "Rating"], 3.5),
            reviews_count: number(row, &["reviewsCount", "Reviews"], 50.0),
            carbon_footprint: number(row, &["Carbon_Footprint_MT", "carbon"], 30.0),
            water_usage: number(row, &["Water_Usage_Liters", "water"], 800.0),
            waste_production: number(row, &["Waste_Production_KG", "waste"], 8.0),
            avg_price: number(row, &["Average_Price_USD", "avg_price"], 60.0),
        }
    }
}

impl FromCsvRow for EsgInput {
    fn from_csv_row(row: &CsvRow) -> Self {
        Self {
            product_name: text(row, &["Product Name", "product_name"], "Unknown Product"),
            sentence: text(row, &["Sentence", "sentence"], "No description"),
            sentiment: text(row, &["Sentiment", "sentiment"], "Neutral"),
            environmental_score: number(
                row,
                &["Environmental Score", "environmental_score"],
                50.0,
            ),
        }
    }
}

fn try_row<M, R>(row: &CsvRow, rng: &mut R) -> Result<BatchRowResult, String>
where
    M: SustainabilityModel,
    M::Input: FromCsvRow,
    R: Rng + ?Sized,
{
    let input = M::Input::from_csv_row(row);
    input.validate().map_err(|e| e.to_string())?;
    let prediction = M::predict(&input, rng).map_err(|e| e.to_string())?;
    Ok(BatchRowResult::Success {
        input: serde_json::to_value(&input).map_err(|e| e.to_string())?,
        prediction: serde_json::to_value(&prediction).map_err(|e| e.to_string())?,
    })
}

/// Runs one row through model `M`. Failures become an `error` result
/// carrying the raw row.
pub fn process_row<M, R>(row: &CsvRow, rng: &mut R) -> BatchRowResult
where
    M: SustainabilityModel,
    M::Input: FromCsvRow,
    R: Rng + ?Sized,
{
    try_row::<M, R>(row, rng).unwrap_or_else(|error| BatchRowResult::Error {
        input: serde_json::to_value(row).unwrap_or_default(),
        error,
    })
}

/// Runs every row through model `M` in order.
pub fn process_rows<M, R>(rows: &[CsvRow], rng: &mut R) -> Vec<BatchRowResult>
where
    M: SustainabilityModel,
    M::Input: FromCsvRow,
    R: Rng + ?Sized,
{
    rows.iter().map(|row| process_row::<M, R>(row, rng)).collect()
}

/// [`process_row`] for a model chosen at runtime.
pub fn process_row_for<R: Rng + ?Sized>(
    model_type: ModelType,
    row: &CsvRow,
    rng: &mut R,
) -> BatchRowResult {
    match model_type {
        ModelType::Packaging => process_row::<PackagingModel, R>(row, rng),
        ModelType::Carbon => process_row::<CarbonFootprintModel, R>(row, rng),
        ModelType::Product => process_row::<ProductRecommendationModel, R>(row, rng),
        ModelType::Esg => process_row::<EsgModel, R>(row, rng),
    }
}

/// [`process_rows`] for a model chosen at runtime.
pub fn process_rows_for<R: Rng + ?Sized>(
    model_type: ModelType,
    rows: &[CsvRow],
    rng: &mut R,
) -> Vec<BatchRowResult> {
    rows.iter()
        .map(|row| process_row_for(model_type, row, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use serde_json::json;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn header_and_matching_row_yield_one_row() {
        let rows = parse_csv("a,b\n1,x").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], CellValue::Number(1.0));
        assert_eq!(rows[0]["b"], CellValue::Text("x".into()));
    }

    #[test]
    fn mismatched_rows_are_dropped() {
        assert!(parse_csv("a,b\n1,2,3").unwrap().is_empty());
    }

    #[test]
    fn fewer_than_two_lines_is_an_error() {
        assert_eq!(parse_csv("a,b"), Err(CsvError::TooFewLines));
        assert_eq!(parse_csv("  \n "), Err(CsvError::TooFewLines));
    }

    #[test]
    fn crlf_quotes_and_whitespace_are_stripped() {
        let rows = parse_csv("\"Product Name\", Sentiment \r\n\"Soap\" , Positive\r\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Product Name"], CellValue::Text("Soap".into()));
        assert_eq!(rows[0]["Sentiment"], CellValue::Text("Positive".into()));
    }

    #[test]
    fn non_finite_numbers_stay_text() {
        let rows = parse_csv("a,b\nNaN,inf").unwrap();
        assert_eq!(rows[0]["a"], CellValue::Text("NaN".into()));
        assert_eq!(rows[0]["b"], CellValue::Text("inf".into()));
    }

    #[test]
    fn aliases_fall_through_to_defaults() {
        let rows = parse_csv("weight,Fragility,emissions\n,High,abc").unwrap();
        let input = PackagingInput::from_csv_row(&rows[0]);
        assert_eq!(input.product_weight, 150.0);
        assert_eq!(input.fragility, "High");
        assert_eq!(input.lca_emission, 1.5);
        assert_eq!(input.material_type, "Glass");
    }

    #[test]
    fn zero_is_a_usable_value() {
        let rows = parse_csv("Returns_%,returns\n0,7").unwrap();
        let input = CarbonFootprintInput::from_csv_row(&rows[0]);
        assert_eq!(input.returns_percent, 0.0);
    }

    #[test]
    fn primary_alias_wins_over_secondary() {
        let rows = parse_csv("category,Category,Reviews\nShoes,Bags,250").unwrap();
        let input = ProductInput::from_csv_row(&rows[0]);
        assert_eq!(input.category, "Shoes");
        assert_eq!(input.reviews_count, 250.0);
    }

    #[test]
    fn success_rows_carry_mapped_input() {
        let rows = parse_csv("Environmental Score,Sentiment\n80,Positive").unwrap();
        let results = process_rows::<EsgModel, _>(&rows, &mut rng());
        match &results[0] {
            BatchRowResult::Success { input, prediction } => {
                assert_eq!(input["environmentalScore"], json!(80.0));
                assert_eq!(input["productName"], "Unknown Product");
                assert!(prediction["esgScore"].as_u64().unwrap() <= 100);
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[test]
    fn invalid_rows_become_errors_with_raw_input() {
        let rows = parse_csv("Environmental Score,Sentiment\n250,Positive\n40,Negative").unwrap();
        let results = process_rows_for(ModelType::Esg, &rows, &mut rng());
        assert_eq!(results.len(), 2);
        match &results[0] {
            BatchRowResult::Error { input, error } => {
                assert_eq!(input["Environmental Score"], json!(250.0));
                assert!(error.contains("environmental_score"));
            }
            other => panic!("expected error, got {:?}", other),
        }
        assert!(results[1].is_success());
    }

    #[test]
    fn carbon_rows_with_no_activity_fail_alone() {
        let rows = parse_csv(
            "Total_Purchases,Avg_Distance_km,Electricity_kWh,Travel_km,Service_Usage_hr\n0,0,0,0,0\n5,100,10,10,1",
        )
        .unwrap();
        let results = process_rows::<CarbonFootprintModel, _>(&rows, &mut rng());
        assert!(!results[0].is_success());
        assert!(results[1].is_success());
    }
}
