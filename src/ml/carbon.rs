use super::{
    encoders::{self, PackagingPreference},
    PredictionError, SustainabilityModel,
};
use crate::models::ModelType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const TRANSPORT_KG_PER_KM: f64 = 0.21;
const ELECTRICITY_KG_PER_KWH: f64 = 0.4;
const TRAVEL_KG_PER_KM: f64 = 0.15;
const SERVICE_KG_PER_HOUR: f64 = 0.8;

pub const CARBON_CONFIDENCE: f64 = 0.85;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprintInput {
    #[validate(range(min = 0.0))]
    #[schema(example = 10.0)]
    pub total_purchases: f64,
    /// Average delivery distance in km
    #[validate(range(min = 0.0))]
    #[schema(example = 300.0)]
    pub avg_distance: f64,
    #[schema(example = "Cardboard")]
    pub preferred_packaging: String,
    #[validate(range(min = 0.0, max = 100.0))]
    #[schema(example = 2.0)]
    pub returns_percent: f64,
    /// kWh
    #[validate(range(min = 0.0))]
    #[schema(example = 250.0)]
    pub electricity: f64,
    /// km
    #[validate(range(min = 0.0))]
    #[schema(example = 800.0)]
    pub travel: f64,
    /// Hours
    #[validate(range(min = 0.0))]
    #[schema(example = 20.0)]
    pub service_usage: f64,
}

/// Share of the total per source, as rounded percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmissionBreakdown {
    pub transportation: i64,
    pub packaging: i64,
    pub electricity: i64,
    pub other: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CarbonFootprintPrediction {
    /// kg CO2, rounded
    pub total_emissions: i64,
    pub breakdown: EmissionBreakdown,
    pub suggestions: Vec<String>,
}

fn reduction_suggestions(breakdown: &EmissionBreakdown) -> Vec<String> {
    let mut suggestions = Vec::new();
    if breakdown.transportation > 30 {
        suggestions.push("• Optimize delivery routes (-20%)".to_string());
    }
    if breakdown.packaging > 20 {
        suggestions.push("• Switch to biodegradable packaging (-15%)".to_string());
    }
    if breakdown.electricity > 25 {
        suggestions.push("• Use renewable energy (-25%)".to_string());
    }
    if suggestions.is_empty() {
        suggestions.push("• Consider consolidating shipments (-10%)".to_string());
    }
    suggestions
}

fn percent(part: f64, total: f64) -> i64 {
    (part / total * 100.0).round() as i64
}

pub fn predict_carbon_footprint(
    input: &CarbonFootprintInput,
) -> Result<CarbonFootprintPrediction, PredictionError> {
    let packaging: PackagingPreference = encoders::encode(&input.preferred_packaging);

    let transportation = input.avg_distance * TRANSPORT_KG_PER_KM * input.total_purchases;
    let packaging = input.total_purchases * packaging.emission_factor();
    let electricity = input.electricity * ELECTRICITY_KG_PER_KWH;
    let travel = input.travel * TRAVEL_KG_PER_KM;
    let returns = input.returns_percent / 100.0 * transportation * 2.0;
    let service = input.service_usage * SERVICE_KG_PER_HOUR;
    let other = travel + returns + service;

    let total = transportation + packaging + electricity + other;
    if !total.is_finite() || total <= 0.0 {
        return Err(PredictionError::NonPositiveTotal(total));
    }

    let breakdown = EmissionBreakdown {
        transportation: percent(transportation, total),
        packaging: percent(packaging, total),
        electricity: percent(electricity, total),
        other: percent(other, total),
    };
    let suggestions = reduction_suggestions(&breakdown);

    Ok(CarbonFootprintPrediction {
        total_emissions: total.round() as i64,
        breakdown,
        suggestions,
    })
}

pub struct CarbonFootprintModel;

impl SustainabilityModel for CarbonFootprintModel {
    const MODEL_TYPE: ModelType = ModelType::Carbon;
    type Input = CarbonFootprintInput;
    type Output = CarbonFootprintPrediction;

    fn predict<R: Rng + ?Sized>(
        input: &CarbonFootprintInput,
        _rng: &mut R,
    ) -> Result<CarbonFootprintPrediction, PredictionError> {
        predict_carbon_footprint(input)
    }

    fn confidence(_output: &CarbonFootprintPrediction) -> Option<f64> {
        Some(CARBON_CONFIDENCE)
    }
}
