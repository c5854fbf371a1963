use super::{
    encoders::{self, Fragility, MaterialType, Recyclable, TransportMode},
    Level, PredictionError, SustainabilityModel,
};
use crate::models::ModelType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

pub const PACKAGING_OPTIONS: [&str; 5] = [
    "Biodegradable Bubble Wrap",
    "Recycled Cardboard",
    "Compostable Packaging",
    "Reusable Container",
    "Minimal Packaging",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackagingInput {
    #[schema(example = "Glass")]
    pub material_type: String,
    /// Grams
    #[validate(range(min = 0.0))]
    #[schema(example = 150.0)]
    pub product_weight: f64,
    #[schema(example = "Medium")]
    pub fragility: String,
    #[schema(example = "Yes")]
    pub recyclable: String,
    #[schema(example = "Land")]
    pub transport_mode: String,
    /// Life-cycle emissions in kg CO2
    #[validate(range(min = 0.0))]
    #[schema(example = 1.5)]
    pub lca_emission: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PackagingPrediction {
    pub packaging_type: String,
    /// Rounded, always within 60..=100
    pub sustainability_score: u32,
    #[schema(value_type = String, example = "High")]
    pub cost_efficiency: Level,
    #[schema(value_type = String, example = "Low")]
    pub carbon_impact: Level,
    pub recommendation: String,
}

fn base_score(input: &PackagingInput) -> f64 {
    let mut score = 0.0;
    if encoders::parse::<Recyclable>(&input.recyclable) == Some(Recyclable::Yes) {
        score += 20.0;
    }
    if encoders::parse::<Fragility>(&input.fragility) == Some(Fragility::High) {
        score += 15.0;
    }
    if input.product_weight < 200.0 {
        score += 10.0;
    }
    if input.lca_emission < 2.0 {
        score += 25.0;
    }
    if encoders::parse::<TransportMode>(&input.transport_mode) == Some(TransportMode::Land) {
        score += 10.0;
    }
    score
}

fn recommendation(packaging_type: &str, fragility: &str) -> String {
    let packaging = packaging_type.to_lowercase();
    if encoders::parse::<Fragility>(fragility) == Some(Fragility::High) {
        format!(
            "This {} provides excellent protection while minimizing environmental impact. Consider using reinforced corners for fragile items.",
            packaging
        )
    } else {
        format!(
            "This {} option provides good protection while maintaining sustainability standards. Ideal for standard shipping requirements.",
            packaging
        )
    }
}

/// Recommends a packaging option. Adds up to 20 points of noise before clamping to `[60, 100]`.
pub fn predict_packaging<R: Rng + ?Sized>(input: &PackagingInput, rng: &mut R) -> PackagingPrediction {
    let material: MaterialType = encoders::encode(&input.material_type);
    let score = (base_score(input) + rng.gen_range(0.0..20.0)).clamp(60.0, 100.0);

    let cost_efficiency = if score > 80.0 {
        Level::High
    } else if score > 60.0 {
        Level::Medium
    } else {
        Level::Low
    };
    let carbon_impact = if score > 75.0 {
        Level::Low
    } else if score > 50.0 {
        Level::Medium
    } else {
        Level::High
    };

    let index = ((score / 100.0) * PACKAGING_OPTIONS.len() as f64).floor() as usize;
    let packaging_type = PACKAGING_OPTIONS[index.min(PACKAGING_OPTIONS.len() - 1)];

    tracing::debug!(material = %material, score, packaging_type, "packaging scored");

    PackagingPrediction {
        packaging_type: packaging_type.to_string(),
        sustainability_score: score.round() as u32,
        cost_efficiency,
        carbon_impact,
        recommendation: recommendation(packaging_type, &input.fragility),
    }
}

pub struct PackagingModel;

impl SustainabilityModel for PackagingModel {
    const MODEL_TYPE: ModelType = ModelType::Packaging;
    type Input = PackagingInput;
    type Output = PackagingPrediction;

    fn predict<R: Rng + ?Sized>(
        input: &PackagingInput,
        rng: &mut R,
    ) -> Result<PackagingPrediction, PredictionError> {
        Ok(predict_packaging(input, rng))
    }

    fn confidence(output: &PackagingPrediction) -> Option<f64> {
        Some(output.sustainability_score as f64 / 100.0)
    }
}
