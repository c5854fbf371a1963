use super::{
    encoders::{self, Sentiment},
    PredictionError, SustainabilityModel,
};
use crate::models::ModelType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const ECO_FRIENDLY_THRESHOLD: u32 = 70;
const REPORTING_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EsgInput {
    #[schema(example = "Bamboo Toothbrush")]
    pub product_name: String,
    #[schema(example = "Customers love the compostable handle.")]
    pub sentence: String,
    #[schema(example = "Positive")]
    pub sentiment: String,
    #[validate(range(min = 0.0, max = 100.0))]
    #[schema(example = 75.0)]
    pub environmental_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum EsgCategory {
    #[serde(rename = "Eco-friendly")]
    EcoFriendly,
    #[serde(rename = "Non Eco-friendly")]
    NonEcoFriendly,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EsgPrediction {
    /// Rounded, within 0..=100
    pub esg_score: u32,
    pub category: EsgCategory,
    /// Echo of the input sentiment
    pub sentiment: String,
    pub environmental_score: f64,
    pub recommendations: Vec<String>,
}

fn recommendations(score: u32, sentiment: Option<Sentiment>) -> Vec<String> {
    let mut items = Vec::new();
    if score < REPORTING_THRESHOLD {
        items.push("Improve environmental reporting and transparency");
        items.push("Implement sustainable sourcing practices");
    }
    if sentiment == Some(Sentiment::Negative) {
        items.push("Address public perception through improved communication");
        items.push("Invest in community engagement programs");
    }
    if score < ECO_FRIENDLY_THRESHOLD {
        items.push("Set measurable sustainability targets");
        items.push("Increase renewable energy usage");
    }
    items.into_iter().map(String::from).collect()
}

/// Scores ESG standing from sentiment and environmental score with +/-10 points of noise.
///
/// Category and recommendations are derived from the published (rounded) score.
pub fn predict_esg_score<R: Rng + ?Sized>(input: &EsgInput, rng: &mut R) -> EsgPrediction {
    let sentiment = encoders::parse::<Sentiment>(&input.sentiment);
    let multiplier = sentiment.unwrap_or_default().multiplier();
    let raw = (input.environmental_score * multiplier + rng.gen_range(-10.0..10.0)).clamp(0.0, 100.0);
    let esg_score = raw.round() as u32;

    let category = if esg_score >= ECO_FRIENDLY_THRESHOLD {
        EsgCategory::EcoFriendly
    } else {
        EsgCategory::NonEcoFriendly
    };

    EsgPrediction {
        esg_score,
        category,
        sentiment: input.sentiment.clone(),
        environmental_score: input.environmental_score,
        recommendations: recommendations(esg_score, sentiment),
    }
}

pub struct EsgModel;

impl SustainabilityModel for EsgModel {
    const MODEL_TYPE: ModelType = ModelType::Esg;
    type Input = EsgInput;
    type Output = EsgPrediction;

    fn predict<R: Rng + ?Sized>(
        input: &EsgInput,
        rng: &mut R,
    ) -> Result<EsgPrediction, PredictionError> {
        Ok(predict_esg_score(input, rng))
    }

    fn confidence(output: &EsgPrediction) -> Option<f64> {
        Some(output.esg_score as f64 / 100.0)
    }
}
