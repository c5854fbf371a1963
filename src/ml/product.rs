use super::{PredictionError, SustainabilityModel};
use crate::models::ModelType;
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

const MAX_PURCHASE_LIKELIHOOD: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    #[schema(example = "Apparel")]
    pub category: String,
    #[schema(example = "Organic Cotton")]
    pub material: String,
    #[schema(example = "EcoWear")]
    pub brand: String,
    #[validate(range(min = 0.0))]
    #[schema(example = 45.0)]
    pub price: f64,
    #[validate(range(min = 0.0, max = 5.0))]
    #[schema(example = 4.5)]
    pub rating: f64,
    #[validate(range(min = 0.0))]
    #[schema(example = 150.0)]
    pub reviews_count: f64,
    /// Metric tons CO2
    #[validate(range(min = 0.0))]
    #[schema(example = 30.0)]
    pub carbon_footprint: f64,
    /// Liters
    #[validate(range(min = 0.0))]
    #[schema(example = 500.0)]
    pub water_usage: f64,
    /// kg
    #[validate(range(min = 0.0))]
    #[schema(example = 5.0)]
    pub waste_production: f64,
    /// Category average price
    #[validate(range(min = 0.0))]
    #[schema(example = 60.0)]
    pub avg_price: f64,
}

/// Points awarded per sustainability factor; zero when the factor does not apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SustainabilityFactors {
    pub low_carbon_footprint: u32,
    pub low_water_usage: u32,
    pub low_waste: u32,
    pub good_rating: u32,
    pub popular_product: u32,
    pub affordable_price: u32,
}

impl SustainabilityFactors {
    pub fn score(input: &ProductInput) -> Self {
        let award = |applies: bool, points: u32| if applies { points } else { 0 };
        Self {
            low_carbon_footprint: award(input.carbon_footprint < 50.0, 25),
            low_water_usage: award(input.water_usage < 1000.0, 20),
            low_waste: award(input.waste_production < 10.0, 20),
            good_rating: award(input.rating > 4.0, 15),
            popular_product: award(input.reviews_count > 100.0, 10),
            affordable_price: award(input.price < input.avg_price, 10),
        }
    }

    pub fn total(&self) -> u32 {
        self.low_carbon_footprint
            + self.low_water_usage
            + self.low_waste
            + self.good_rating
            + self.popular_product
            + self.affordable_price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    /// Percentage, capped at 95
    pub purchase_likelihood: u32,
    pub sustainability_score: u32,
    pub factors: SustainabilityFactors,
    pub recommendation: String,
}

fn recommendation_for(score: u32) -> &'static str {
    if score >= 80 {
        "Highly recommended sustainable product with excellent environmental credentials."
    } else if score >= 60 {
        "Good sustainable choice with room for improvement in some areas."
    } else {
        "Consider alternative products with better sustainability ratings."
    }
}

/// Scores a product. Deterministic.
pub fn predict_product_recommendation(input: &ProductInput) -> ProductRecommendation {
    let factors = SustainabilityFactors::score(input);
    let total = factors.total();
    let likelihood = (total as f64 / 100.0).min(MAX_PURCHASE_LIKELIHOOD);

    ProductRecommendation {
        purchase_likelihood: (likelihood * 100.0).round() as u32,
        sustainability_score: total,
        recommendation: recommendation_for(total).to_string(),
        factors,
    }
}

pub struct ProductRecommendationModel;

impl SustainabilityModel for ProductRecommendationModel {
    const MODEL_TYPE: ModelType = ModelType::Product;
    type Input = ProductInput;
    type Output = ProductRecommendation;

    fn predict<R: Rng + ?Sized>(
        input: &ProductInput,
        _rng: &mut R,
    ) -> Result<ProductRecommendation, PredictionError> {
        Ok(predict_product_recommendation(input))
    }

    fn confidence(output: &ProductRecommendation) -> Option<f64> {
        Some(output.purchase_likelihood as f64 / 100.0)
    }
}
