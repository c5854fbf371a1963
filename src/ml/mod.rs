/*!
 * # Sustainability Models
 *
 * Heuristic scoring models behind the prediction endpoints. Each model is a
 * pure function of its typed input plus an injected random source, so the
 * non-deterministic models (packaging, ESG) can be driven by a fixed
 * generator in tests.
 */

pub mod carbon;
pub mod encoders;
pub mod esg;
pub mod packaging;
pub mod product;

pub use carbon::{predict_carbon_footprint, CarbonFootprintInput, CarbonFootprintModel};
pub use esg::{predict_esg_score, EsgInput, EsgModel};
pub use packaging::{predict_packaging, PackagingInput, PackagingModel};
pub use product::{predict_product_recommendation, ProductInput, ProductRecommendationModel};

use crate::{errors::ServiceError, models::ModelType};
use rand::Rng;
use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

/// Errors raised by a model for inputs that pass validation but cannot be scored.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    #[error("total emissions must be positive, got {0}")]
    NonPositiveTotal(f64),
}

impl From<PredictionError> for ServiceError {
    fn from(err: PredictionError) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

/// Common shape of the four models so persistence and batch processing can
/// be written once.
pub trait SustainabilityModel {
    const MODEL_TYPE: ModelType;

    type Input: Serialize + DeserializeOwned + Validate + Send + Sync + 'static;
    type Output: Serialize + Send + Sync + 'static;

    fn predict<R: Rng + ?Sized>(
        input: &Self::Input,
        rng: &mut R,
    ) -> Result<Self::Output, PredictionError>;

    /// Confidence stored alongside a persisted prediction.
    fn confidence(output: &Self::Output) -> Option<f64>;
}

/// Coarse three-level rating used by the packaging model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
pub enum Level {
    Low,
    Medium,
    High,
}
