use super::ModelType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// A persisted single prediction. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelPrediction {
    pub id: i32,
    pub model_type: ModelType,
    #[schema(value_type = Object)]
    pub input_data: Value,
    #[schema(value_type = Object)]
    pub prediction: Value,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for [`ModelPrediction`]; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewModelPrediction {
    pub model_type: ModelType,
    pub input_data: Value,
    pub prediction: Value,
    pub confidence: Option<f64>,
}
