use super::ModelType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

pub const DEFAULT_MODEL_VERSION: &str = "1.0";

/// Training lifecycle of a model: `not_trained -> training -> trained`, with
/// `error` reserved for training runs that never completed.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TrainingStatus {
    NotTrained,
    Training,
    Trained,
    Error,
}

/// Current training state of one model type. One row per model type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelStatus {
    pub id: i32,
    pub model_type: ModelType,
    pub status: TrainingStatus,
    pub accuracy: Option<f64>,
    pub last_trained: Option<DateTime<Utc>>,
    pub version: String,
}

/// Full replacement of a model's status, keyed by `model_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStatusUpsert {
    pub model_type: ModelType,
    pub status: TrainingStatus,
    pub accuracy: Option<f64>,
    pub last_trained: Option<DateTime<Utc>>,
    pub version: String,
}

impl ModelStatusUpsert {
    pub fn not_trained(model_type: ModelType) -> Self {
        Self {
            model_type,
            status: TrainingStatus::NotTrained,
            accuracy: None,
            last_trained: None,
            version: DEFAULT_MODEL_VERSION.to_string(),
        }
    }

    pub fn training(model_type: ModelType) -> Self {
        Self {
            status: TrainingStatus::Training,
            ..Self::not_trained(model_type)
        }
    }

    pub fn trained(model_type: ModelType, accuracy: f64, at: DateTime<Utc>) -> Self {
        Self {
            model_type,
            status: TrainingStatus::Trained,
            accuracy: Some(accuracy),
            last_trained: Some(at),
            version: DEFAULT_MODEL_VERSION.to_string(),
        }
    }
}

impl From<&ModelStatus> for ModelStatusUpsert {
    fn from(status: &ModelStatus) -> Self {
        Self {
            model_type: status.model_type,
            status: status.status,
            accuracy: status.accuracy,
            last_trained: status.last_trained,
            version: status.version.clone(),
        }
    }
}
