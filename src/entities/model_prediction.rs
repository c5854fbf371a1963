use crate::{errors::ServiceError, models};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_predictions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub model_type: String,
    pub input_data: Json,
    pub prediction: Json,
    pub confidence: Option<f64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for models::ModelPrediction {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            model_type: models::ModelType::from_str(&model.model_type)
                .map_err(|_| ServiceError::InvalidStatus(model.model_type.clone()))?,
            input_data: model.input_data,
            prediction: model.prediction,
            confidence: model.confidence,
            created_at: model.created_at,
        })
    }
}
