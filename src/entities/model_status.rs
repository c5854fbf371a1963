use crate::{errors::ServiceError, models};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "model_status")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub model_type: String,
    pub status: String,
    pub accuracy: Option<f64>,
    pub last_trained: Option<DateTime<Utc>>,
    pub version: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for models::ModelStatus {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            model_type: models::ModelType::from_str(&model.model_type)
                .map_err(|_| ServiceError::InvalidStatus(model.model_type.clone()))?,
            status: models::TrainingStatus::from_str(&model.status)
                .map_err(|_| ServiceError::InvalidStatus(model.status.clone()))?,
            accuracy: model.accuracy,
            last_trained: model.last_trained,
            version: model.version,
        })
    }
}
