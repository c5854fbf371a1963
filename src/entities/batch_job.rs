use crate::{errors::ServiceError, models};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "batch_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub filename: String,
    pub model_type: String,
    pub status: String,
    pub total_rows: i32,
    pub processed_rows: i32,
    /// Serialized `Vec<BatchRowResult>`
    pub results: Option<Json>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for models::BatchJob {
    type Error = ServiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let results = model
            .results
            .map(serde_json::from_value::<Vec<models::BatchRowResult>>)
            .transpose()?;

        Ok(Self {
            id: model.id,
            filename: model.filename,
            model_type: models::ModelType::from_str(&model.model_type)
                .map_err(|_| ServiceError::InvalidStatus(model.model_type.clone()))?,
            status: models::BatchJobStatus::from_str(&model.status)
                .map_err(|_| ServiceError::InvalidStatus(model.status.clone()))?,
            total_rows: model.total_rows,
            processed_rows: model.processed_rows,
            results,
            error_message: model.error_message,
            created_at: model.created_at,
            completed_at: model.completed_at,
        })
    }
}
