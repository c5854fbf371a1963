use super::{check_transition, Store};
use crate::{
    db::DbPool,
    entities::{batch_job, model_prediction, model_status},
    errors::ServiceError,
    models::{
        BatchJob, BatchJobStatus, BatchJobUpdate, ModelPrediction, ModelStatus, ModelStatusUpsert,
        ModelType, NewBatchJob, NewModelPrediction,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, NotSet, QueryFilter, QueryOrder,
    Set,
};
use std::str::FromStr;
use std::sync::Arc;
use tracing::instrument;

/// Relational store over the sea-orm entities.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    db: Arc<DbPool>,
}

impl DatabaseStore {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Store for DatabaseStore {
    #[instrument(skip(self, prediction), fields(model_type = %prediction.model_type))]
    async fn create_prediction(
        &self,
        prediction: NewModelPrediction,
    ) -> Result<ModelPrediction, ServiceError> {
        let model = model_prediction::ActiveModel {
            id: NotSet,
            model_type: Set(prediction.model_type.to_string()),
            input_data: Set(prediction.input_data),
            prediction: Set(prediction.prediction),
            confidence: Set(prediction.confidence),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;
        ModelPrediction::try_from(model)
    }

    #[instrument(skip(self))]
    async fn list_predictions(
        &self,
        model_type: Option<ModelType>,
    ) -> Result<Vec<ModelPrediction>, ServiceError> {
        let mut query = model_prediction::Entity::find();
        if let Some(model_type) = model_type {
            query = query.filter(model_prediction::Column::ModelType.eq(model_type.to_string()));
        }
        query
            .order_by_desc(model_prediction::Column::CreatedAt)
            .order_by_desc(model_prediction::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ModelPrediction::try_from)
            .collect()
    }

    #[instrument(skip(self, job), fields(filename = %job.filename))]
    async fn create_batch_job(&self, job: NewBatchJob) -> Result<BatchJob, ServiceError> {
        let model = batch_job::ActiveModel {
            id: NotSet,
            filename: Set(job.filename),
            model_type: Set(job.model_type.to_string()),
            status: Set(BatchJobStatus::Queued.to_string()),
            total_rows: Set(job.total_rows),
            processed_rows: Set(0),
            results: Set(None),
            error_message: Set(None),
            created_at: Set(Utc::now()),
            completed_at: Set(None),
        }
        .insert(&*self.db)
        .await?;
        BatchJob::try_from(model)
    }

    #[instrument(skip(self))]
    async fn get_batch_job(&self, id: i32) -> Result<Option<BatchJob>, ServiceError> {
        batch_job::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .map(BatchJob::try_from)
            .transpose()
    }

    #[instrument(skip(self, update))]
    async fn update_batch_job(
        &self,
        id: i32,
        update: BatchJobUpdate,
    ) -> Result<Option<BatchJob>, ServiceError> {
        let Some(existing) = batch_job::Entity::find_by_id(id).one(&*self.db).await? else {
            return Ok(None);
        };
        let current = BatchJobStatus::from_str(&existing.status)
            .map_err(|_| ServiceError::InvalidStatus(existing.status.clone()))?;
        check_transition(id, current, &update)?;

        let mut active = existing.into_active_model();
        if let Some(status) = update.status {
            active.status = Set(status.to_string());
        }
        if let Some(processed_rows) = update.processed_rows {
            active.processed_rows = Set(processed_rows);
        }
        if let Some(results) = update.results {
            active.results = Set(Some(serde_json::to_value(results)?));
        }
        if let Some(message) = update.error_message {
            active.error_message = Set(Some(message));
        }
        if let Some(completed_at) = update.completed_at {
            active.completed_at = Set(Some(completed_at));
        }

        let updated = active.update(&*self.db).await?;
        BatchJob::try_from(updated).map(Some)
    }

    #[instrument(skip(self))]
    async fn list_batch_jobs(&self) -> Result<Vec<BatchJob>, ServiceError> {
        batch_job::Entity::find()
            .order_by_desc(batch_job::Column::CreatedAt)
            .order_by_desc(batch_job::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(BatchJob::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    async fn get_model_status(
        &self,
        model_type: ModelType,
    ) -> Result<Option<ModelStatus>, ServiceError> {
        model_status::Entity::find()
            .filter(model_status::Column::ModelType.eq(model_type.to_string()))
            .one(&*self.db)
            .await?
            .map(ModelStatus::try_from)
            .transpose()
    }

    #[instrument(skip(self, status), fields(model_type = %status.model_type, status = %status.status))]
    async fn upsert_model_status(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError> {
        let existing = model_status::Entity::find()
            .filter(model_status::Column::ModelType.eq(status.model_type.to_string()))
            .one(&*self.db)
            .await?;

        let saved = match existing {
            Some(row) => {
                let mut active = row.into_active_model();
                active.status = Set(status.status.to_string());
                active.accuracy = Set(status.accuracy);
                active.last_trained = Set(status.last_trained);
                active.version = Set(status.version);
                active.update(&*self.db).await?
            }
            None => {
                model_status::ActiveModel {
                    id: NotSet,
                    model_type: Set(status.model_type.to_string()),
                    status: Set(status.status.to_string()),
                    accuracy: Set(status.accuracy),
                    last_trained: Set(status.last_trained),
                    version: Set(status.version),
                }
                .insert(&*self.db)
                .await?
            }
        };
        ModelStatus::try_from(saved)
    }

    #[instrument(skip(self, status), fields(model_type = %status.model_type))]
    async fn insert_model_status_if_absent(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError> {
        let model_type = status.model_type;
        let row = model_status::ActiveModel {
            id: NotSet,
            model_type: Set(model_type.to_string()),
            status: Set(status.status.to_string()),
            accuracy: Set(status.accuracy),
            last_trained: Set(status.last_trained),
            version: Set(status.version),
        };
        // The unique model_type index makes a concurrent insert a no-op.
        model_status::Entity::insert(row)
            .on_conflict(
                OnConflict::column(model_status::Column::ModelType)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await?;

        self.get_model_status(model_type).await?.ok_or_else(|| {
            ServiceError::InternalError(format!("model status {} vanished after insert", model_type))
        })
    }

    #[instrument(skip(self))]
    async fn list_model_statuses(&self) -> Result<Vec<ModelStatus>, ServiceError> {
        model_status::Entity::find()
            .order_by_asc(model_status::Column::Id)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(ModelStatus::try_from)
            .collect()
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        crate::db::check_connection(&self.db).await
    }
}
