use super::{check_transition, Store};
use crate::{
    errors::ServiceError,
    models::{
        BatchJob, BatchJobStatus, BatchJobUpdate, ModelPrediction, ModelStatus, ModelStatusUpsert,
        ModelType, NewBatchJob, NewModelPrediction,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    predictions: BTreeMap<i32, ModelPrediction>,
    batch_jobs: BTreeMap<i32, BatchJob>,
    statuses: BTreeMap<ModelType, ModelStatus>,
    next_prediction_id: i32,
    next_batch_job_id: i32,
    next_status_id: i32,
}

fn next_id(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

/// Process-local store; contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn create_prediction(
        &self,
        prediction: NewModelPrediction,
    ) -> Result<ModelPrediction, ServiceError> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_prediction_id);
        let record = ModelPrediction {
            id,
            model_type: prediction.model_type,
            input_data: prediction.input_data,
            prediction: prediction.prediction,
            confidence: prediction.confidence,
            created_at: Utc::now(),
        };
        tables.predictions.insert(id, record.clone());
        Ok(record)
    }

    async fn list_predictions(
        &self,
        model_type: Option<ModelType>,
    ) -> Result<Vec<ModelPrediction>, ServiceError> {
        let tables = self.tables.read().await;
        let mut predictions: Vec<ModelPrediction> = tables
            .predictions
            .values()
            .filter(|p| model_type.map_or(true, |t| p.model_type == t))
            .cloned()
            .collect();
        predictions.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(predictions)
    }

    async fn create_batch_job(&self, job: NewBatchJob) -> Result<BatchJob, ServiceError> {
        let mut tables = self.tables.write().await;
        let id = next_id(&mut tables.next_batch_job_id);
        let record = BatchJob {
            id,
            filename: job.filename,
            model_type: job.model_type,
            status: BatchJobStatus::Queued,
            total_rows: job.total_rows,
            processed_rows: 0,
            results: None,
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        tables.batch_jobs.insert(id, record.clone());
        Ok(record)
    }

    async fn get_batch_job(&self, id: i32) -> Result<Option<BatchJob>, ServiceError> {
        Ok(self.tables.read().await.batch_jobs.get(&id).cloned())
    }

    async fn update_batch_job(
        &self,
        id: i32,
        update: BatchJobUpdate,
    ) -> Result<Option<BatchJob>, ServiceError> {
        let mut tables = self.tables.write().await;
        let Some(job) = tables.batch_jobs.get_mut(&id) else {
            return Ok(None);
        };
        check_transition(id, job.status, &update)?;
        update.apply_to(job);
        Ok(Some(job.clone()))
    }

    async fn list_batch_jobs(&self) -> Result<Vec<BatchJob>, ServiceError> {
        let tables = self.tables.read().await;
        let mut jobs: Vec<BatchJob> = tables.batch_jobs.values().cloned().collect();
        jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(jobs)
    }

    async fn get_model_status(
        &self,
        model_type: ModelType,
    ) -> Result<Option<ModelStatus>, ServiceError> {
        Ok(self.tables.read().await.statuses.get(&model_type).cloned())
    }

    async fn upsert_model_status(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError> {
        let mut tables = self.tables.write().await;
        let id = match tables.statuses.get(&status.model_type) {
            Some(existing) => existing.id,
            None => next_id(&mut tables.next_status_id),
        };
        let record = ModelStatus {
            id,
            model_type: status.model_type,
            status: status.status,
            accuracy: status.accuracy,
            last_trained: status.last_trained,
            version: status.version,
        };
        tables.statuses.insert(record.model_type, record.clone());
        Ok(record)
    }

    async fn insert_model_status_if_absent(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.statuses.get(&status.model_type) {
            return Ok(existing.clone());
        }
        let record = ModelStatus {
            id: next_id(&mut tables.next_status_id),
            model_type: status.model_type,
            status: status.status,
            accuracy: status.accuracy,
            last_trained: status.last_trained,
            version: status.version,
        };
        tables.statuses.insert(record.model_type, record.clone());
        Ok(record)
    }

    async fn list_model_statuses(&self) -> Result<Vec<ModelStatus>, ServiceError> {
        let tables = self.tables.read().await;
        let mut statuses: Vec<ModelStatus> = tables.statuses.values().cloned().collect();
        statuses.sort_by_key(|s| s.id);
        Ok(statuses)
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        Ok(())
    }
}
