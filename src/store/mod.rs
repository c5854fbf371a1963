/*!
 * # Job/Status Store
 *
 * Persistence for predictions, batch jobs and model statuses behind a
 * single async trait. The backend is chosen once at start-up from
 * `store_backend` in the configuration.
 */

mod database;
mod memory;

pub use database::DatabaseStore;
pub use memory::InMemoryStore;

use crate::{
    errors::ServiceError,
    models::{
        BatchJob, BatchJobStatus, BatchJobUpdate, ModelPrediction, ModelStatus, ModelStatusUpsert,
        ModelType, NewBatchJob, NewModelPrediction,
    },
};
use async_trait::async_trait;

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_prediction(
        &self,
        prediction: NewModelPrediction,
    ) -> Result<ModelPrediction, ServiceError>;

    /// Newest first, optionally restricted to one model type.
    async fn list_predictions(
        &self,
        model_type: Option<ModelType>,
    ) -> Result<Vec<ModelPrediction>, ServiceError>;

    async fn create_batch_job(&self, job: NewBatchJob) -> Result<BatchJob, ServiceError>;

    async fn get_batch_job(&self, id: i32) -> Result<Option<BatchJob>, ServiceError>;

    /// Applies `update` in place. Returns `None` when the job does not exist and
    /// `InvalidStatus` when the status change is not a legal transition.
    async fn update_batch_job(
        &self,
        id: i32,
        update: BatchJobUpdate,
    ) -> Result<Option<BatchJob>, ServiceError>;

    /// Newest first.
    async fn list_batch_jobs(&self) -> Result<Vec<BatchJob>, ServiceError>;

    async fn get_model_status(
        &self,
        model_type: ModelType,
    ) -> Result<Option<ModelStatus>, ServiceError>;

    /// Inserts or fully replaces the status row for `status.model_type`.
    async fn upsert_model_status(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError>;

    /// Inserts `status` unless a row for its model type already exists, and
    /// returns whichever row is stored afterwards. Never overwrites.
    async fn insert_model_status_if_absent(
        &self,
        status: ModelStatusUpsert,
    ) -> Result<ModelStatus, ServiceError>;

    async fn list_model_statuses(&self) -> Result<Vec<ModelStatus>, ServiceError>;

    async fn ping(&self) -> Result<(), ServiceError>;
}

pub(crate) fn check_transition(
    id: i32,
    current: BatchJobStatus,
    update: &BatchJobUpdate,
) -> Result<(), ServiceError> {
    match update.status {
        Some(next) if !current.can_transition_to(next) => Err(ServiceError::InvalidStatus(
            format!("batch job {} cannot move from {} to {}", id, current, next),
        )),
        _ => Ok(()),
    }
}


#[cfg(test)]
pub(crate) mod testing {
    //! In-memory store wrapper that records batch updates and can hold or
    //! fail chosen writes.

    use super::*;
    use crate::models::TrainingStatus;
    use std::sync::{Arc, Mutex};
    use tokio::sync::Semaphore;

    #[derive(Default)]
    pub struct ObservedStore {
        inner: InMemoryStore,
        batch_updates: Mutex<Vec<BatchJobUpdate>>,
        fail_batch_status: Option<BatchJobStatus>,
        trained_gate: Option<Arc<Semaphore>>,
    }

    impl ObservedStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Updates moving a job to `status` fail with an internal error.
        pub fn failing_batch_status(status: BatchJobStatus) -> Self {
            Self {
                fail_batch_status: Some(status),
                ..Self::default()
            }
        }

        /// Writes of a `trained` status wait for a permit on `gate`.
        pub fn gated_trained_writes(gate: Arc<Semaphore>) -> Self {
            Self {
                trained_gate: Some(gate),
                ..Self::default()
            }
        }

        pub fn batch_updates(&self) -> Vec<BatchJobUpdate> {
            self.batch_updates
                .lock()
                .map(|updates| updates.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Store for ObservedStore {
        async fn create_prediction(
            &self,
            prediction: NewModelPrediction,
        ) -> Result<ModelPrediction, ServiceError> {
            self.inner.create_prediction(prediction).await
        }

        async fn list_predictions(
            &self,
            model_type: Option<ModelType>,
        ) -> Result<Vec<ModelPrediction>, ServiceError> {
            self.inner.list_predictions(model_type).await
        }

        async fn create_batch_job(&self, job: NewBatchJob) -> Result<BatchJob, ServiceError> {
            self.inner.create_batch_job(job).await
        }

        async fn get_batch_job(&self, id: i32) -> Result<Option<BatchJob>, ServiceError> {
            self.inner.get_batch_job(id).await
        }

        async fn update_batch_job(
            &self,
            id: i32,
            update: BatchJobUpdate,
        ) -> Result<Option<BatchJob>, ServiceError> {
            if let Ok(mut updates) = self.batch_updates.lock() {
                updates.push(update.clone());
            }
            if update.status.is_some() && update.status == self.fail_batch_status {
                return Err(ServiceError::InternalError("disk full".into()));
            }
            self.inner.update_batch_job(id, update).await
        }

        async fn list_batch_jobs(&self) -> Result<Vec<BatchJob>, ServiceError> {
            self.inner.list_batch_jobs().await
        }

        async fn get_model_status(
            &self,
            model_type: ModelType,
        ) -> Result<Option<ModelStatus>, ServiceError> {
            self.inner.get_model_status(model_type).await
        }

        async fn upsert_model_status(
            &self,
            status: ModelStatusUpsert,
        ) -> Result<ModelStatus, ServiceError> {
            if let Some(gate) = &self.trained_gate {
                if status.status == TrainingStatus::Trained {
                    gate.acquire().await.unwrap().forget();
                }
            }
            self.inner.upsert_model_status(status).await
        }

        async fn insert_model_status_if_absent(
            &self,
            status: ModelStatusUpsert,
        ) -> Result<ModelStatus, ServiceError> {
            self.inner.insert_model_status_if_absent(status).await
        }

        async fn list_model_statuses(&self) -> Result<Vec<ModelStatus>, ServiceError> {
            self.inner.list_model_statuses().await
        }

        async fn ping(&self) -> Result<(), ServiceError> {
            self.inner.ping().await
        }
    }
}
