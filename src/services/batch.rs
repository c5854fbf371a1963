use crate::{
    errors::ServiceError,
    metrics::{BATCH_JOBS_TOTAL, BATCH_ROWS_TOTAL},
    models::{BatchJob, BatchJobStatus, BatchJobUpdate, ModelType, NewBatchJob},
    services::data_processor::{self, CsvRow},
    store::Store,
};
use chrono::Utc;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, Instrument};
use utoipa::ToSchema;

/// Acknowledgement returned once a batch job has been queued.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchSubmission {
    pub job_id: i32,
    pub total_rows: i32,
}

/// Queues CSV uploads and processes them on detached tasks.
#[derive(Clone)]
pub struct BatchService {
    store: Arc<dyn Store>,
    progress_interval: usize,
}

impl BatchService {
    pub fn new(store: Arc<dyn Store>, progress_interval: usize) -> Self {
        Self {
            store,
            progress_interval: progress_interval.max(1),
        }
    }

    /// Parses `csv`, records a `queued` job and spawns its processing.
    ///
    /// The job row exists before the task starts, so callers can poll it
    /// immediately. The returned handle may be dropped.
    #[instrument(skip(self, csv), fields(filename = %filename, model_type = %model_type))]
    pub async fn submit(
        &self,
        filename: &str,
        model_type: ModelType,
        csv: &str,
    ) -> Result<(BatchSubmission, JoinHandle<()>), ServiceError> {
        let rows = data_processor::parse_csv(csv)?;
        let total_rows = i32::try_from(rows.len())
            .map_err(|_| ServiceError::BadRequest("CSV has too many rows".to_string()))?;

        let job = self
            .store
            .create_batch_job(NewBatchJob {
                filename: filename.to_string(),
                model_type,
                total_rows,
            })
            .await?;
        BATCH_JOBS_TOTAL.with_label_values(&["submitted"]).inc();
        info!(job_id = job.id, total_rows, "batch job queued");

        let service = self.clone();
        let job_id = job.id;
        let handle = tokio::spawn(
            async move { service.run(job_id, model_type, rows).await }
                .instrument(tracing::info_span!("batch_job", job_id)),
        );

        Ok((BatchSubmission { job_id, total_rows }, handle))
    }

    /// Drives one job to a terminal state. A job-level failure is recorded
    /// on the job itself.
    async fn run(&self, job_id: i32, model_type: ModelType, rows: Vec<CsvRow>) {
        match self.process(job_id, model_type, &rows).await {
            Ok(job) => {
                BATCH_JOBS_TOTAL.with_label_values(&["completed"]).inc();
                info!(processed_rows = job.processed_rows, "batch job completed");
            }
            Err(err) => {
                BATCH_JOBS_TOTAL.with_label_values(&["failed"]).inc();
                error!(error = %err, "batch job failed");
                let update = BatchJobUpdate::failed(err.to_string(), Utc::now());
                if let Err(e) = self.store.update_batch_job(job_id, update).await {
                    error!(error = %e, "could not record batch job failure");
                }
            }
        }
    }

    async fn process(
        &self,
        job_id: i32,
        model_type: ModelType,
        rows: &[CsvRow],
    ) -> Result<BatchJob, ServiceError> {
        self.apply(job_id, BatchJobUpdate::status(BatchJobStatus::Processing))
            .await?;

        let mut rng = StdRng::from_entropy();
        let mut results = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let result = data_processor::process_row_for(model_type, row, &mut rng);
            let outcome = if result.is_success() { "success" } else { "error" };
            BATCH_ROWS_TOTAL.with_label_values(&[outcome]).inc();
            results.push(result);

            let done = index + 1;
            if done % self.progress_interval == 0 && done < rows.len() {
                self.apply(job_id, BatchJobUpdate::progress(done as i32))
                    .await?;
            }
        }

        self.apply(job_id, BatchJobUpdate::completed(results, Utc::now()))
            .await
    }

    async fn apply(&self, job_id: i32, update: BatchJobUpdate) -> Result<BatchJob, ServiceError> {
        self.store
            .update_batch_job(job_id, update)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch job {} not found", job_id)))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, job_id: i32) -> Result<BatchJob, ServiceError> {
        self.store
            .get_batch_job(job_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Batch job {} not found", job_id)))
    }

    /// All jobs, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<BatchJob>, ServiceError> {
        self.store.list_batch_jobs().await
    }
}
