use crate::{
    errors::ServiceError,
    models::{BatchJobStatus, BatchJobUpdate, ModelStatusUpsert, TrainingStatus},
    store::Store,
};
use chrono::Utc;
use tracing::{info, warn};

pub const INTERRUPTED_MESSAGE: &str = "interrupted by service restart";

/// What start-up recovery repaired.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryReport {
    pub failed_jobs: usize,
    pub errored_models: usize,
}

/// Repairs rows left mid-flight by a previous process: training statuses
/// become `error` and unfinished batch jobs become `failed`.
pub async fn recover_interrupted_work(store: &dyn Store) -> Result<RecoveryReport, ServiceError> {
    let mut report = RecoveryReport::default();

    for status in store.list_model_statuses().await? {
        if status.status != TrainingStatus::Training {
            continue;
        }
        warn!(model_type = %status.model_type, "training was interrupted");
        store
            .upsert_model_status(ModelStatusUpsert {
                status: TrainingStatus::Error,
                ..ModelStatusUpsert::from(&status)
            })
            .await?;
        report.errored_models += 1;
    }

    for job in store.list_batch_jobs().await? {
        if !matches!(job.status, BatchJobStatus::Queued | BatchJobStatus::Processing) {
            continue;
        }
        warn!(job_id = job.id, status = %job.status, "batch job was interrupted");
        store
            .update_batch_job(job.id, BatchJobUpdate::failed(INTERRUPTED_MESSAGE, Utc::now()))
            .await?;
        report.failed_jobs += 1;
    }

    if report != RecoveryReport::default() {
        info!(
            failed_jobs = report.failed_jobs,
            errored_models = report.errored_models,
            "recovered interrupted work"
        );
    }
    Ok(report)
}
