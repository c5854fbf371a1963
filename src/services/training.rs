use crate::{
    errors::ServiceError,
    metrics::TRAINING_RUNS_TOTAL,
    models::{ModelStatus, ModelStatusUpsert, ModelType, TrainingStatus},
    store::Store,
};
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use rand::Rng;
use serde::Serialize;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::{sync::Mutex, task::AbortHandle};
use tracing::{error, info, instrument, warn, Instrument};
use utoipa::ToSchema;

const ACCURACY_RANGE: std::ops::Range<f64> = 75.0..95.0;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStarted {
    pub message: String,
    pub model_type: ModelType,
}

struct TrainingTask {
    handle: AbortHandle,
    generation: u64,
    /// Status in effect before this run started; restored on cancel.
    previous: ModelStatusUpsert,
}

/// Simulated training runs, one outstanding task per model type.
///
/// A run finishes by removing its own registry entry; cancel and shutdown
/// remove the entry first, so exactly one of them decides the final status.
/// Start, cancel and a finishing run hold `status_lock` across their registry
/// change and status write, so a finished run never lands after a newer start.
#[derive(Clone)]
pub struct TrainingService {
    store: Arc<dyn Store>,
    delay: Duration,
    tasks: Arc<DashMap<ModelType, TrainingTask>>,
    generations: Arc<AtomicU64>,
    status_lock: Arc<Mutex<()>>,
}

impl TrainingService {
    pub fn new(store: Arc<dyn Store>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            tasks: Arc::new(DashMap::new()),
            generations: Arc::new(AtomicU64::new(0)),
            status_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Marks `model_type` as training and schedules its completion,
    /// replacing any run already outstanding for it.
    #[instrument(skip(self))]
    pub async fn start(&self, model_type: ModelType) -> Result<TrainingStarted, ServiceError> {
        let _status_guard = self.status_lock.lock().await;
        let before = self
            .store
            .get_model_status(model_type)
            .await?
            .filter(|s| s.status != TrainingStatus::Training)
            .map(|s| ModelStatusUpsert::from(&s))
            .unwrap_or_else(|| ModelStatusUpsert::not_trained(model_type));

        self.store
            .upsert_model_status(ModelStatusUpsert::training(model_type))
            .await?;

        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        // The entry guard is held across spawn so the task cannot finish
        // before it is registered.
        match self.tasks.entry(model_type) {
            Entry::Occupied(mut occupied) => {
                occupied.get().handle.abort();
                warn!("replacing outstanding training run");
                let previous = occupied.get().previous.clone();
                let handle = self.spawn_run(model_type, generation);
                occupied.insert(TrainingTask {
                    handle,
                    generation,
                    previous,
                });
            }
            Entry::Vacant(vacant) => {
                let handle = self.spawn_run(model_type, generation);
                vacant.insert(TrainingTask {
                    handle,
                    generation,
                    previous: before,
                });
            }
        }

        TRAINING_RUNS_TOTAL.with_label_values(&["started"]).inc();
        info!("training started");
        Ok(TrainingStarted {
            message: "Training started".to_string(),
            model_type,
        })
    }

    fn spawn_run(&self, model_type: ModelType, generation: u64) -> AbortHandle {
        let store = self.store.clone();
        let tasks = self.tasks.clone();
        let status_lock = self.status_lock.clone();
        let delay = self.delay;

        let run = async move {
            tokio::time::sleep(delay).await;
            let _status_guard = status_lock.lock().await;
            if tasks
                .remove_if(&model_type, |_, task| task.generation == generation)
                .is_none()
            {
                return;
            }

            let accuracy = rand::thread_rng().gen_range(ACCURACY_RANGE);
            let update = ModelStatusUpsert::trained(model_type, accuracy, Utc::now());
            match store.upsert_model_status(update).await {
                Ok(_) => {
                    TRAINING_RUNS_TOTAL.with_label_values(&["completed"]).inc();
                    info!(accuracy, "training completed");
                }
                Err(e) => {
                    TRAINING_RUNS_TOTAL.with_label_values(&["failed"]).inc();
                    error!(error = %e, "could not record training result");
                }
            }
        };

        tokio::spawn(run.instrument(tracing::info_span!("training_run", model_type = %model_type)))
            .abort_handle()
    }

    /// Aborts the outstanding run and restores the prior status.
    #[instrument(skip(self))]
    pub async fn cancel(&self, model_type: ModelType) -> Result<ModelStatus, ServiceError> {
        let _status_guard = self.status_lock.lock().await;
        let Some((_, task)) = self.tasks.remove(&model_type) else {
            return Err(ServiceError::Conflict(format!(
                "Model {} is not training",
                model_type
            )));
        };
        task.handle.abort();
        TRAINING_RUNS_TOTAL.with_label_values(&["cancelled"]).inc();
        info!(restored = %task.previous.status, "training cancelled");
        self.store.upsert_model_status(task.previous).await
    }

    pub fn is_training(&self, model_type: ModelType) -> bool {
        self.tasks.contains_key(&model_type)
    }

    /// Aborts every outstanding run. Their status updates are lost and the
    /// rows are repaired by start-up recovery.
    pub fn shutdown(&self) {
        let outstanding: Vec<ModelType> = self.tasks.iter().map(|entry| *entry.key()).collect();
        for model_type in outstanding {
            if let Some((_, task)) = self.tasks.remove(&model_type) {
                task.handle.abort();
                TRAINING_RUNS_TOTAL.with_label_values(&["aborted"]).inc();
                warn!(model_type = %model_type, "training aborted by shutdown; status update lost");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{testing::ObservedStore, InMemoryStore};
    use tokio::sync::Semaphore;

    fn service(delay_ms: u64) -> (TrainingService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (
            TrainingService::new(store.clone(), Duration::from_millis(delay_ms)),
            store,
        )
    }

    async fn status(store: &InMemoryStore, model_type: ModelType) -> ModelStatus {
        store.get_model_status(model_type).await.unwrap().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn training_completes_after_delay() {
        let (service, store) = service(3_000);
        let started = service.start(ModelType::Packaging).await.unwrap();
        assert_eq!(started.message, "Training started");

        let during = status(&store, ModelType::Packaging).await;
        assert_eq!(during.status, TrainingStatus::Training);
        assert_eq!(during.accuracy, None);
        assert_eq!(during.last_trained, None);

        tokio::time::sleep(Duration::from_millis(3_100)).await;
        let after = status(&store, ModelType::Packaging).await;
        assert_eq!(after.status, TrainingStatus::Trained);
        let accuracy = after.accuracy.unwrap();
        assert!((75.0..95.0).contains(&accuracy));
        assert!(after.last_trained.is_some());
        assert!(!service.is_training(ModelType::Packaging));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_restores_previous_status() {
        let (service, store) = service(3_000);
        let at = Utc::now();
        store
            .upsert_model_status(ModelStatusUpsert::trained(ModelType::Esg, 81.0, at))
            .await
            .unwrap();

        service.start(ModelType::Esg).await.unwrap();
        // A restart keeps the status captured by the first run.
        service.start(ModelType::Esg).await.unwrap();
        let restored = service.cancel(ModelType::Esg).await.unwrap();
        assert_eq!(restored.status, TrainingStatus::Trained);
        assert_eq!(restored.accuracy, Some(81.0));

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(status(&store, ModelType::Esg).await.accuracy, Some(81.0));
    }

    #[tokio::test]
    async fn cancel_without_run_conflicts() {
        let (service, _) = service(10);
        let err = service.cancel(ModelType::Carbon).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_leaves_status_training() {
        let (service, store) = service(3_000);
        service.start(ModelType::Product).await.unwrap();
        service.shutdown();
        assert!(!service.is_training(ModelType::Product));

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(
            status(&store, ModelType::Product).await.status,
            TrainingStatus::Training
        );
    }

    #[tokio::test(start_paused = true)]
    async fn finished_run_does_not_overwrite_a_restart() {
        let gate = Arc::new(Semaphore::new(0));
        let store = Arc::new(ObservedStore::gated_trained_writes(gate.clone()));
        let service = TrainingService::new(store.clone(), Duration::from_millis(10));

        service.start(ModelType::Carbon).await.unwrap();
        // The run has claimed its entry and is parked inside its trained write.
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!service.is_training(ModelType::Carbon));

        let restart = tokio::spawn({
            let service = service.clone();
            async move { service.start(ModelType::Carbon).await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        gate.add_permits(1);
        restart.await.unwrap().unwrap();

        let current = store.get_model_status(ModelType::Carbon).await.unwrap().unwrap();
        assert_eq!(current.status, TrainingStatus::Training);
        assert!(service.is_training(ModelType::Carbon));
    }
}
