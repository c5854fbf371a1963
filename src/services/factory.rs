use std::sync::Arc;

use crate::{
    config::AppConfig,
    services::{
        batch::BatchService, model_status::ModelStatusService, predictions::PredictionService,
        training::TrainingService,
    },
    store::Store,
};

/// Every service the HTTP layer needs, built over one store.
#[derive(Clone)]
pub struct AppServices {
    pub predictions: PredictionService,
    pub batch: BatchService,
    pub training: TrainingService,
    pub model_status: ModelStatusService,
}

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    store: Arc<dyn Store>,
    config: Arc<AppConfig>,
}

impl ServiceFactory {
    pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    pub fn prediction_service(&self) -> PredictionService {
        PredictionService::new(self.store.clone())
    }

    pub fn batch_service(&self) -> BatchService {
        BatchService::new(self.store.clone(), self.config.batch_progress_interval)
    }

    pub fn training_service(&self) -> TrainingService {
        TrainingService::new(self.store.clone(), self.config.training_delay())
    }

    pub fn model_status_service(&self) -> ModelStatusService {
        ModelStatusService::new(self.store.clone())
    }

    pub fn create_all(&self) -> AppServices {
        AppServices {
            predictions: self.prediction_service(),
            batch: self.batch_service(),
            training: self.training_service(),
            model_status: self.model_status_service(),
        }
    }

    /// Gets a reference to the backing store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
