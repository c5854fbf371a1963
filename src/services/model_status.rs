use crate::{
    errors::ServiceError,
    models::{ModelStatus, ModelStatusUpsert, ModelType},
    store::Store,
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Read side of the model status table.
#[derive(Clone)]
pub struct ModelStatusService {
    store: Arc<dyn Store>,
}

impl ModelStatusService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Every model's status, seeding `not_trained` rows for any model type
    /// that has none yet.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ModelStatus>, ServiceError> {
        let statuses = self.store.list_model_statuses().await?;
        if statuses.len() >= ModelType::all().len() {
            return Ok(statuses);
        }
        self.seed_missing(&statuses).await?;
        self.store.list_model_statuses().await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, model_type: ModelType) -> Result<ModelStatus, ServiceError> {
        if let Some(status) = self.store.get_model_status(model_type).await? {
            return Ok(status);
        }
        let statuses = self.store.list_model_statuses().await?;
        self.seed_missing(&statuses).await?;
        self.store
            .get_model_status(model_type)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Model {} not found", model_type)))
    }

    /// Inserts defaults only; rows written by a concurrent training start win.
    async fn seed_missing(&self, existing: &[ModelStatus]) -> Result<(), ServiceError> {
        for model_type in ModelType::all() {
            if existing.iter().any(|s| s.model_type == model_type) {
                continue;
            }
            info!(model_type = %model_type, "seeding default model status");
            self.store
                .insert_model_status_if_absent(ModelStatusUpsert::not_trained(model_type))
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TrainingStatus, DEFAULT_MODEL_VERSION};
    use crate::store::InMemoryStore;

    #[tokio::test]
    async fn empty_table_is_seeded_once() {
        let store = Arc::new(InMemoryStore::new());
        let service = ModelStatusService::new(store.clone());

        let first = service.list().await.unwrap();
        assert_eq!(first.len(), 4);
        assert!(first
            .iter()
            .all(|s| s.status == TrainingStatus::NotTrained && s.version == DEFAULT_MODEL_VERSION));

        let second = service.list().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn get_seeds_before_lookup() {
        let service = ModelStatusService::new(Arc::new(InMemoryStore::new()));
        let status = service.get(ModelType::Esg).await.unwrap();
        assert_eq!(status.model_type, ModelType::Esg);
        assert_eq!(status.accuracy, None);
    }

    #[tokio::test]
    async fn partial_table_is_filled_without_overwriting() {
        let store = Arc::new(InMemoryStore::new());
        store
            .upsert_model_status(ModelStatusUpsert::training(ModelType::Carbon))
            .await
            .unwrap();
        let service = ModelStatusService::new(store.clone());

        let esg = service.get(ModelType::Esg).await.unwrap();
        assert_eq!(esg.status, TrainingStatus::NotTrained);

        let statuses = service.list().await.unwrap();
        assert_eq!(statuses.len(), 4);
        let carbon = statuses
            .iter()
            .find(|s| s.model_type == ModelType::Carbon)
            .unwrap();
        assert_eq!(carbon.status, TrainingStatus::Training);
    }
}
