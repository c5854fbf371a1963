use crate::{
    errors::ServiceError,
    metrics::{PREDICTIONS_TOTAL, PREDICTION_FAILURES_TOTAL},
    ml::SustainabilityModel,
    models::{ModelPrediction, ModelType, NewModelPrediction},
    store::Store,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Body returned by every `POST /predict/*` endpoint.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PredictionResponse {
    #[schema(value_type = Object)]
    pub prediction: Value,
    /// Id of the persisted prediction record.
    pub id: i32,
}

/// Runs single predictions and records them.
#[derive(Clone)]
pub struct PredictionService {
    store: Arc<dyn Store>,
}

impl PredictionService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Validates `input`, scores it with model `M` and persists the result.
    #[instrument(skip(self, input), fields(model_type = %M::MODEL_TYPE))]
    pub async fn predict<M: SustainabilityModel>(
        &self,
        input: M::Input,
    ) -> Result<PredictionResponse, ServiceError> {
        let model_type = M::MODEL_TYPE;
        let scored = input
            .validate()
            .map_err(ServiceError::from)
            .and_then(|_| {
                let mut rng = rand::thread_rng();
                M::predict(&input, &mut rng).map_err(ServiceError::from)
            });
        let output = match scored {
            Ok(output) => output,
            Err(err) => {
                warn!(error = %err, "prediction rejected");
                PREDICTION_FAILURES_TOTAL
                    .with_label_values(&[model_type.as_ref()])
                    .inc();
                return Err(err);
            }
        };

        let record = self
            .store
            .create_prediction(NewModelPrediction {
                model_type,
                input_data: serde_json::to_value(&input)?,
                prediction: serde_json::to_value(&output)?,
                confidence: M::confidence(&output),
            })
            .await?;

        PREDICTIONS_TOTAL
            .with_label_values(&[model_type.as_ref()])
            .inc();
        info!(prediction_id = record.id, "prediction stored");

        Ok(PredictionResponse {
            prediction: record.prediction,
            id: record.id,
        })
    }

    /// Prediction history, newest first.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        model_type: Option<ModelType>,
    ) -> Result<Vec<ModelPrediction>, ServiceError> {
        self.store.list_predictions(model_type).await
    }
}
