use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcoScore API",
        version = "1.0.0",
        description = r#"
# EcoScore Sustainability Analytics API

Heuristic sustainability scoring for e-commerce data.

## Features

- **Predictions**: packaging recommendation, carbon footprint, product recommendation and ESG score
- **Batch processing**: upload a CSV and poll the job for per-row results
- **Model status**: simulated training runs with cancellation

## Error Handling

Errors share one body shape:

```json
{
  "error": "Bad Request",
  "message": "Invalid model type: weather",
  "request_id": "3f1c...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development")
    ),
    tags(
        (name = "predictions", description = "Single predictions and history"),
        (name = "batch", description = "CSV batch jobs"),
        (name = "models", description = "Model status and training"),
        (name = "health", description = "Health check endpoints")
    ),
    paths(
        // Predictions
        crate::handlers::predictions::predict_packaging,
        crate::handlers::predictions::predict_carbon,
        crate::handlers::predictions::predict_product,
        crate::handlers::predictions::predict_esg,
        crate::handlers::predictions::list_predictions,

        // Batch
        crate::handlers::batch::upload_batch,
        crate::handlers::batch::list_batch_jobs,
        crate::handlers::batch::get_batch_job,

        // Models
        crate::handlers::models::list_model_statuses,
        crate::handlers::models::get_model_status,
        crate::handlers::models::train_model,
        crate::handlers::models::cancel_training,

        // Health
        crate::health::health_check,
    ),
    components(
        schemas(
            // Model inputs
            crate::ml::PackagingInput,
            crate::ml::CarbonFootprintInput,
            crate::ml::ProductInput,
            crate::ml::EsgInput,

            // Model outputs
            crate::ml::packaging::PackagingPrediction,
            crate::ml::carbon::CarbonFootprintPrediction,
            crate::ml::carbon::EmissionBreakdown,
            crate::ml::product::ProductRecommendation,
            crate::ml::product::SustainabilityFactors,
            crate::ml::esg::EsgPrediction,
            crate::ml::esg::EsgCategory,

            // Records
            crate::models::ModelType,
            crate::models::ModelPrediction,
            crate::models::ModelStatus,
            crate::models::TrainingStatus,
            crate::models::BatchJob,
            crate::models::BatchJobStatus,
            crate::models::BatchRowResult,

            // Responses
            crate::services::predictions::PredictionResponse,
            crate::services::batch::BatchSubmission,
            crate::services::training::TrainingStarted,
            crate::handlers::batch::BatchUploadForm,
            crate::health::HealthInfo,
            crate::health::HealthStatus,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_api_route() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("EcoScore API"));
        for path in [
            "/api/predict/packaging",
            "/api/predict/esg",
            "/api/batch/upload",
            "/api/models/train/:modelType/cancel",
            "/api/predictions",
            "/health",
        ] {
            assert!(json.contains(path), "missing {}", path);
        }
    }
}
