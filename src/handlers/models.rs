use crate::{
    errors::ServiceError,
    models::{ModelStatus, ModelType},
    services::training::TrainingStarted,
    AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
};

#[utoipa::path(
    get,
    path = "/api/models/status",
    responses(
        (status = 200, description = "Status of every model", body = [ModelStatus])
    ),
    tag = "models"
)]
pub async fn list_model_statuses(
    State(state): State<AppState>,
) -> Result<Json<Vec<ModelStatus>>, ServiceError> {
    let statuses = state.services.model_status.list().await?;
    Ok(Json(statuses))
}

#[utoipa::path(
    get,
    path = "/api/models/status/:modelType",
    params(
        ("modelType" = String, Path, description = "packaging, carbon, product or esg")
    ),
    responses(
        (status = 200, description = "Model status", body = ModelStatus),
        (status = 404, description = "Model not found", body = crate::errors::ErrorResponse)
    ),
    tag = "models"
)]
pub async fn get_model_status(
    State(state): State<AppState>,
    Path(model_type): Path<String>,
) -> Result<Json<ModelStatus>, ServiceError> {
    let model_type = ModelType::parse(&model_type)
        .map_err(|_| ServiceError::NotFound(format!("Model {} not found", model_type)))?;
    let status = state.services.model_status.get(model_type).await?;
    Ok(Json(status))
}

#[utoipa::path(
    post,
    path = "/api/models/train/:modelType",
    params(
        ("modelType" = String, Path, description = "packaging, carbon, product or esg")
    ),
    responses(
        (status = 200, description = "Training scheduled", body = TrainingStarted),
        (status = 400, description = "Unknown model type", body = crate::errors::ErrorResponse)
    ),
    tag = "models"
)]
pub async fn train_model(
    State(state): State<AppState>,
    Path(model_type): Path<String>,
) -> Result<Json<TrainingStarted>, ServiceError> {
    let model_type = ModelType::parse(&model_type)?;
    let started = state.services.training.start(model_type).await?;
    Ok(Json(started))
}

#[utoipa::path(
    post,
    path = "/api/models/train/:modelType/cancel",
    params(
        ("modelType" = String, Path, description = "packaging, carbon, product or esg")
    ),
    responses(
        (status = 200, description = "Training cancelled; prior status restored", body = ModelStatus),
        (status = 400, description = "Unknown model type", body = crate::errors::ErrorResponse),
        (status = 409, description = "Model is not training", body = crate::errors::ErrorResponse)
    ),
    tag = "models"
)]
pub async fn cancel_training(
    State(state): State<AppState>,
    Path(model_type): Path<String>,
) -> Result<Json<ModelStatus>, ServiceError> {
    let model_type = ModelType::parse(&model_type)?;
    let restored = state.services.training.cancel(model_type).await?;
    Ok(Json(restored))
}
