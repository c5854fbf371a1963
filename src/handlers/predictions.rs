use super::parse_json;
use crate::{
    errors::ServiceError,
    ml::{
        CarbonFootprintInput, CarbonFootprintModel, EsgInput, EsgModel, PackagingInput,
        PackagingModel, ProductInput, ProductRecommendationModel, SustainabilityModel,
    },
    models::{ModelPrediction, ModelType},
    services::predictions::PredictionResponse,
    AppState,
};
use axum::{
    body::Bytes,
    extract::{Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, Default, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct PredictionListQuery {
    /// Restrict the history to one model type
    pub model_type: Option<String>,
}

async fn run<M: SustainabilityModel>(
    state: &AppState,
    body: &[u8],
) -> Result<Json<PredictionResponse>, ServiceError> {
    let input: M::Input = parse_json(body)?;
    let response = state.services.predictions.predict::<M>(input).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/api/predict/packaging",
    request_body = PackagingInput,
    responses(
        (status = 200, description = "Packaging recommendation", body = PredictionResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "predictions"
)]
pub async fn predict_packaging(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ServiceError> {
    run::<PackagingModel>(&state, &body).await
}

#[utoipa::path(
    post,
    path = "/api/predict/carbon",
    request_body = CarbonFootprintInput,
    responses(
        (status = 200, description = "Carbon footprint estimate", body = PredictionResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "predictions"
)]
pub async fn predict_carbon(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ServiceError> {
    run::<CarbonFootprintModel>(&state, &body).await
}

#[utoipa::path(
    post,
    path = "/api/predict/product",
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product recommendation", body = PredictionResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "predictions"
)]
pub async fn predict_product(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ServiceError> {
    run::<ProductRecommendationModel>(&state, &body).await
}

#[utoipa::path(
    post,
    path = "/api/predict/esg",
    request_body = EsgInput,
    responses(
        (status = 200, description = "ESG score", body = PredictionResponse),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "predictions"
)]
pub async fn predict_esg(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictionResponse>, ServiceError> {
    run::<EsgModel>(&state, &body).await
}

#[utoipa::path(
    get,
    path = "/api/predictions",
    params(PredictionListQuery),
    responses(
        (status = 200, description = "Prediction history, newest first", body = [ModelPrediction]),
        (status = 400, description = "Unknown model type", body = crate::errors::ErrorResponse)
    ),
    tag = "predictions"
)]
pub async fn list_predictions(
    State(state): State<AppState>,
    Query(query): Query<PredictionListQuery>,
) -> Result<Json<Vec<ModelPrediction>>, ServiceError> {
    let model_type = query
        .model_type
        .as_deref()
        .filter(|raw| !raw.is_empty())
        .map(ModelType::parse)
        .transpose()?;
    let predictions = state.services.predictions.list(model_type).await?;
    Ok(Json(predictions))
}
