//! EcoScore API Library
//!
//! Sustainability scoring models, CSV batch processing and simulated model
//! training behind an axum REST API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod metrics;
pub mod middleware_helpers;
pub mod migrator;
pub mod ml;
pub mod models;
pub mod openapi;
pub mod services;
pub mod store;
pub mod tracing;

use axum::{
    extract::DefaultBodyLimit,
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{AppServices, ServiceFactory};
use crate::store::Store;

/// Multipart framing allowance on top of the configured file size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: AppConfig) -> Self {
        let config = Arc::new(config);
        let services = ServiceFactory::new(store.clone(), config.clone()).create_all();
        Self {
            store,
            config,
            services,
        }
    }
}

/// Routes nested under `/api`
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    let models = Router::new()
        .route("/status", get(handlers::models::list_model_statuses))
        .route("/status/:modelType", get(handlers::models::get_model_status))
        .route("/train/:modelType", post(handlers::models::train_model))
        .route(
            "/train/:modelType/cancel",
            post(handlers::models::cancel_training),
        );

    let predict = Router::new()
        .route("/packaging", post(handlers::predictions::predict_packaging))
        .route("/carbon", post(handlers::predictions::predict_carbon))
        .route("/product", post(handlers::predictions::predict_product))
        .route("/esg", post(handlers::predictions::predict_esg));

    let batch = Router::new()
        .route(
            "/upload",
            post(handlers::batch::upload_batch).layer(DefaultBodyLimit::max(
                max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES),
            )),
        )
        .route("/jobs", get(handlers::batch::list_batch_jobs))
        .route("/jobs/:id", get(handlers::batch::get_batch_job));

    Router::new()
        .nest("/models", models)
        .nest("/predict", predict)
        .nest("/batch", batch)
        .route("/predictions", get(handlers::predictions::list_predictions))
}

async fn metrics_handler() -> Result<impl IntoResponse, errors::ServiceError> {
    let body = metrics::render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

/// Full application router: API, health, metrics and docs, with request-id
/// and HTTP tracing layers. CORS and compression are added by the binary.
pub fn app_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(|| async { "ecoscore-api up" }))
        .route("/metrics", get(metrics_handler))
        .nest("/health", health::health_routes())
        .nest("/api", api_routes(max_upload_bytes))
        .merge(openapi::swagger_ui())
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::errors::*;
    pub use crate::ml::SustainabilityModel;
    pub use crate::models::*;
    pub use crate::services::*;
    pub use crate::store::{DatabaseStore, InMemoryStore, Store};
    pub use crate::{app_router, AppState};
}
