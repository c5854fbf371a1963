/*!
 * # Metrics Module
 *
 * Prometheus counters for predictions, batch jobs and training runs,
 * exposed in text format at `/metrics`.
 */

use crate::errors::ServiceError;
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref PREDICTIONS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("predictions_total", "Single predictions served, by model type"),
        &["model_type"]
    )
    .expect("metric can be created");
    pub static ref PREDICTION_FAILURES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new(
            "prediction_failures_total",
            "Single predictions rejected, by model type"
        ),
        &["model_type"]
    )
    .expect("metric can be created");
    pub static ref BATCH_JOBS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("batch_jobs_total", "Batch jobs by lifecycle event"),
        &["event"]
    )
    .expect("metric can be created");
    pub static ref BATCH_ROWS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("batch_rows_total", "Batch rows processed, by outcome"),
        &["outcome"]
    )
    .expect("metric can be created");
    pub static ref TRAINING_RUNS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("training_runs_total", "Simulated training runs by outcome"),
        &["outcome"]
    )
    .expect("metric can be created");
    pub static ref DB_CONNECTION_FAILURES: IntCounter = IntCounter::new(
        "db_connection_failures_total",
        "Failed database health checks"
    )
    .expect("metric can be created");
    pub static ref REGISTRY: Registry = {
        let registry = Registry::new_custom(Some("ecoscore".to_string()), None)
            .expect("registry can be created");
        registry
            .register(Box::new(PREDICTIONS_TOTAL.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(PREDICTION_FAILURES_TOTAL.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(BATCH_JOBS_TOTAL.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(BATCH_ROWS_TOTAL.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(TRAINING_RUNS_TOTAL.clone()))
            .expect("metric can be registered");
        registry
            .register(Box::new(DB_CONNECTION_FAILURES.clone()))
            .expect("metric can be registered");
        registry
    };
}

/// Renders every registered metric in the Prometheus text exposition format.
pub fn render() -> Result<String, ServiceError> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics encoding failed: {}", e)))?;
    String::from_utf8(buffer)
        .map_err(|e| ServiceError::InternalError(format!("metrics are not utf-8: {}", e)))
}
