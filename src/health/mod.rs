/*!
 * # Health Check Module
 *
 * - `/health` - store connectivity, 503 when the store is unreachable
 * - `/health/live` - process liveness, never touches the store
 * - `/health/version` - build information
 */

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, error};
use utoipa::ToSchema;

/// Basic health status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Overall health information
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthInfo {
    pub status: HealthStatus,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub checks: BTreeMap<String, HealthStatus>,
}

impl HealthInfo {
    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Up => StatusCode::OK,
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Health check backed by a store ping
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store are reachable", body = HealthInfo),
        (status = 503, description = "Store is unreachable", body = HealthInfo)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    debug!("Health check endpoint called");

    let store = match state.store.ping().await {
        Ok(()) => HealthStatus::Up,
        Err(e) => {
            error!("Store health check failed: {}", e);
            HealthStatus::Down
        }
    };

    let health = HealthInfo {
        status: store,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        checks: BTreeMap::from([("store".to_string(), store)]),
    };
    (health.status_code(), Json(health))
}

/// Liveness check endpoint
pub async fn liveness_check() -> impl IntoResponse {
    Json(json!({
        "alive": true,
        "timestamp": Utc::now(),
    }))
}

/// Returns build and version information
pub async fn version_info() -> impl IntoResponse {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "commit": option_env!("GIT_HASH").unwrap_or("unknown"),
    }))
}

/// Routes mounted under `/health`
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn down_maps_to_service_unavailable() {
        let info = HealthInfo {
            status: HealthStatus::Down,
            version: "0.0.0".into(),
            timestamp: Utc::now(),
            checks: BTreeMap::new(),
        };
        assert_eq!(info.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(serde_json::to_value(info.status).unwrap(), "down");
    }
}
