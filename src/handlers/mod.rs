pub mod batch;
pub mod models;
pub mod predictions;

use crate::errors::ServiceError;
use serde::de::DeserializeOwned;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Decodes a JSON request body. Malformed JSON and shape mismatches are
/// both reported as 400.
pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServiceError> {
    serde_json::from_slice(body)
        .map_err(|e| ServiceError::BadRequest(format!("Invalid JSON body: {}", e)))
}
