// CSV ingestion and per-row scoring
pub mod data_processor;

// Request-facing services
pub mod batch;
pub mod model_status;
pub mod predictions;
pub mod training;

// Start-up repair of interrupted work
pub mod recovery;

// Service factory for dependency injection
pub mod factory;

pub use factory::{AppServices, ServiceFactory};
