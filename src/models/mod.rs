//! Domain records shared by the store backends, services and HTTP handlers.
//!
//! These types are backend-neutral: the sea-orm entities in [`crate::entities`]
//! convert into them, and the in-memory store keeps them directly.

pub mod batch_job;
pub mod model_status;
pub mod model_type;
pub mod prediction;

pub use batch_job::{BatchJob, BatchJobStatus, BatchJobUpdate, BatchRowResult, NewBatchJob};
pub use model_status::{ModelStatus, ModelStatusUpsert, TrainingStatus, DEFAULT_MODEL_VERSION};
pub use model_type::ModelType;
pub use prediction::{ModelPrediction, NewModelPrediction};
