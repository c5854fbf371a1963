//! sea-orm entities backing [`crate::store::DatabaseStore`].

pub mod batch_job;
pub mod model_prediction;
pub mod model_status;
