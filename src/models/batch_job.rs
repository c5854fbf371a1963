use super::ModelType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

/// Lifecycle of a batch upload: `queued -> processing -> completed | failed`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BatchJobStatus {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl BatchJobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether a job may move from `self` to `next`.
    ///
    /// A queued job may fail without ever starting (e.g. interrupted by a restart).
    pub fn can_transition_to(self, next: BatchJobStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Processing)
                | (Self::Queued, Self::Failed)
                | (Self::Processing, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }
}

/// Outcome of one CSV row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchRowResult {
    Success {
        #[schema(value_type = Object)]
        input: Value,
        #[schema(value_type = Object)]
        prediction: Value,
    },
    Error {
        /// The raw row as parsed from the CSV
        #[schema(value_type = Object)]
        input: Value,
        error: String,
    },
}

impl BatchRowResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchJob {
    pub id: i32,
    pub filename: String,
    pub model_type: ModelType,
    pub status: BatchJobStatus,
    pub total_rows: i32,
    pub processed_rows: i32,
    pub results: Option<Vec<BatchRowResult>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert payload for a new job. Jobs always start `queued` with no processed rows.
#[derive(Debug, Clone)]
pub struct NewBatchJob {
    pub filename: String,
    pub model_type: ModelType,
    pub total_rows: i32,
}

/// Partial update applied in place; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchJobUpdate {
    pub status: Option<BatchJobStatus>,
    pub processed_rows: Option<i32>,
    pub results: Option<Vec<BatchRowResult>>,
    pub error_message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BatchJobUpdate {
    pub fn status(status: BatchJobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn progress(processed_rows: i32) -> Self {
        Self {
            processed_rows: Some(processed_rows),
            ..Default::default()
        }
    }

    pub fn completed(results: Vec<BatchRowResult>, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(BatchJobStatus::Completed),
            processed_rows: Some(results.len() as i32),
            results: Some(results),
            error_message: None,
            completed_at: Some(at),
        }
    }

    pub fn failed(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            status: Some(BatchJobStatus::Failed),
            error_message: Some(message.into()),
            completed_at: Some(at),
            ..Default::default()
        }
    }

    /// Applies the update to an existing record.
    pub fn apply_to(self, job: &mut BatchJob) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(processed_rows) = self.processed_rows {
            job.processed_rows = processed_rows;
        }
        if let Some(results) = self.results {
            job.results = Some(results);
        }
        if let Some(message) = self.error_message {
            job.error_message = Some(message);
        }
        if let Some(completed_at) = self.completed_at {
            job.completed_at = Some(completed_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn terminal_states_never_transition() {
        for next in [
            BatchJobStatus::Queued,
            BatchJobStatus::Processing,
            BatchJobStatus::Completed,
            BatchJobStatus::Failed,
        ] {
            assert!(!BatchJobStatus::Completed.can_transition_to(next));
            assert!(!BatchJobStatus::Failed.can_transition_to(next));
        }
    }

    #[test]
    fn queued_cannot_complete_without_processing() {
        assert!(BatchJobStatus::Queued.can_transition_to(BatchJobStatus::Processing));
        assert!(!BatchJobStatus::Queued.can_transition_to(BatchJobStatus::Completed));
        assert!(BatchJobStatus::Processing.can_transition_to(BatchJobStatus::Completed));
    }

    #[test]
    fn row_results_are_tagged_by_status() {
        let ok = BatchRowResult::Success {
            input: json!({"a": 1}),
            prediction: json!({"b": 2}),
        };
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["prediction"]["b"], 2);

        let err = BatchRowResult::Error {
            input: json!({"a": "x"}),
            error: "bad row".into(),
        };
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "bad row");
    }

    #[test]
    fn completed_update_counts_results() {
        let now = Utc::now();
        let mut job = BatchJob {
            id: 1,
            filename: "rows.csv".into(),
            model_type: ModelType::Esg,
            status: BatchJobStatus::Processing,
            total_rows: 2,
            processed_rows: 0,
            results: None,
            error_message: None,
            created_at: now,
            completed_at: None,
        };
        let results = vec![
            BatchRowResult::Error {
                input: json!({}),
                error: "x".into(),
            };
            2
        ];
        BatchJobUpdate::completed(results, now).apply_to(&mut job);
        assert_eq!(job.status, BatchJobStatus::Completed);
        assert_eq!(job.processed_rows, 2);
        assert_eq!(job.completed_at, Some(now));
        assert_eq!(job.results.as_ref().map(Vec::len), Some(2));
    }
}
