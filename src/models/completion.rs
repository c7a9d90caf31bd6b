//! Scheduler-facing completion types and the annotation correlation token.
//!
//! The annotation is a serialization contract: it is embedded in the
//! submitted recipe as an opaque string, stored by the scheduler, and echoed
//! back byte-for-byte in the completion callback. If it cannot be decoded the
//! completion cannot be correlated to its originating request.

use serde::{Deserialize, Serialize};

use crate::error::BackendError;

/// Completion callback payload from the scheduler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletion {
    #[serde(default)]
    pub task_guid: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub failure_reason: String,
    /// Contents of the task's result file, present on success.
    #[serde(default)]
    pub result: String,
    /// Echo of the annotation submitted with the recipe.
    #[serde(default)]
    pub annotation: String,
    /// Task creation time, nanoseconds since the epoch (scheduler format).
    #[serde(default)]
    pub created_at: i64,
}

/// Correlation token embedded in every submitted recipe.
///
/// `lifecycle` disambiguates backends that share a scheduler domain; the
/// current backends use distinct domains, so decoding tolerates its absence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingTaskAnnotation {
    pub app_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<String>,
}

impl StagingTaskAnnotation {
    pub fn encode(&self) -> Result<String, BackendError> {
        serde_json::to_string(self).map_err(|e| BackendError::InvalidAnnotation(e.to_string()))
    }

    pub fn decode(raw: &str) -> Result<Self, BackendError> {
        serde_json::from_str(raw).map_err(|e| BackendError::InvalidAnnotation(e.to_string()))
    }
}
