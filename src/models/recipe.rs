//! The task recipe submitted to the scheduler.
//!
//! An [`ActionGraph`] is a flat ordered sequence of steps under one overall
//! timeout. Best-effort execution is a per-step attribute: a step with
//! `best_effort` set reports its own failure message but does not abort the
//! steps after it. Progress strings ride along with each step so the
//! scheduler can emit them into the application's log stream verbatim.

use serde::{Deserialize, Serialize};

use crate::models::staging::EnvironmentVariable;

/// Kernel resource limits applied to a run step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// Open file descriptor limit; `None` leaves the scheduler default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nofile: Option<u64>,
}

/// A primitive step the scheduler knows how to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Download {
        from: String,
        to: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_key: Option<String>,
        #[serde(default)]
        extract: bool,
    },
    Run {
        path: String,
        args: Vec<String>,
        env: Vec<EnvironmentVariable>,
        #[serde(default)]
        resource_limits: ResourceLimits,
    },
    Upload {
        from: String,
        to: String,
        #[serde(default)]
        compress: bool,
    },
    FetchResult {
        file: String,
    },
}

/// Human-readable progress triple emitted around a step. Empty strings are
/// suppressed by the scheduler's log emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressMessages {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub success: String,
    #[serde(default)]
    pub failure: String,
}

/// One step of the action graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub action: Action,
    #[serde(default)]
    pub progress: ProgressMessages,
    /// Failure of this step does not abort the remaining sequence.
    #[serde(default)]
    pub best_effort: bool,
}

impl Step {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            progress: ProgressMessages::default(),
            best_effort: false,
        }
    }

    pub fn with_progress(
        mut self,
        start: impl Into<String>,
        success: impl Into<String>,
        failure: impl Into<String>,
    ) -> Self {
        self.progress = ProgressMessages {
            start: start.into(),
            success: success.into(),
            failure: failure.into(),
        };
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }
}

/// The ordered step sequence plus the single upper-bound timeout wrapping it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGraph {
    pub steps: Vec<Step>,
    pub timeout_seconds: u64,
}

/// The full task descriptor handed to the scheduler. The scheduler owns the
/// task's lifecycle from submission on; this process keeps no copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecipe {
    /// Correlation key: `app_id + "-" + task_id`.
    pub task_guid: String,
    pub domain: String,
    pub stack: String,
    pub memory_mb: u64,
    pub disk_mb: u64,
    pub action: ActionGraph,
    pub completion_callback_url: String,
    pub log_guid: String,
    pub log_source: String,
    /// Opaque correlation token echoed back unchanged in the completion.
    pub annotation: String,
    #[serde(default)]
    pub egress_rules: Vec<serde_json::Value>,
    pub result_file: String,
    pub privileged: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_builder_sets_progress_and_best_effort() {
        let step = Step::new(Action::FetchResult {
            file: "/tmp/result.json".into(),
        })
        .with_progress("", "", "Failed to Fetch Result")
        .best_effort();

        assert!(step.best_effort);
        assert_eq!(step.progress.failure, "Failed to Fetch Result");
        assert_eq!(step.progress.start, "");
    }

    #[test]
    fn action_serializes_with_type_tag() {
        let action = Action::Download {
            from: "https://files.example.com/builder".into(),
            to: "/tmp/lifecycle".into(),
            cache_key: Some("builder-docker".into()),
            extract: false,
        };
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(json["type"], "download");
        assert_eq!(json["cache_key"], "builder-docker");
    }
}
