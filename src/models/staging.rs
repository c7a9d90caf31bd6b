//! Platform-facing wire types: the staging request the platform sends us, the
//! lifecycle-specific payloads nested inside it, and the staging response we
//! relay back once the scheduler reports completion.
//!
//! Required identifiers deserialize with defaults (missing field == empty
//! string) so the handlers own the presence checks and can answer 400 with a
//! consistent body instead of a serde error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One ordered name/value pair of the staging environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentVariable {
    pub name: String,
    pub value: String,
}

/// Inbound request to stage an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagingRequest {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub lifecycle: String,
    /// Lifecycle-specific payload; shape depends on `lifecycle` and is decoded
    /// by the matching backend.
    #[serde(default)]
    pub lifecycle_data: Option<serde_json::Value>,
    #[serde(default)]
    pub stack: String,
    #[serde(default)]
    pub memory_mb: u64,
    #[serde(default)]
    pub disk_mb: u64,
    #[serde(default)]
    pub file_descriptors: u64,
    #[serde(default)]
    pub environment: Vec<EnvironmentVariable>,
    /// Copied through to the recipe unchanged; this process never interprets
    /// egress rules.
    #[serde(default)]
    pub egress_rules: Vec<serde_json::Value>,
    /// Overall staging timeout in seconds; non-positive means "use default".
    #[serde(default)]
    pub timeout: i64,
}

/// Inbound request to cancel an in-flight staging task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopStagingRequest {
    #[serde(default)]
    pub app_id: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub lifecycle: String,
}

/// Lifecycle payload for docker staging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerStagingData {
    #[serde(default)]
    pub docker_image_url: String,
}

/// One buildpack entry in the buildpack lifecycle payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildpack {
    pub name: String,
    pub key: String,
    pub url: String,
}

/// Lifecycle payload for buildpack staging. Upload/download URIs for the
/// droplet and artifacts cache are supplied by the platform; the cache URIs
/// are optional and their steps are skipped when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackStagingData {
    #[serde(default)]
    pub app_bits_download_uri: String,
    #[serde(default)]
    pub droplet_upload_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_artifacts_cache_download_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_artifacts_cache_upload_uri: Option<String>,
    #[serde(default)]
    pub buildpacks: Vec<Buildpack>,
}

/// Result payload the docker builder leaves in the task's result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockerStagingResult {
    #[serde(default)]
    pub execution_metadata: String,
    #[serde(default)]
    pub detected_start_command: HashMap<String, String>,
}

/// Result payload the buildpack builder leaves in the task's result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackStagingResult {
    #[serde(default)]
    pub buildpack_key: String,
    #[serde(default)]
    pub detected_buildpack: String,
    #[serde(default)]
    pub execution_metadata: String,
    #[serde(default)]
    pub detected_start_command: HashMap<String, String>,
}

/// Outcome relayed to the platform callback endpoint. Exactly one of the
/// success fields or `error` is populated; unset fields stay off the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagingResponse {
    pub app_id: String,
    pub task_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_metadata: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_start_command: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_buildpack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildpack_key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_request_tolerates_missing_identifiers() {
        let request: StagingRequest =
            serde_json::from_str(r#"{"lifecycle":"docker"}"#).expect("parse");
        assert_eq!(request.app_id, "");
        assert_eq!(request.task_id, "");
        assert_eq!(request.lifecycle, "docker");
        assert!(request.lifecycle_data.is_none());
        assert_eq!(request.timeout, 0);
    }

    #[test]
    fn staging_response_omits_unset_fields() {
        let response = StagingResponse {
            app_id: "bunny".into(),
            task_id: "hop".into(),
            error: Some("boom".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({"app_id": "bunny", "task_id": "hop", "error": "boom"})
        );
    }
}
