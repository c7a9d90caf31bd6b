//! Docker-image staging backend.
//!
//! The smallest lifecycle: download the docker builder, run it against the
//! requested image reference. Resource limits pass through from the request
//! unfloored; the builder writes its result metadata to a fixed path the
//! scheduler fetches on completion.

use tracing::debug;

use crate::backend::{
    builder_download_url, staging_task_guid, staging_timeout, validate_identifiers, BackendConfig,
};
use crate::constants::{
    DOCKER_BUILDER_EXECUTABLE_PATH, DOCKER_BUILDER_OUTPUT_PATH, DOCKER_LIFECYCLE,
    DOCKER_TASK_DOMAIN, TASK_LOG_SOURCE,
};
use crate::error::BackendError;
use crate::models::{
    Action, ActionGraph, DockerStagingData, DockerStagingResult, ResourceLimits, StagingRequest,
    StagingResponse, StagingTaskAnnotation, Step, TaskCompletion, TaskRecipe,
};

#[derive(Debug)]
pub struct DockerBackend {
    config: BackendConfig,
}

impl DockerBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn task_domain(&self) -> &'static str {
        DOCKER_TASK_DOMAIN
    }

    pub fn build_recipe(&self, request: &StagingRequest) -> Result<TaskRecipe, BackendError> {
        let data = Self::lifecycle_data(request)?;
        let builder_url = builder_download_url(&self.config, DOCKER_LIFECYCLE)?;

        let builder_dir = DOCKER_BUILDER_EXECUTABLE_PATH
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or("/tmp");

        let steps = vec![
            Step::new(Action::Download {
                from: builder_url.to_string(),
                to: builder_dir.to_string(),
                cache_key: Some("builder-docker".to_string()),
                extract: false,
            })
            .with_progress("", "", "Failed to set up docker environment"),
            Step::new(Action::Run {
                path: DOCKER_BUILDER_EXECUTABLE_PATH.to_string(),
                args: vec![
                    "-outputMetadataJSONFilename".to_string(),
                    DOCKER_BUILDER_OUTPUT_PATH.to_string(),
                    "-dockerRef".to_string(),
                    data.docker_image_url.clone(),
                ],
                env: request.environment.clone(),
                resource_limits: ResourceLimits {
                    nofile: Some(request.file_descriptors),
                },
            })
            .with_progress("Staging...", "Staging Complete", "Staging Failed"),
        ];

        let annotation = StagingTaskAnnotation {
            app_id: request.app_id.clone(),
            task_id: request.task_id.clone(),
            lifecycle: Some(DOCKER_LIFECYCLE.to_string()),
        }
        .encode()?;

        let recipe = TaskRecipe {
            task_guid: staging_task_guid(&request.app_id, &request.task_id),
            domain: DOCKER_TASK_DOMAIN.to_string(),
            stack: request.stack.clone(),
            memory_mb: request.memory_mb,
            disk_mb: request.disk_mb,
            action: ActionGraph {
                steps,
                timeout_seconds: staging_timeout(request, self.config.default_staging_timeout_secs),
            },
            completion_callback_url: self.config.completion_callback_url.clone(),
            log_guid: request.app_id.clone(),
            log_source: TASK_LOG_SOURCE.to_string(),
            annotation,
            egress_rules: request.egress_rules.clone(),
            result_file: DOCKER_BUILDER_OUTPUT_PATH.to_string(),
            privileged: false,
        };

        debug!(task_guid = %recipe.task_guid, "built docker staging recipe");
        Ok(recipe)
    }

    pub fn build_staging_response(
        &self,
        completion: &TaskCompletion,
    ) -> Result<StagingResponse, BackendError> {
        let annotation = StagingTaskAnnotation::decode(&completion.annotation)?;

        let mut response = StagingResponse {
            app_id: annotation.app_id,
            task_id: annotation.task_id,
            ..Default::default()
        };

        if completion.failed {
            response.error = Some((self.config.sanitizer)(&completion.failure_reason));
        } else {
            let result: DockerStagingResult = serde_json::from_str(&completion.result)
                .map_err(|e| BackendError::InvalidResultPayload(e.to_string()))?;
            response.execution_metadata = Some(result.execution_metadata);
            response.detected_start_command = Some(result.detected_start_command);
        }

        Ok(response)
    }

    pub fn staging_response_from_request_error(
        &self,
        request: &StagingRequest,
        message: &str,
    ) -> StagingResponse {
        StagingResponse {
            app_id: request.app_id.clone(),
            task_id: request.task_id.clone(),
            error: Some((self.config.sanitizer)(message)),
            ..Default::default()
        }
    }

    fn lifecycle_data(request: &StagingRequest) -> Result<DockerStagingData, BackendError> {
        validate_identifiers(&request.app_id, &request.task_id)?;

        let raw = request
            .lifecycle_data
            .as_ref()
            .ok_or(BackendError::MissingLifecycleData)?;
        let data: DockerStagingData = serde_json::from_value(raw.clone())
            .map_err(|e| BackendError::InvalidLifecyclePayload(e.to_string()))?;

        if data.docker_image_url.is_empty() {
            return Err(BackendError::MissingDockerImageUrl);
        }
        Ok(data)
    }
}
