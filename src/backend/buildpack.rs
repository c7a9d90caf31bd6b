//! Buildpack staging backend.
//!
//! The richer lifecycle: stage an application from source with an ordered set
//! of buildpacks. The action graph downloads the builder, the app package,
//! each buildpack, and (best effort) the previous build artifacts cache, runs
//! the builder, uploads the droplet, uploads the cache (best effort again),
//! and fetches the result file. Memory, disk, and file descriptors are
//! floored against configured minimums.

use tracing::debug;

use crate::backend::{
    builder_download_url, staging_task_guid, staging_timeout, validate_identifiers, BackendConfig,
};
use crate::constants::{
    BUILDPACK_APP_DIR, BUILDPACK_BUILDER_DIR, BUILDPACK_BUILDER_OUTPUT_PATH,
    BUILDPACK_BUILD_ARTIFACTS_CACHE_DIR, BUILDPACK_DIR, BUILDPACK_LIFECYCLE,
    BUILDPACK_OUTPUT_DROPLET_DIR, BUILDPACK_TASK_DOMAIN, TASK_LOG_SOURCE,
};
use crate::error::BackendError;
use crate::models::{
    Action, ActionGraph, BuildpackStagingData, BuildpackStagingResult, ResourceLimits,
    StagingRequest, StagingResponse, StagingTaskAnnotation, Step, TaskCompletion, TaskRecipe,
};

#[derive(Debug)]
pub struct BuildpackBackend {
    config: BackendConfig,
}

impl BuildpackBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn task_domain(&self) -> &'static str {
        BUILDPACK_TASK_DOMAIN
    }

    pub fn build_recipe(&self, request: &StagingRequest) -> Result<TaskRecipe, BackendError> {
        let data = Self::lifecycle_data(request)?;
        let builder_url = builder_download_url(&self.config, BUILDPACK_LIFECYCLE)?;

        let mut steps = vec![
            Step::new(Action::Download {
                from: builder_url.to_string(),
                to: BUILDPACK_BUILDER_DIR.to_string(),
                cache_key: Some(format!("builder-{}", request.stack)),
                extract: true,
            })
            .with_progress("", "", "Failed to Download Builder"),
            Step::new(Action::Download {
                from: data.app_bits_download_uri.clone(),
                to: BUILDPACK_APP_DIR.to_string(),
                cache_key: None,
                extract: true,
            })
            .with_progress(
                "Downloading App Package",
                "Downloaded App Package",
                "Failed to Download App Package",
            ),
        ];

        for buildpack in &data.buildpacks {
            steps.push(
                Step::new(Action::Download {
                    from: buildpack.url.clone(),
                    to: format!("{BUILDPACK_DIR}/{}", buildpack.key),
                    cache_key: Some(buildpack.key.clone()),
                    extract: true,
                })
                .with_progress(
                    format!("Downloading Buildpack: {}", buildpack.name),
                    format!("Downloaded Buildpack: {}", buildpack.name),
                    format!("Failed to Download Buildpack: {}", buildpack.name),
                ),
            );
        }

        if let Some(cache_uri) = &data.build_artifacts_cache_download_uri {
            steps.push(
                Step::new(Action::Download {
                    from: cache_uri.clone(),
                    to: BUILDPACK_BUILD_ARTIFACTS_CACHE_DIR.to_string(),
                    cache_key: None,
                    extract: true,
                })
                .with_progress(
                    "Downloading Build Artifacts Cache",
                    "Downloaded Build Artifacts Cache",
                    "No Build Artifacts Cache Found.  Proceeding...",
                )
                .best_effort(),
            );
        }

        let buildpack_order: Vec<String> =
            data.buildpacks.iter().map(|b| b.key.clone()).collect();

        steps.push(
            Step::new(Action::Run {
                path: format!("{BUILDPACK_BUILDER_DIR}/builder"),
                args: vec![
                    "-appDir".to_string(),
                    BUILDPACK_APP_DIR.to_string(),
                    "-buildpacksDir".to_string(),
                    BUILDPACK_DIR.to_string(),
                    "-buildArtifactsCacheDir".to_string(),
                    BUILDPACK_BUILD_ARTIFACTS_CACHE_DIR.to_string(),
                    "-outputDropletDir".to_string(),
                    BUILDPACK_OUTPUT_DROPLET_DIR.to_string(),
                    "-outputMetadataJSONFilename".to_string(),
                    BUILDPACK_BUILDER_OUTPUT_PATH.to_string(),
                    "-buildpackOrder".to_string(),
                    buildpack_order.join(","),
                ],
                env: request.environment.clone(),
                resource_limits: ResourceLimits {
                    nofile: self.file_descriptor_limit(request),
                },
            })
            .with_progress("Staging...", "Staging Complete", "Staging Failed"),
        );

        steps.push(
            // The trailing slash uploads the directory contents, not the
            // directory itself.
            Step::new(Action::Upload {
                from: format!("{BUILDPACK_OUTPUT_DROPLET_DIR}/"),
                to: data.droplet_upload_uri.clone(),
                compress: false,
            })
            .with_progress("Uploading Droplet", "Droplet Uploaded", "Failed to Upload Droplet"),
        );

        if let Some(cache_uri) = &data.build_artifacts_cache_upload_uri {
            steps.push(
                Step::new(Action::Upload {
                    from: format!("{BUILDPACK_BUILD_ARTIFACTS_CACHE_DIR}/"),
                    to: cache_uri.clone(),
                    compress: true,
                })
                .with_progress(
                    "Uploading Build Artifacts Cache",
                    "Uploaded Build Artifacts Cache",
                    "Failed to Upload Build Artifacts Cache.  Proceeding...",
                )
                .best_effort(),
            );
        }

        steps.push(
            Step::new(Action::FetchResult {
                file: BUILDPACK_BUILDER_OUTPUT_PATH.to_string(),
            })
            .with_progress("", "", "Failed to Fetch Detected Buildpack"),
        );

        let annotation = StagingTaskAnnotation {
            app_id: request.app_id.clone(),
            task_id: request.task_id.clone(),
            lifecycle: Some(BUILDPACK_LIFECYCLE.to_string()),
        }
        .encode()?;

        let recipe = TaskRecipe {
            task_guid: staging_task_guid(&request.app_id, &request.task_id),
            domain: BUILDPACK_TASK_DOMAIN.to_string(),
            stack: request.stack.clone(),
            memory_mb: request.memory_mb.max(self.config.min_memory_mb),
            disk_mb: request.disk_mb.max(self.config.min_disk_mb),
            action: ActionGraph {
                steps,
                timeout_seconds: staging_timeout(request, self.config.default_staging_timeout_secs),
            },
            completion_callback_url: self.config.completion_callback_url.clone(),
            log_guid: request.app_id.clone(),
            log_source: TASK_LOG_SOURCE.to_string(),
            annotation,
            egress_rules: request.egress_rules.clone(),
            result_file: BUILDPACK_BUILDER_OUTPUT_PATH.to_string(),
            privileged: false,
        };

        debug!(task_guid = %recipe.task_guid, steps = recipe.action.steps.len(), "built buildpack staging recipe");
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
            let result: BuildpackStagingResult = serde_json::from_str(&completion.result)
                .map_err(|e| BackendError::InvalidResultPayload(e.to_string()))?;
            response.buildpack_key = Some(result.buildpack_key);
            response.detected_buildpack = Some(result.detected_buildpack);
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

    /// Zero means the request left the limit unset; otherwise floor it.
    fn file_descriptor_limit(&self, request: &StagingRequest) -> Option<u64> {
        if request.file_descriptors == 0 {
            None
        } else {
            Some(request.file_descriptors.max(self.config.min_file_descriptors))
        }
    }

    fn lifecycle_data(request: &StagingRequest) -> Result<BuildpackStagingData, BackendError> {
        validate_identifiers(&request.app_id, &request.task_id)?;

        let raw = request
            .lifecycle_data
            .as_ref()
            .ok_or(BackendError::MissingLifecycleData)?;
        let data: BuildpackStagingData = serde_json::from_value(raw.clone())
            .map_err(|e| BackendError::InvalidLifecyclePayload(e.to_string()))?;

        if data.app_bits_download_uri.is_empty() {
            return Err(BackendError::MissingAppBitsDownloadUri);
        }
        if data.droplet_upload_uri.is_empty() {
            return Err(BackendError::MissingDropletUploadUri);
        }
        Ok(data)
    }
}
