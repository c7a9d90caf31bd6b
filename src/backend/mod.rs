//! # Lifecycle Backends
//!
//! A backend translates one staging request into one scheduler task recipe,
//! and one scheduler completion back into one platform staging response. The
//! variant set is small and closed, so dispatch is an enum rather than an
//! open registration surface: [`LifecycleBackend`] matches on the variant and
//! delegates to the concrete backend.
//!
//! Shared policy lives here: correlation-key derivation, builder artifact URL
//! resolution, and timeout defaulting.

pub mod buildpack;
pub mod docker;

pub use buildpack::BuildpackBackend;
pub use docker::DockerBackend;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;
use url::Url;

use crate::constants::{BUILDPACK_LIFECYCLE, DOCKER_LIFECYCLE, FILE_SERVER_STATIC_ROUTE};
use crate::error::BackendError;
use crate::models::{StagingRequest, StagingResponse, StopStagingRequest, TaskCompletion, TaskRecipe};

/// Redaction applied to every failure message destined for the platform.
pub type Sanitizer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Passthrough sanitizer; deployments install their own redaction.
pub fn identity_sanitizer() -> Sanitizer {
    Arc::new(|message: &str| message.to_string())
}

/// Configuration shared by all backends.
#[derive(Clone)]
pub struct BackendConfig {
    /// Lifecycle name -> builder artifact reference.
    pub lifecycles: HashMap<String, String>,
    /// Base URL for schemeless builder references.
    pub file_server_url: String,
    /// Callback URL embedded in every recipe.
    pub completion_callback_url: String,
    pub default_staging_timeout_secs: u64,
    pub min_memory_mb: u64,
    pub min_disk_mb: u64,
    pub min_file_descriptors: u64,
    pub sanitizer: Sanitizer,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("lifecycles", &self.lifecycles)
            .field("file_server_url", &self.file_server_url)
            .field("completion_callback_url", &self.completion_callback_url)
            .field(
                "default_staging_timeout_secs",
                &self.default_staging_timeout_secs,
            )
            .field("min_memory_mb", &self.min_memory_mb)
            .field("min_disk_mb", &self.min_disk_mb)
            .field("min_file_descriptors", &self.min_file_descriptors)
            .finish_non_exhaustive()
    }
}

/// Correlation key for a staging task. Deterministic and collision-free for
/// distinct (app_id, task_id) pairs as long as app ids never contain the
/// separator ambiguity both ways, which the platform guarantees.
pub fn staging_task_guid(app_id: &str, task_id: &str) -> String {
    format!("{app_id}-{task_id}")
}

pub(crate) fn validate_identifiers(app_id: &str, task_id: &str) -> Result<(), BackendError> {
    if app_id.is_empty() {
        return Err(BackendError::MissingAppId);
    }
    if task_id.is_empty() {
        return Err(BackendError::MissingTaskId);
    }
    Ok(())
}

/// Resolve the builder artifact download URL for a lifecycle.
///
/// Absolute http/https references pass through unchanged. Schemeless
/// references are static asset names, joined against the file-server URL and
/// its static route. Anything else is a configuration error.
pub(crate) fn builder_download_url(
    config: &BackendConfig,
    lifecycle: &str,
) -> Result<Url, BackendError> {
    let reference = config
        .lifecycles
        .get(lifecycle)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| BackendError::NoBuilderDefined(lifecycle.to_string()))?;

    match Url::parse(reference) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(url),
        Ok(url) => Err(BackendError::UnknownScheme(url.scheme().to_string())),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let joined = format!(
                "{}{}/{}",
                config.file_server_url.trim_end_matches('/'),
                FILE_SERVER_STATIC_ROUTE,
                reference
            );
            Url::parse(&joined).map_err(|e| BackendError::InvalidUrl(e.to_string()))
        }
        Err(e) => Err(BackendError::InvalidUrl(e.to_string())),
    }
}

/// The request's timeout when positive, the configured default otherwise.
pub(crate) fn staging_timeout(request: &StagingRequest, default_secs: u64) -> u64 {
    if request.timeout > 0 {
        request.timeout as u64
    } else {
        info!(
            requested_timeout = request.timeout,
            default_timeout = default_secs,
            app_id = %request.app_id,
            task_id = %request.task_id,
            "overriding requested timeout"
        );
        default_secs
    }
}

/// Closed set of lifecycle backends.
#[derive(Debug)]
pub enum LifecycleBackend {
    Buildpack(BuildpackBackend),
    Docker(DockerBackend),
}

impl LifecycleBackend {
    /// Translate a staging request into a scheduler task recipe.
    pub fn build_recipe(&self, request: &StagingRequest) -> Result<TaskRecipe, BackendError> {
        match self {
            Self::Buildpack(b) => b.build_recipe(request),
            Self::Docker(b) => b.build_recipe(request),
        }
    }

    /// Translate a scheduler completion into a platform staging response.
    pub fn build_staging_response(
        &self,
        completion: &TaskCompletion,
    ) -> Result<StagingResponse, BackendError> {
        match self {
            Self::Buildpack(b) => b.build_staging_response(completion),
            Self::Docker(b) => b.build_staging_response(completion),
        }
    }

    /// Synthesize a failure response for a request that never became a task.
    pub fn staging_response_from_request_error(
        &self,
        request: &StagingRequest,
        message: &str,
    ) -> StagingResponse {
        match self {
            Self::Buildpack(b) => b.staging_response_from_request_error(request, message),
            Self::Docker(b) => b.staging_response_from_request_error(request, message),
        }
    }

    /// Re-derive the correlation key for a stop request.
    pub fn staging_task_guid(&self, request: &StopStagingRequest) -> Result<String, BackendError> {
        validate_identifiers(&request.app_id, &request.task_id)?;
        Ok(staging_task_guid(&request.app_id, &request.task_id))
    }

    /// Scheduler domain this backend's tasks are submitted under.
    pub fn task_domain(&self) -> &'static str {
        match self {
            Self::Buildpack(b) => b.task_domain(),
            Self::Docker(b) => b.task_domain(),
        }
    }

    pub fn lifecycle(&self) -> &'static str {
        match self {
            Self::Buildpack(_) => BUILDPACK_LIFECYCLE,
            Self::Docker(_) => DOCKER_LIFECYCLE,
        }
    }
}

/// Lookup table over the closed backend set. Exactly one backend per
/// lifecycle and per domain; a failed lookup is the caller's 404.
#[derive(Debug)]
pub struct BackendRegistry {
    backends: HashMap<&'static str, LifecycleBackend>,
}

impl BackendRegistry {
    pub fn new(config: BackendConfig) -> Self {
        let mut backends = HashMap::new();
        backends.insert(
            BUILDPACK_LIFECYCLE,
            LifecycleBackend::Buildpack(BuildpackBackend::new(config.clone())),
        );
        backends.insert(
            DOCKER_LIFECYCLE,
            LifecycleBackend::Docker(DockerBackend::new(config)),
        );
        Self { backends }
    }

    pub fn for_lifecycle(&self, lifecycle: &str) -> Option<&LifecycleBackend> {
        self.backends.get(lifecycle)
    }

    pub fn for_domain(&self, domain: &str) -> Option<&LifecycleBackend> {
        self.backends.values().find(|b| b.task_domain() == domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LifecycleBackend> {
        self.backends.values()
    }
}
