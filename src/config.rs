//! Process configuration.
//!
//! Layered loading through the `config` crate: struct defaults, then an
//! optional TOML file named by `STAGER_CONFIG`, then `STAGER_`-prefixed
//! environment variables (double underscore as the nesting separator, e.g.
//! `STAGER_SCHEDULER_URL`, `STAGER_LIFECYCLES__DOCKER`).

use serde::Deserialize;
use std::collections::HashMap;

use crate::constants::DEFAULT_STAGING_TIMEOUT_SECS;
use crate::error::StagerError;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StagerConfig {
    /// Address the web surface binds to.
    pub listen_address: String,
    /// Base URL of the task-execution scheduler.
    pub scheduler_url: String,
    /// URL of the platform endpoint that receives staging responses.
    pub platform_callback_url: String,
    /// Optional basic-auth credentials for the platform callback endpoint.
    pub platform_username: Option<String>,
    pub platform_password: Option<String>,
    /// URL the scheduler calls back when a staging task completes; embedded
    /// into every submitted recipe.
    pub staging_completion_callback_url: String,
    /// Base URL of the static file server hosting builder artifacts.
    pub file_server_url: String,
    /// Lifecycle name -> builder artifact reference (absolute http/https URL
    /// or a schemeless static asset name).
    pub lifecycles: HashMap<String, String>,
    /// Applied when a request's timeout is non-positive.
    pub default_staging_timeout_secs: u64,
    /// Resource floors for the buildpack backend.
    pub min_memory_mb: u64,
    pub min_disk_mb: u64,
    pub min_file_descriptors: u64,
    /// Outbound HTTP client timeout.
    pub client_timeout_ms: u64,
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8888".to_string(),
            scheduler_url: "http://localhost:8889".to_string(),
            platform_callback_url: "http://localhost:9022/internal/staging/completed".to_string(),
            platform_username: None,
            platform_password: None,
            staging_completion_callback_url: "http://localhost:8888/v1/staging".to_string(),
            file_server_url: "http://localhost:8080".to_string(),
            lifecycles: HashMap::new(),
            default_staging_timeout_secs: DEFAULT_STAGING_TIMEOUT_SECS,
            min_memory_mb: 1024,
            min_disk_mb: 3072,
            min_file_descriptors: 0,
            client_timeout_ms: 30_000,
        }
    }
}

impl StagerConfig {
    /// Load configuration from defaults, optional file, and environment.
    pub fn load() -> Result<Self, StagerError> {
        let mut builder = config::Config::builder();

        if let Ok(path) = std::env::var("STAGER_CONFIG") {
            builder = builder.add_source(config::File::with_name(&path));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("STAGER")
                .separator("__")
                .try_parsing(true),
        );

        builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| StagerError::Configuration(e.to_string()))
    }
}
