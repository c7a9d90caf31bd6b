//! # System Constants
//!
//! Fixed values shared by the lifecycle backends and the web surface:
//! scheduler task domains, builder artifact locations inside the staging
//! container, and defaults applied when a request leaves a knob unset.

/// Scheduler task domain for buildpack-based staging tasks.
pub const BUILDPACK_TASK_DOMAIN: &str = "app-buildpack-staging";

/// Scheduler task domain for docker-image-based staging tasks.
pub const DOCKER_TASK_DOMAIN: &str = "app-docker-staging";

/// Lifecycle names as they appear in inbound requests.
pub const BUILDPACK_LIFECYCLE: &str = "buildpack";
pub const DOCKER_LIFECYCLE: &str = "docker";

/// Log source attached to every staging task's log stream.
pub const TASK_LOG_SOURCE: &str = "STG";

/// Where the docker builder executable lands inside the container.
pub const DOCKER_BUILDER_EXECUTABLE_PATH: &str = "/tmp/docker_app_lifecycle/builder";

/// Where the docker builder writes its result metadata.
pub const DOCKER_BUILDER_OUTPUT_PATH: &str = "/tmp/docker-result/result.json";

/// Where the buildpack builder payload is unpacked inside the container.
pub const BUILDPACK_BUILDER_DIR: &str = "/tmp/lifecycle";

/// Builder working directories for buildpack staging.
pub const BUILDPACK_APP_DIR: &str = "/tmp/app";
pub const BUILDPACK_OUTPUT_DROPLET_DIR: &str = "/tmp/droplet";
pub const BUILDPACK_BUILD_ARTIFACTS_CACHE_DIR: &str = "/tmp/cache";
pub const BUILDPACK_DIR: &str = "/tmp/buildpacks";

/// Where the buildpack builder writes its result metadata.
pub const BUILDPACK_BUILDER_OUTPUT_PATH: &str = "/tmp/result.json";

/// Route prefix the file server exposes static assets under; schemeless
/// builder references are joined against the file-server URL plus this.
pub const FILE_SERVER_STATIC_ROUTE: &str = "/v1/static";

/// Applied when a staging request carries a non-positive timeout.
pub const DEFAULT_STAGING_TIMEOUT_SECS: u64 = 900;
