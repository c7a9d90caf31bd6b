//! Error types for the staging bridge.
//!
//! Three boundary-specific enums plus an umbrella: `BackendError` covers
//! recipe building and response synthesis, `SchedulerClientError` covers task
//! submission and cancellation, `PlatformClientError` covers the callback
//! relay. HTTP status mapping lives with the web layer, not here.

use thiserror::Error;

/// Errors produced while translating requests and completions.
///
/// Validation variants map to 400 at the web layer; configuration variants
/// (builder reference problems) surface as synthesized failure responses.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("missing app id")]
    MissingAppId,
    #[error("missing task id")]
    MissingTaskId,
    #[error("missing docker image download url")]
    MissingDockerImageUrl,
    #[error("missing app bits download uri")]
    MissingAppBitsDownloadUri,
    #[error("missing droplet upload uri")]
    MissingDropletUploadUri,
    #[error("missing lifecycle data")]
    MissingLifecycleData,
    #[error("invalid lifecycle payload: {0}")]
    InvalidLifecyclePayload(String),
    #[error("no builder defined for lifecycle '{0}'")]
    NoBuilderDefined(String),
    #[error("unknown scheme: '{0}'")]
    UnknownScheme(String),
    #[error("invalid builder url: {0}")]
    InvalidUrl(String),
    #[error("invalid task annotation: {0}")]
    InvalidAnnotation(String),
    #[error("invalid staging result payload: {0}")]
    InvalidResultPayload(String),
}

/// Errors from the scheduler client.
///
/// `TaskAlreadyExists` is absorbed by the staging handler: resubmission under
/// the same correlation key is treated as an accepted request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedulerClientError {
    #[error("task already exists")]
    TaskAlreadyExists,
    #[error("scheduler rejected request: status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("scheduler unreachable: {0}")]
    Transport(String),
}

/// Errors from the platform callback client.
///
/// `BadResponse` carries the upstream status so the completion handler can
/// forward it verbatim; everything else becomes 503.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlatformClientError {
    #[error("platform returned bad response: status {status}")]
    BadResponse { status: u16 },
    #[error("platform unreachable: {0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StagerError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerClientError),
    #[error(transparent)]
    Platform(#[from] PlatformClientError),
    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, StagerError>;
