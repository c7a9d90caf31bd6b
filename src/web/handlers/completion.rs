//! # Completion Handler
//!
//! Receives the scheduler's completion callback, resolves the originating
//! backend from the task's domain, synthesizes the platform-facing response,
//! relays it, and records outcome metrics. Single pass, no retries: a failed
//! relay answers the scheduler with the upstream status (or 503) and the
//! scheduler redelivers on its own schedule.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, info};

use crate::error::PlatformClientError;
use crate::models::TaskCompletion;
use crate::web::response_types::ApiError;
use crate::web::state::AppState;

/// Completion callback: POST /v1/staging/:staging_guid/completed
pub async fn staging_complete(
    State(state): State<AppState>,
    Path(staging_guid): Path<String>,
    body: Bytes,
) -> Response {
    let completion: TaskCompletion = match serde_json::from_slice(&body) {
        Ok(completion) => completion,
        Err(e) => {
            error!(%staging_guid, error = %e, "malformed task completion");
            return ApiError::bad_request("malformed task completion").into_response();
        }
    };

    let Some(backend) = state.backends.for_domain(&completion.domain) else {
        return ApiError::not_found("Unknown task domain").into_response();
    };

    let response = match backend.build_staging_response(&completion) {
        Ok(response) => response,
        Err(e) => {
            error!(task_guid = %completion.task_guid, error = %e, "building staging response failed");
            return ApiError::bad_request(e.to_string()).into_response();
        }
    };

    info!(
        task_guid = %completion.task_guid,
        app_id = %response.app_id,
        failed = completion.failed,
        "posting staging complete"
    );

    match state.platform.staging_complete(&response).await {
        Ok(()) => {
            state
                .metrics
                .staging_completed(completion.failed, completion.created_at, state.clock.now());
            StatusCode::OK.into_response()
        }
        Err(PlatformClientError::BadResponse { status }) => {
            error!(task_guid = %completion.task_guid, status, "platform rejected staging response");
            ApiError::Upstream(status).into_response()
        }
        Err(e) => {
            error!(task_guid = %completion.task_guid, error = %e, "relaying staging response failed");
            ApiError::ServiceUnavailable.into_response()
        }
    }
}
