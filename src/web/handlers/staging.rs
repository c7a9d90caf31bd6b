//! # Staging Handlers
//!
//! `stage` turns a platform staging request into a scheduler task; `stop_staging`
//! asks the scheduler to cancel one. Neither keeps local state: the
//! correlation key and annotation carry everything needed to reconcile the
//! eventual completion callback.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, info};

use crate::error::SchedulerClientError;
use crate::models::{StagingRequest, StopStagingRequest};
use crate::web::response_types::ApiError;
use crate::web::state::AppState;

/// Stage an application: POST /v1/staging/:staging_guid
///
/// Responds 202 once the recipe is accepted by the scheduler. A recipe-build
/// or submission failure is relayed to the platform as a synthesized failure
/// response and answered locally with 500 plus the same payload, so both
/// consumers see one consistent error document.
pub async fn stage(
    State(state): State<AppState>,
    Path(staging_guid): Path<String>,
    body: Bytes,
) -> Response {
    let request: StagingRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(%staging_guid, error = %e, "malformed staging request");
            return ApiError::bad_request("malformed staging request").into_response();
        }
    };

    let Some(backend) = state.backends.for_lifecycle(&request.lifecycle) else {
        return ApiError::not_found(format!("unknown lifecycle '{}'", request.lifecycle))
            .into_response();
    };

    if request.app_id.is_empty() {
        return ApiError::bad_request("missing app id").into_response();
    }
    if request.task_id.is_empty() {
        return ApiError::bad_request("missing task id").into_response();
    }

    state.metrics.staging_request_received(backend.lifecycle());

    let recipe = match backend.build_recipe(&request) {
        Ok(recipe) => recipe,
        Err(e) => {
            error!(app_id = %request.app_id, task_id = %request.task_id, error = %e, "recipe building failed");
            let response = backend
                .staging_response_from_request_error(&request, &format!("Recipe building failed: {e}"));
            if let Err(relay_err) = state.platform.staging_complete(&response).await {
                error!(error = %relay_err, "failed to relay staging failure to platform");
            }
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };

    info!(
        task_guid = %recipe.task_guid,
        callback_url = %recipe.completion_callback_url,
        "submitting staging task"
    );

    match state.scheduler.create_task(&recipe).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        // A task already submitted under this correlation key counts as
        // accepted; resubmission is idempotent.
        Err(SchedulerClientError::TaskAlreadyExists) => StatusCode::ACCEPTED.into_response(),
        Err(e) => {
            error!(task_guid = %recipe.task_guid, error = %e, "staging task submission failed");
            let response = backend
                .staging_response_from_request_error(&request, &format!("Staging failed: {e}"));
            if let Err(relay_err) = state.platform.staging_complete(&response).await {
                error!(error = %relay_err, "failed to relay staging failure to platform");
            }
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

/// Cancel an in-flight staging task: DELETE /v1/staging/:staging_guid
///
/// Responds 202 as soon as the request is validated; the cancellation call
/// runs afterwards and its failure is only logged, since the response has
/// already been sent.
pub async fn stop_staging(
    State(state): State<AppState>,
    Path(staging_guid): Path<String>,
    body: Bytes,
) -> Response {
    let request: StopStagingRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            error!(%staging_guid, error = %e, "malformed stop staging request");
            return ApiError::bad_request("malformed stop staging request").into_response();
        }
    };

    let Some(backend) = state.backends.for_lifecycle(&request.lifecycle) else {
        error!(lifecycle = %request.lifecycle, "backend not found");
        return ApiError::not_found(format!("unknown lifecycle '{}'", request.lifecycle))
            .into_response();
    };

    let task_guid = match backend.staging_task_guid(&request) {
        Ok(guid) => guid,
        Err(e) => {
            error!(error = %e, "invalid stop staging request");
            return ApiError::bad_request(e.to_string()).into_response();
        }
    };

    state
        .metrics
        .stop_staging_request_received(backend.lifecycle());

    info!(%task_guid, "cancelling staging task");

    let scheduler = state.scheduler.clone();
    tokio::spawn(async move {
        if let Err(e) = scheduler.cancel_task(&task_guid).await {
            error!(%task_guid, error = %e, "stop staging failed");
        }
    });

    StatusCode::ACCEPTED.into_response()
}
