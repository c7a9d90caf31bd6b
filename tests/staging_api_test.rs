//! End-to-end staging and stop-staging behavior through the router, against
//! in-memory fake scheduler and platform clients.

mod common;

use axum::http::StatusCode;
use chrono::Utc;

use common::{eventually, harness, send_json, send_raw};
use stager::error::SchedulerClientError;
use stager::models::{Action, StagingTaskAnnotation};

fn docker_request() -> serde_json::Value {
    serde_json::json!({
        "app_id": "bunny",
        "task_id": "hop",
        "lifecycle": "docker",
        "lifecycle_data": {"docker_image_url": "busybox"},
        "stack": "lucid64",
        "memory_mb": 1024,
        "disk_mb": 2048,
        "file_descriptors": 512,
        "environment": [{"name": "FOO", "value": "bar"}],
        "timeout": 900
    })
}

#[tokio::test]
async fn staging_a_docker_app_submits_a_two_step_recipe() {
    let h = harness(Utc::now());

    let (status, _) = send_json(&h.app, "POST", "/v1/staging/bunny-hop", docker_request()).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let created = h.scheduler.created.lock();
    assert_eq!(created.len(), 1);
    let recipe = &created[0];

    assert_eq!(recipe.task_guid, "bunny-hop");
    assert_eq!(recipe.domain, "app-docker-staging");
    assert_eq!(recipe.action.timeout_seconds, 900);
    assert_eq!(recipe.action.steps.len(), 2);
    assert!(matches!(recipe.action.steps[0].action, Action::Download { .. }));
    match &recipe.action.steps[1].action {
        Action::Run { args, .. } => assert!(args.contains(&"busybox".to_string())),
        other => panic!("expected run step, got {other:?}"),
    }

    let annotation = StagingTaskAnnotation::decode(&recipe.annotation).expect("annotation");
    assert_eq!(annotation.app_id, "bunny");
    assert_eq!(annotation.task_id, "hop");

    assert_eq!(h.metrics.counter("docker_staging_requests_received"), 1);
}

#[tokio::test]
async fn resubmitting_the_same_request_is_accepted_both_times() {
    let h = harness(Utc::now());

    let (first, _) = send_json(&h.app, "POST", "/v1/staging/bunny-hop", docker_request()).await;
    let (second, _) = send_json(&h.app, "POST", "/v1/staging/bunny-hop", docker_request()).await;

    assert_eq!(first, StatusCode::ACCEPTED);
    // The scheduler reported "already exists" the second time; absorbed.
    assert_eq!(second, StatusCode::ACCEPTED);
    assert_eq!(h.scheduler.created_guids(), vec!["bunny-hop".to_string()]);
    assert!(h.platform.delivered.lock().is_empty());
}

#[tokio::test]
async fn missing_task_id_is_rejected_without_a_submission() {
    let h = harness(Utc::now());

    let mut body = docker_request();
    body.as_object_mut().unwrap().remove("task_id");

    let (status, _) = send_json(&h.app, "POST", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.scheduler.created.lock().is_empty());
}

#[tokio::test]
async fn unknown_lifecycle_is_not_found() {
    let h = harness(Utc::now());

    let mut body = docker_request();
    body["lifecycle"] = serde_json::json!("condenser");

    let (status, _) = send_json(&h.app, "POST", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(h.scheduler.created.lock().is_empty());
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let h = harness(Utc::now());
    let (status, _) = send_raw(&h.app, "POST", "/v1/staging/bunny-hop", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn recipe_build_failure_relays_a_synthesized_response() {
    let h = harness(Utc::now());

    let mut body = docker_request();
    body["lifecycle_data"] = serde_json::json!({"docker_image_url": ""});

    let (status, response_body) =
        send_json(&h.app, "POST", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let response: serde_json::Value = serde_json::from_slice(&response_body).expect("json body");
    assert_eq!(response["app_id"], "bunny");
    let error = response["error"].as_str().expect("error message");
    assert!(error.starts_with("Recipe building failed: "), "got: {error}");

    // Relayed directly to the platform, bypassing the scheduler.
    assert!(h.scheduler.created.lock().is_empty());
    let delivered = h.platform.delivered.lock();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].error.as_deref(), Some(error));
}

#[tokio::test]
async fn submission_failure_relays_a_synthesized_response() {
    let h = harness(Utc::now());
    h.scheduler.fail_create(SchedulerClientError::Api {
        status: 500,
        message: "scheduler on fire".into(),
    });

    let (status, response_body) =
        send_json(&h.app, "POST", "/v1/staging/bunny-hop", docker_request()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let response: serde_json::Value = serde_json::from_slice(&response_body).expect("json body");
    let error = response["error"].as_str().expect("error message");
    assert!(error.starts_with("Staging failed: "), "got: {error}");

    assert_eq!(h.platform.delivered.lock().len(), 1);
}

#[tokio::test]
async fn stop_staging_cancels_the_task() {
    let h = harness(Utc::now());

    let body = serde_json::json!({"app_id": "bunny", "task_id": "hop", "lifecycle": "docker"});
    let (status, _) = send_json(&h.app, "DELETE", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let scheduler = h.scheduler.clone();
    eventually(move || scheduler.cancelled.lock().contains(&"bunny-hop".to_string())).await;
    assert_eq!(h.metrics.counter("docker_stop_staging_requests_received"), 1);
}

#[tokio::test]
async fn stop_staging_is_accepted_even_when_cancellation_fails() {
    let h = harness(Utc::now());
    h.scheduler.fail_cancel(SchedulerClientError::Transport("gone".into()));

    let body = serde_json::json!({"app_id": "bunny", "task_id": "hop", "lifecycle": "docker"});
    let (status, _) = send_json(&h.app, "DELETE", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let scheduler = h.scheduler.clone();
    eventually(move || !scheduler.cancelled.lock().is_empty()).await;
}

#[tokio::test]
async fn stop_staging_validates_lifecycle_and_identifiers() {
    let h = harness(Utc::now());

    let body = serde_json::json!({"app_id": "bunny", "task_id": "hop", "lifecycle": "condenser"});
    let (status, _) = send_json(&h.app, "DELETE", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let body = serde_json::json!({"task_id": "hop", "lifecycle": "docker"});
    let (status, _) = send_json(&h.app, "DELETE", "/v1/staging/bunny-hop", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(h.scheduler.cancelled.lock().is_empty());
}
