//! Shared test harness: in-memory fake clients, a frozen clock, and helpers
//! for driving the router without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use stager::backend::{identity_sanitizer, BackendConfig, BackendRegistry};
use stager::client::{PlatformClient, SchedulerClient};
use stager::error::{PlatformClientError, SchedulerClientError};
use stager::metrics::{Clock, StagingMetrics};
use stager::models::{StagingResponse, TaskRecipe};
use stager::web::routes::app;
use stager::web::state::AppState;

pub const FILE_SERVER_URL: &str = "http://file-server.service.internal:8080";
pub const CALLBACK_URL: &str = "http://stager.service.internal:8888/v1/staging";

/// Records submissions and cancellations. Resubmitting a guid that was
/// already accepted reports `TaskAlreadyExists`, like the real scheduler.
#[derive(Default)]
pub struct FakeScheduler {
    pub created: Mutex<Vec<TaskRecipe>>,
    pub cancelled: Mutex<Vec<String>>,
    pub create_error: Mutex<Option<SchedulerClientError>>,
    pub cancel_error: Mutex<Option<SchedulerClientError>>,
}

impl FakeScheduler {
    pub fn fail_create(&self, error: SchedulerClientError) {
        *self.create_error.lock() = Some(error);
    }

    pub fn fail_cancel(&self, error: SchedulerClientError) {
        *self.cancel_error.lock() = Some(error);
    }

    pub fn created_guids(&self) -> Vec<String> {
        self.created.lock().iter().map(|r| r.task_guid.clone()).collect()
    }
}

#[async_trait]
impl SchedulerClient for FakeScheduler {
    async fn create_task(&self, recipe: &TaskRecipe) -> Result<(), SchedulerClientError> {
        if let Some(error) = self.create_error.lock().clone() {
            return Err(error);
        }
        let mut created = self.created.lock();
        if created.iter().any(|r| r.task_guid == recipe.task_guid) {
            return Err(SchedulerClientError::TaskAlreadyExists);
        }
        created.push(recipe.clone());
        Ok(())
    }

    async fn cancel_task(&self, task_guid: &str) -> Result<(), SchedulerClientError> {
        self.cancelled.lock().push(task_guid.to_string());
        if let Some(error) = self.cancel_error.lock().clone() {
            return Err(error);
        }
        Ok(())
    }
}

/// Records relayed staging responses; programmable failure.
#[derive(Default)]
pub struct FakePlatform {
    pub delivered: Mutex<Vec<StagingResponse>>,
    pub error: Mutex<Option<PlatformClientError>>,
}

impl FakePlatform {
    pub fn fail_with(&self, error: PlatformClientError) {
        *self.error.lock() = Some(error);
    }
}

#[async_trait]
impl PlatformClient for FakePlatform {
    async fn staging_complete(
        &self,
        response: &StagingResponse,
    ) -> Result<(), PlatformClientError> {
        if let Some(error) = self.error.lock().clone() {
            return Err(error);
        }
        self.delivered.lock().push(response.clone());
        Ok(())
    }
}

pub struct FrozenClock(pub DateTime<Utc>);

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

pub struct TestHarness {
    pub app: Router,
    pub scheduler: Arc<FakeScheduler>,
    pub platform: Arc<FakePlatform>,
    pub metrics: Arc<StagingMetrics>,
}

pub fn harness(now: DateTime<Utc>) -> TestHarness {
    let backends = Arc::new(BackendRegistry::new(BackendConfig {
        lifecycles: HashMap::from([
            (
                "docker".to_string(),
                "docker_lifecycle/builder.tgz".to_string(),
            ),
            (
                "buildpack".to_string(),
                "buildpack_lifecycle.tgz".to_string(),
            ),
        ]),
        file_server_url: FILE_SERVER_URL.to_string(),
        completion_callback_url: CALLBACK_URL.to_string(),
        default_staging_timeout_secs: 900,
        min_memory_mb: 1024,
        min_disk_mb: 3072,
        min_file_descriptors: 64,
        sanitizer: identity_sanitizer(),
    }));

    let scheduler = Arc::new(FakeScheduler::default());
    let platform = Arc::new(FakePlatform::default());
    let metrics = Arc::new(StagingMetrics::new());

    let state = AppState::new(
        backends,
        scheduler.clone(),
        platform.clone(),
        metrics.clone(),
        Arc::new(FrozenClock(now)),
    );

    TestHarness {
        app: app(state),
        scheduler,
        platform,
        metrics,
    }
}

pub async fn send_json(
    app: &Router,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, Vec<u8>) {
    send_raw(app, method, uri, body.to_string()).await
}

pub async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    body: impl Into<String>,
) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .expect("request");

    let response: Response<Body> = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes()
        .to_vec();
    (status, bytes)
}

/// Wait for a spawned background task (stop-staging cancellation) to land.
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within 500ms");
}
