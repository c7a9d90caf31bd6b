//! Task-execution scheduler client.
//!
//! The scheduler owns submitted tasks entirely; this client only creates and
//! cancels them. A 409 from the task-create endpoint means a task already
//! exists under the same guid and maps to its own error variant so the
//! staging handler can absorb it.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use crate::error::SchedulerClientError;
use crate::models::TaskRecipe;

#[async_trait]
pub trait SchedulerClient: Send + Sync {
    /// Submit a task recipe for execution.
    async fn create_task(&self, recipe: &TaskRecipe) -> Result<(), SchedulerClientError>;

    /// Request cancellation of a task by its guid.
    async fn cancel_task(&self, task_guid: &str) -> Result<(), SchedulerClientError>;
}

/// HTTP implementation against the scheduler's task API.
#[derive(Clone)]
pub struct HttpSchedulerClient {
    client: Client,
    base_url: Url,
}

impl std::fmt::Debug for HttpSchedulerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSchedulerClient")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl HttpSchedulerClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SchedulerClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SchedulerClientError::Transport(format!("invalid base URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SchedulerClientError::Transport(e.to_string()))?;
        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url, SchedulerClientError> {
        self.base_url
            .join(path)
            .map_err(|e| SchedulerClientError::Transport(e.to_string()))
    }
}

#[async_trait]
impl SchedulerClient for HttpSchedulerClient {
    async fn create_task(&self, recipe: &TaskRecipe) -> Result<(), SchedulerClientError> {
        let url = self.endpoint("v1/tasks")?;
        debug!(task_guid = %recipe.task_guid, url = %url, "submitting task");

        let response = self
            .client
            .post(url)
            .json(recipe)
            .send()
            .await
            .map_err(|e| SchedulerClientError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(SchedulerClientError::TaskAlreadyExists),
            status => Err(SchedulerClientError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn cancel_task(&self, task_guid: &str) -> Result<(), SchedulerClientError> {
        let url = self.endpoint(&format!("v1/tasks/{task_guid}/cancel"))?;
        debug!(task_guid, url = %url, "cancelling task");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| SchedulerClientError::Transport(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(SchedulerClientError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}
