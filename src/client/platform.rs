//! Platform callback client.
//!
//! Relays finished staging responses back to the platform controller. A non-2xx
//! reply surfaces as `BadResponse` carrying the upstream status, which the
//! completion handler forwards verbatim to the scheduler.

use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

use crate::error::PlatformClientError;
use crate::models::StagingResponse;

#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Deliver a staging response to the platform's completion endpoint.
    async fn staging_complete(&self, response: &StagingResponse)
        -> Result<(), PlatformClientError>;
}

/// HTTP implementation posting to the platform's internal completion endpoint,
/// optionally with basic auth.
#[derive(Clone)]
pub struct HttpPlatformClient {
    client: Client,
    callback_url: Url,
    credentials: Option<(String, String)>,
}

impl std::fmt::Debug for HttpPlatformClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlatformClient")
            .field("callback_url", &self.callback_url.as_str())
            .field("auth_enabled", &self.credentials.is_some())
            .finish()
    }
}

impl HttpPlatformClient {
    pub fn new(
        callback_url: &str,
        credentials: Option<(String, String)>,
        timeout: Duration,
    ) -> Result<Self, PlatformClientError> {
        let callback_url = Url::parse(callback_url)
            .map_err(|e| PlatformClientError::Transport(format!("invalid callback URL: {e}")))?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stager/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            callback_url,
            credentials,
        })
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn staging_complete(
        &self,
        response: &StagingResponse,
    ) -> Result<(), PlatformClientError> {
        debug!(app_id = %response.app_id, task_id = %response.task_id, "posting staging response");

        let mut request = self.client.post(self.callback_url.clone()).json(response);
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }

        let reply = request
            .send()
            .await
            .map_err(|e| PlatformClientError::Transport(e.to_string()))?;

        if reply.status().is_success() {
            Ok(())
        } else {
            Err(PlatformClientError::BadResponse {
                status: reply.status().as_u16(),
            })
        }
    }
}
