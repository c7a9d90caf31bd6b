//! # Web Application State
//!
//! Shared state handed to every request handler: the backend registry, the
//! two external clients behind their traits, the injected metrics sink, and
//! the clock. Everything is behind `Arc`, so cloning per request is cheap and
//! no handler holds a lock across an external call.

use std::fmt;
use std::sync::Arc;

use crate::backend::BackendRegistry;
use crate::client::{PlatformClient, SchedulerClient};
use crate::metrics::{Clock, StagingMetrics};

#[derive(Clone)]
pub struct AppState {
    pub backends: Arc<BackendRegistry>,
    pub scheduler: Arc<dyn SchedulerClient>,
    pub platform: Arc<dyn PlatformClient>,
    pub metrics: Arc<StagingMetrics>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(
        backends: Arc<BackendRegistry>,
        scheduler: Arc<dyn SchedulerClient>,
        platform: Arc<dyn PlatformClient>,
        metrics: Arc<StagingMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backends,
            scheduler,
            platform,
            metrics,
            clock,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("backends", &self.backends)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
