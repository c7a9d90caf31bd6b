//! # Stager
//!
//! Staging bridge between a platform controller and an external task-execution
//! scheduler.
//!
//! ## Overview
//!
//! The platform asks for an application to be staged; the scheduler actually
//! runs the work. This crate translates each inbound staging request into a
//! task recipe (an ordered graph of download/run/upload/fetch-result steps)
//! for the requested build lifecycle, submits it to the scheduler under a
//! deterministic correlation key, and later reconciles the scheduler's
//! asynchronous completion callback back to the originating request through an
//! opaque annotation, relaying a normalized staging response to the platform.
//!
//! The process is stateless: all correlation state rides inside the
//! scheduler's task record.
//!
//! ## Module Organization
//!
//! - [`backend`] - lifecycle backends (buildpack, docker) and shared policy
//! - [`models`] - wire types: requests, recipes, completions, responses
//! - [`client`] - scheduler and platform-callback client boundaries
//! - [`web`] - axum HTTP surface and handlers
//! - [`metrics`] - injected metrics sink and clock
//! - [`config`] - process configuration
//! - [`error`] - structured error taxonomy

pub mod backend;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod web;

pub use backend::{BackendConfig, BackendRegistry, LifecycleBackend, Sanitizer};
pub use config::StagerConfig;
pub use error::{
    BackendError, PlatformClientError, Result, SchedulerClientError, StagerError,
};
pub use metrics::{Clock, StagingMetrics, SystemClock};
