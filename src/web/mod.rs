//! # Web Surface
//!
//! The axum HTTP surface: staging and stop-staging requests from the
//! platform, completion callbacks from the scheduler, and a health probe.

pub mod handlers;
pub mod response_types;
pub mod routes;
pub mod state;
