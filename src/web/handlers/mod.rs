//! # Web API Request Handlers
//!
//! HTTP request handlers organized by functional area: staging (stage and
//! stop), completion callbacks, and health.

pub mod completion;
pub mod health;
pub mod staging;
