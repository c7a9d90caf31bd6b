//! # External Clients
//!
//! Boundary traits for the two collaborators this process talks to (the
//! task-execution scheduler and the platform callback endpoint) plus their
//! reqwest HTTP implementations. Handlers only ever see the traits, so tests
//! swap in in-memory fakes.

pub mod platform;
pub mod scheduler;

pub use platform::{HttpPlatformClient, PlatformClient};
pub use scheduler::{HttpSchedulerClient, SchedulerClient};
