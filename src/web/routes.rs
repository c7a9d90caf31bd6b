//! # Web API Route Definitions
//!
//! The HTTP route structure of the staging bridge. The `:staging_guid` path
//! segment mirrors the correlation key for log correlation; the payloads
//! carry the authoritative identifiers.

use axum::routing::{get, post};
use axum::Router;

use crate::web::handlers;
use crate::web::state::AppState;

/// Staging routes:
/// - `POST /v1/staging/:staging_guid` - stage an application
/// - `DELETE /v1/staging/:staging_guid` - stop an in-flight staging task
/// - `POST /v1/staging/:staging_guid/completed` - scheduler completion callback
pub fn staging_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/staging/:staging_guid",
            post(handlers::staging::stage).delete(handlers::staging::stop_staging),
        )
        .route(
            "/v1/staging/:staging_guid/completed",
            post(handlers::completion::staging_complete),
        )
}

/// Health routes:
/// - `/health` - basic liveness check
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::basic_health))
}

/// The complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(staging_routes())
        .merge(health_routes())
        .with_state(state)
}
