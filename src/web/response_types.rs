//! # Web API Error Types
//!
//! Error types specific to the web surface and their HTTP response
//! conversions. Leverages thiserror for structure and axum's IntoResponse for
//! status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Web API errors with HTTP status code mappings.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Service temporarily unavailable")]
    ServiceUnavailable,

    /// Upstream status forwarded from the platform callback endpoint.
    #[error("Upstream returned status {0}")]
    Upstream(u16),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream(status) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::SERVICE_UNAVAILABLE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            // Upstream passthrough keeps an empty body; the code is the signal.
            Self::Upstream(_) | Self::ServiceUnavailable => status.into_response(),
            other => (status, other.to_string()).into_response(),
        }
    }
}
