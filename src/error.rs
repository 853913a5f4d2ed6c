//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{AssembleError, ImageError};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "invalid transition",
///     "details": "no identification to log"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body: numeric code, a fixed message per error kind, and the
/// specific reason when there is one.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// What exactly was wrong, omitted for internal errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The uploaded photo was rejected at the input boundary.
    #[error("invalid image: {0}")]
    InvalidImage(#[from] ImageError),

    /// Session with the given ID was not found.
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),

    /// Catch log entry with the given ID was not found.
    #[error("catch not found: {0}")]
    CatchNotFound(uuid::Uuid),

    /// The session is not in a state that allows the operation.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidImage(_) => 1002,
            Self::SessionNotFound(_) => 2001,
            Self::CatchNotFound(_) => 2002,
            Self::InvalidTransition(_) => 2003,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidImage(_) => StatusCode::BAD_REQUEST,
            Self::SessionNotFound(_) | Self::CatchNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidTransition(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the fixed message for this kind of error.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid request",
            Self::InvalidImage(_) => "invalid image",
            Self::SessionNotFound(_) => "session not found",
            Self::CatchNotFound(_) => "catch not found",
            Self::InvalidTransition(_) => "invalid transition",
            Self::Internal(_) => "internal error",
        }
    }

    /// Returns the specific reason, if it is safe to show the client.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::InvalidRequest(reason) | Self::InvalidTransition(reason) => Some(reason.clone()),
            Self::InvalidImage(err) => Some(err.to_string()),
            Self::SessionNotFound(id) | Self::CatchNotFound(id) => Some(id.to_string()),
            Self::Internal(_) => None,
        }
    }
}

impl From<AssembleError> for GatewayError {
    fn from(err: AssembleError) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.summary().to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
