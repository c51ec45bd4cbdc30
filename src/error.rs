//! Boundary error type bridging engine errors and HTTP responses.
//!
//! Business-rule failures are "operational": anticipated conditions
//! whose message is safe to expose. Anything else is masked with a
//! generic message outside development mode so internals never leak.

use crate::engine::RegistrationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Application error carrying an HTTP status and user-facing message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Option<Value>,
    operational: bool,
    expose_internal: bool,
    source: Option<anyhow::Error>,
}

impl ApiError {
    /// Create a new operational error.
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: None,
            operational: true,
            expose_internal: false,
            source: None,
        }
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Create a 429 Too Many Requests error.
    #[must_use]
    pub fn too_many_requests(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    /// Create a non-operational 500 error from an unexpected failure.
    ///
    /// The real message is only exposed when `expose_internal` is set
    /// (development mode).
    #[must_use]
    pub fn internal(source: anyhow::Error, expose_internal: bool) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: source.to_string(),
            errors: None,
            operational: false,
            expose_internal,
            source: Some(source),
        }
    }

    /// Map an engine error to its transport-level representation.
    ///
    /// The source used 400 for conflicts (full event, duplicate
    /// registration); that choice is preserved for compatibility.
    #[must_use]
    pub fn from_engine(err: RegistrationError, development: bool) -> Self {
        match err {
            RegistrationError::Validation(message)
            | RegistrationError::Conflict(message)
            | RegistrationError::InvalidState(message) => Self::bad_request(message),
            RegistrationError::NotFound(message) => Self::not_found(message),
            RegistrationError::Storage(e) => Self::internal(e.into(), development),
        }
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

/// Error envelope for operational (and development-mode) failures.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    #[serde(rename = "statusCode")]
    status_code: u16,
    message: String,
    errors: Option<Value>,
    success: bool,
}

/// Masked envelope for unexpected failures outside development mode.
#[derive(Debug, Serialize)]
struct MaskedBody {
    status: &'static str,
    message: &'static str,
    success: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    error = %source,
                    "internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "internal server error"
                ),
            }
        }

        if self.operational || self.expose_internal {
            let body = ErrorBody {
                status: if self.status.is_server_error() {
                    "error"
                } else {
                    "fail"
                },
                status_code: self.status.as_u16(),
                message: self.message,
                errors: self.errors,
                success: false,
            };
            (self.status, Json(body)).into_response()
        } else {
            let body = MaskedBody {
                status: "error",
                message: "something went wrong",
                success: false,
            };
            (self.status, Json(body)).into_response()
        }
    }
}
