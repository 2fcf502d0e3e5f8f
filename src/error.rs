//! Relay error types.
//!
//! [`RelayError`] is the crate's central error type; each variant maps to
//! an HTTP status code and structured JSON body on the diagnostic REST
//! surface. [`JoinRejection`] is the narrower outcome of the authorization
//! gate, whose `Display` text is exactly what the rejected socket sees.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2001,
///     "message": "no active room for session s1",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                 |
/// |-----------|-----------------|-----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request             |
/// | 2000–2999 | Not Found       | 404 Not Found               |
/// | 3000–3999 | Server          | 503 / 504                   |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No active room exists for the session.
    #[error("no active room for session {0}")]
    RoomNotFound(String),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The session store could not be queried.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// The session lookup exceeded its time budget.
    #[error("session lookup timed out after {timeout_ms} ms")]
    LookupTimeout {
        /// Configured budget in milliseconds.
        timeout_ms: u64,
    },
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidConfig(_) => 1002,
            Self::RoomNotFound(_) => 2001,
            Self::PersistenceError(_) => 3001,
            Self::LookupTimeout { .. } => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidConfig(_) => StatusCode::BAD_REQUEST,
            Self::RoomNotFound(_) => StatusCode::NOT_FOUND,
            Self::PersistenceError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::LookupTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Why a `join` was refused.
///
/// Lookup failures fail closed and surface as [`JoinRejection::LookupFailed`]
/// so the peer can retry later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum JoinRejection {
    /// The session store has no record of the session.
    #[error("Session not found")]
    SessionNotFound,

    /// The claimed user id does not match the session's record for the role.
    #[error("Unauthorized: You are not a participant in this session")]
    Unauthorized,

    /// The session store errored or timed out.
    #[error("Unable to verify session participants")]
    LookupFailed,
}
