//! The JSON error envelope every endpoint responds with on failure.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use slms_database::DatabaseError;
use std::borrow::Cow;
use utoipa::ToSchema;

/// Wire body of an error response: `{"code": ..., "message": ...}`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProblemBody {
    /// Stable machine-readable code, e.g. `not_found`.
    pub code: Cow<'static, str>,
    /// Human-readable description.
    pub message: Cow<'static, str>,
}

/// An HTTP error response carrying a [`ProblemBody`].
///
/// Slices convert their error enums into `Problem` at the handler boundary;
/// nothing below the routing layer knows about status codes.
#[derive(Debug, Clone)]
pub struct Problem {
    pub status: StatusCode,
    pub body: ProblemBody,
}

impl Problem {
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { status, body: ProblemBody { code: code.into(), message: message.into() } }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", message)
    }

    #[must_use]
    pub fn unauthorized(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    #[must_use]
    pub fn forbidden(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    #[must_use]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    #[must_use]
    pub fn conflict(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    #[must_use]
    pub fn too_many_requests(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, "too_many_requests", message)
    }

    #[must_use]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<super::state::ApiStateError> for Problem {
    fn from(err: super::state::ApiStateError) -> Self {
        tracing::error!(error = %err, "State lookup failed");
        Self::internal("internal server error")
    }
}

// Storage failures never leak engine details to clients.
impl From<DatabaseError> for Problem {
    fn from(err: DatabaseError) -> Self {
        tracing::error!(error = %err, "Database operation failed");
        Self::internal("internal server error")
    }
}

impl From<crate::security::SecurityError> for Problem {
    fn from(err: crate::security::SecurityError) -> Self {
        tracing::error!(error = %err, "Security primitive failed");
        Self::internal("internal server error")
    }
}
