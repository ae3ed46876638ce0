//! Error taxonomy for the HTTP surface.
//!
//! Four buckets map to status codes: validation → 400, auth → 401,
//! misconfiguration and everything unclassified → 500. Stealth-blocked
//! origins are handled before any of this and are deliberately not errors.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pulse_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("constraint violation")]
    Constraint,

    #[error("server credentials not configured")]
    Unconfigured,

    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Constraint => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Unconfigured | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error, optionally exposing internal detail. Detail is only
    /// included for callers that already passed admin auth; everyone else
    /// gets the generic message.
    pub fn into_response_with_detail(self, include_detail: bool) -> Response {
        let message = match (&self, include_detail) {
            (ApiError::Internal(detail), true) => detail.clone(),
            _ => self.to_string(),
        };

        match &self {
            ApiError::Internal(detail) => tracing::error!("request failed: {}", detail),
            other => tracing::warn!("request rejected: {}", other),
        }

        (
            self.status(),
            Json(serde_json::json!({ "error": message })),
        )
            .into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_response_with_detail(false)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        // Bound-length CHECK failures come back as the caller's fault, but
        // without echoing raw store error text.
        if let rusqlite::Error::SqliteFailure(inner, _) = &err {
            if inner.code == rusqlite::ErrorCode::ConstraintViolation {
                return ApiError::Constraint;
            }
        }
        ApiError::Internal(err.to_string())
    }
}
