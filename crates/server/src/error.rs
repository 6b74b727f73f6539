//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures storage faults to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`.
//!
//! Every error response has the body `{"error": "<message>"}`.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use rolodex_core::{PageError, ValidationError};

use crate::db::RepositoryError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// A request payload failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Pagination or sort parameters were out of range.
    #[error(transparent)]
    InvalidQuery(#[from] PageError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Request collides with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Malformed request (body, path or query string).
    #[error("{0}")]
    BadRequest(String),
}

impl AppError {
    /// Resource not found, with a caller-facing message.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Map a repository error, naming the missing resource on `NotFound`.
    pub fn from_repository(err: RepositoryError, missing: &str) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found(missing),
            other => other.into(),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidQuery(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::not_found("Not found"),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let error = match &self {
            Self::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (self.status(), Json(ErrorBody { error })).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::not_found("Customer not found");
        assert_eq!(err.to_string(), "Customer not found");

        let err = AppError::Validation(ValidationError::City);
        assert_eq!(
            err.to_string(),
            "City is required and must be at least 2 characters"
        );
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::Validation(ValidationError::FirstName).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidQuery(PageError::InvalidPage(0)).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("test").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Conflict("test".to_string()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        let err = AppError::from(RepositoryError::Conflict("Phone number already exists".into()));
        assert!(matches!(err, AppError::Conflict(ref m) if m == "Phone number already exists"));

        let err = AppError::from_repository(RepositoryError::NotFound, "Address not found");
        assert!(matches!(err, AppError::NotFound(ref m) if m == "Address not found"));

        let err = AppError::from(RepositoryError::DataCorruption("bad row".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let (status, json) = body(AppError::Validation(ValidationError::PinCode)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json,
            serde_json::json!({
                "error": "Pin code is required and must be a valid 5 or 6-digit code"
            })
        );
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let err = AppError::from(RepositoryError::DataCorruption("secret detail".into()));
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, serde_json::json!({"error": "Internal server error"}));
    }
}
