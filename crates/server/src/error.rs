//! Unified error handling for the catalog server.
//!
//! Handlers return `Result<T, AppError>`. Server-class errors are captured to
//! Sentry and logged; clients only ever see a generic message for those.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::uploads::UploadError;
use crate::store::StoreError;
use crate::validation::FieldError;

/// Application-level error type for the catalog server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Active record store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Writing an uploaded image failed.
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// One or more request fields failed validation.
    #[error("Validation failed ({} errors)", .0.len())]
    Validation(Vec<FieldError>),

    /// Bad request from client (malformed body, unsupported content type).
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// HTTP status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) | Self::Upload(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Catalog request error"
            );
        }

        let body = match self {
            Self::Validation(errors) => json!({ "errors": errors }),
            Self::BadRequest(message) => json!({ "message": message }),
            // Don't expose internal error details to clients
            Self::Store(_) | Self::Upload(_) => json!({ "message": "Internal server error" }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");

        let err = AppError::Validation(vec![FieldError::required("name")]);
        assert_eq!(err.to_string(), "Validation failed (1 errors)");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::Validation(vec![FieldError::required("name")])),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Upload(UploadError::Io(std::io::Error::other("disk full")))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Store(StoreError::DataCorruption("bad".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
