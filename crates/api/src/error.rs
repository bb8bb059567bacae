//! API error types with HTTP response mapping.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{AuthError, DomainError};
use serde::Serialize;
use store::StoreError;

use crate::messages::ValidationError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// The request body could not be decoded or failed validation.
    InvalidArgument(String),
    /// The caller's credential was missing or rejected.
    Unauthenticated(AuthError),
    /// Use-case error.
    Domain(DomainError),
    /// The call did not finish within the configured request timeout.
    DeadlineExceeded(Duration),
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, "INVALID_ARGUMENT", msg),
            ApiError::Unauthenticated(err) => auth_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
            ApiError::DeadlineExceeded(timeout) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                format!("deadline exceeded after {}ms", timeout.as_millis()),
            ),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %message, "internal server error");
        }

        (status, axum::Json(ErrorBody { code, message })).into_response()
    }
}

fn auth_error_to_response(err: AuthError) -> (StatusCode, &'static str, String) {
    if err.is_unauthenticated() {
        (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", err.to_string())
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", err.to_string())
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, &'static str, String) {
    match err {
        DomainError::Store(err @ StoreError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string())
        }
        DomainError::Auth(err) => auth_error_to_response(err),
        err => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL", err.to_string()),
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Unauthenticated(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::InvalidArgument(err.to_string())
    }
}
