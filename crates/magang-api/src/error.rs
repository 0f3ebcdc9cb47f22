//! HTTP error mapping
//!
//! Every failure leaves the service as the standard envelope. Storage and
//! internal failures are logged here and answered with a generic message.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use magang_core::error::{AuthError, AuthzError, ConflictError, DomainError, ValidationError};

use crate::response::ApiResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Domain(e.into())
    }
}

impl From<AuthzError> for ApiError {
    fn from(e: AuthzError) -> Self {
        ApiError::Domain(e.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Domain(e.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge(e.body_text())
        } else {
            ApiError::BadRequest(e.body_text())
        }
    }
}

impl ApiError {
    /// Status and machine-readable code for this error.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Domain(e) => match e {
                DomainError::Auth(AuthError::NotFound | AuthError::InvalidCredential) => {
                    (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS")
                }
                DomainError::Auth(AuthError::Expired) => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
                DomainError::Auth(AuthError::Malformed) => (StatusCode::UNAUTHORIZED, "TOKEN_INVALID"),
                DomainError::Authz(AuthzError::Unauthenticated) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED"),
                DomainError::Authz(AuthzError::Forbidden(_)) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
                DomainError::Validation(ValidationError::FileTooLarge { .. }) => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "FILE_TOO_LARGE")
                }
                DomainError::Validation(ValidationError::DuplicateUsername(_)) => {
                    (StatusCode::BAD_REQUEST, "DUPLICATE_USERNAME")
                }
                DomainError::Validation(ValidationError::InvalidStatus(_)) => {
                    (StatusCode::BAD_REQUEST, "INVALID_STATUS")
                }
                DomainError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                DomainError::Conflict(ConflictError::AlreadyPlaced(_)) => (StatusCode::CONFLICT, "ALREADY_PLACED"),
                DomainError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                DomainError::DatabaseError(_)
                | DomainError::StorageError(_)
                | DomainError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!("Request rejected ({}): {}", code, self);
            match self {
                // An unknown username reads exactly like a wrong password.
                ApiError::Domain(DomainError::Auth(AuthError::NotFound)) => {
                    AuthError::InvalidCredential.to_string()
                }
                other => other.to_string(),
            }
        };

        (status, Json(ApiResponse::error(code, &message))).into_response()
    }
}
