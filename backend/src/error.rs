//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use crate::repositories::StoreError;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use storefront_shared::{AuthError, AuthErrorBody, ErrorDetail, ErrorResponse, FieldErrors};
use thiserror::Error;
use tracing::error;

/// Fixed message returned with every failed login
pub const LOGIN_FAILED_MESSAGE: &str = "Authentication failed: wrong username or password!";

/// Fixed message returned when a presented token is rejected
pub const INVALID_TOKEN_MESSAGE: &str = "The JWT token is not valid!";

const UNAUTHENTICATED_MESSAGE: &str = "Full authentication is required to access this resource";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this resource";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Validation error")]
    Validation(FieldErrors),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => ApiError::Conflict(format!("{} already in use", field)),
            StoreError::Database(e) => ApiError::Database(e),
        }
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

impl ApiError {
    /// Status code this error maps to
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn auth_body(err: &AuthError) -> AuthErrorBody {
        let message = match err {
            AuthError::InvalidCredentials => LOGIN_FAILED_MESSAGE,
            AuthError::Unauthenticated => UNAUTHENTICATED_MESSAGE,
            AuthError::Forbidden => FORBIDDEN_MESSAGE,
            AuthError::TokenMalformed | AuthError::TokenInvalid | AuthError::TokenExpired => {
                INVALID_TOKEN_MESSAGE
            }
        };
        AuthErrorBody {
            message: message.to_string(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (code, message, details) = match self {
            // The auth pipeline answers with its own flat body
            ApiError::Auth(err) => return (status, Json(Self::auth_body(&err))).into_response(),
            ApiError::Validation(fields) => (
                "VALIDATION_ERROR",
                "Request validation failed".to_string(),
                serde_json::to_value(fields).ok(),
            ),
            ApiError::NotFound(msg) => ("NOT_FOUND", msg, None),
            ApiError::Conflict(msg) => ("CONFLICT", msg, None),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg, None),
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                ("INTERNAL_ERROR", "An internal error occurred".to_string(), None)
            }
            ApiError::Database(err) => {
                error!("Database error: {:?}", err);
                ("DATABASE_ERROR", "A database error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
                details,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
