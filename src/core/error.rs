//! Typed error handling for the HTTP surface
//!
//! [`ApiError`] is the single error type handlers return. Each variant maps
//! to an HTTP status and a stable error code, and the `IntoResponse`
//! implementation renders a `{"code", "message"}` JSON body so internals
//! never leak past the error message.
//!
//! Status mapping note: the protected single-record routes report a missing
//! id as 500, not 404. Only the public lookup maps a missing record to 404.
//! Handlers choose between [`ApiError::lookup`] and [`ApiError::persistence`]
//! accordingly.

use crate::core::auth::AuthError;
use crate::core::store::StoreError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Error taxonomy for the REST API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client sent malformed or incomplete input
    #[error("{0}")]
    Validation(String),

    /// Missing or invalid bearer credential
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// No record for the given id (public lookup only)
    #[error("{0}")]
    NotFound(String),

    /// Store operation failed
    #[error("{0}")]
    Persistence(String),

    /// Anything else; the message is fixed and generic
    #[error("Something went wrong!")]
    Internal,
}

/// JSON body rendered for every error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable code for programmatic handling
    pub code: &'static str,
    /// Human-readable message
    pub message: String,
}

impl ApiError {
    /// Map any store error to a 500. Used on the protected routes, where a
    /// missing record also surfaces as a persistence failure.
    pub fn persistence(err: StoreError) -> Self {
        ApiError::Persistence(err.to_string())
    }

    /// Map a store error for the public lookup: missing record is 404,
    /// everything else is a 500.
    pub fn lookup(err: StoreError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else {
            ApiError::Persistence(err.to_string())
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Auth(_) => "AUTH_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Persistence(_) => "PERSISTENCE_ERROR",
            ApiError::Internal => "INTERNAL_ERROR",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code(),
            message: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}
