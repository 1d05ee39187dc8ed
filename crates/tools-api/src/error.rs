//! # API Errors
//!
//! Every handler and gate extractor returns `ApiError`, which renders a
//! JSON `ErrorResponse`. Store and processor failures are mapped here so
//! none of them escapes a request unhandled.

use crate::token::TokenError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tools_core::{PaymentError, StoreError};
use tracing::{error, warn};

/// Application-level error type for the HTTP layer
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer credential was presented
    #[error("Unauthorized")]
    Unauthorized,

    /// Invalid credential, failed role check or ownership mismatch
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Lookup miss
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request body or query could not be used
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Record store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Payment processor failure
    #[error("Payment processor error: {0}")]
    PaymentProcessor(#[from] PaymentError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing => ApiError::Unauthorized,
            TokenError::Encoding(msg) | TokenError::Configuration(msg) => ApiError::Internal(msg),
            other => ApiError::Forbidden(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub retryable: bool,
}

impl ApiError {
    pub fn forbidden(reason: impl Into<String>) -> Self {
        ApiError::Forbidden(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(what.into())
    }

    pub fn status_code(&self) -> StatusCode {
        let code = match self {
            ApiError::Unauthorized => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Store(err) => err.status_code(),
            ApiError::PaymentProcessor(err) => err.status_code(),
            ApiError::Internal(_) => 500,
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Store(err) => err.is_retryable(),
            ApiError::PaymentProcessor(err) => err.is_retryable(),
            _ => false,
        }
    }

    /// Message safe to show a client
    fn public_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "unauthorized access".to_string(),
            ApiError::Forbidden(_) => "forbidden access".to_string(),
            ApiError::Store(StoreError::Duplicate(_)) => "Record already exists".to_string(),
            ApiError::Store(StoreError::Timeout { .. } | StoreError::Connection(_)) => {
                "Record store unavailable".to_string()
            }
            ApiError::Store(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            ApiError::PaymentProcessor(
                err @ (PaymentError::InvalidAmount(_) | PaymentError::UnsupportedCurrency { .. }),
            ) => err.to_string(),
            ApiError::PaymentProcessor(_) => "Payment processor error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            ApiError::Unauthorized | ApiError::Forbidden(_) | ApiError::BadRequest(_) => {
                warn!(status = status.as_u16(), error = %self, "Request rejected")
            }
            ApiError::Store(_) | ApiError::PaymentProcessor(_) | ApiError::Internal(_) => {
                error!(status = status.as_u16(), error = %self, "Request failed")
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: self.public_message(),
            code: status.as_u16(),
            retryable: self.is_retryable(),
        };

        if status == StatusCode::UNAUTHORIZED {
            return (status, [(header::WWW_AUTHENTICATE, "Bearer")], Json(body)).into_response();
        }
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;
