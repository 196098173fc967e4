//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from the key store, canonicalization, and signing
//! layers onto HTTP status codes with a JSON error envelope. Internal
//! detail is logged, never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mrv_core::{CryptoError, KeyStoreError};
use mrv_vc::VcError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// The error detail.
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Undecodable or malformed client input (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Authentication failure (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Key store or database failure (500). Detail is logged, not returned.
    #[error("storage failure: {0}")]
    Storage(String),

    /// Signing pipeline failure, local or anchor (500). Detail is logged,
    /// not returned.
    #[error("signing failure: {0}")]
    Signing(String),

    /// The issuance deadline expired before signing (503).
    #[error("deadline expired: {0}")]
    Deadline(String),

    /// Anything else (500). Detail is logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE"),
            Self::Signing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SIGNING_FAILURE"),
            Self::Deadline(_) => (StatusCode::SERVICE_UNAVAILABLE, "DEADLINE_EXPIRED"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal detail to clients.
        let message = match &self {
            Self::Storage(_) | Self::Signing(_) | Self::Internal(_) => {
                "An internal error occurred".to_string()
            }
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<KeyStoreError> for AppError {
    fn from(err: KeyStoreError) -> Self {
        match &err {
            KeyStoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            KeyStoreError::InvalidDeviceId { .. } => Self::BadRequest(err.to_string()),
            KeyStoreError::Storage { .. } => Self::Storage(err.to_string()),
        }
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        match &err {
            CryptoError::InvalidEncoding { .. } => Self::BadRequest(err.to_string()),
            CryptoError::SigningFailed(_) => Self::Signing(err.to_string()),
        }
    }
}

impl From<VcError> for AppError {
    fn from(err: VcError) -> Self {
        match &err {
            VcError::DeadlineExpired => Self::Deadline(err.to_string()),
            VcError::InvalidFact(_) => Self::BadRequest(err.to_string()),
            VcError::Key(key_err) => match key_err {
                KeyStoreError::NotFound { .. } => Self::NotFound(err.to_string()),
                KeyStoreError::InvalidDeviceId { .. } => Self::BadRequest(err.to_string()),
                KeyStoreError::Storage { .. } => Self::Storage(err.to_string()),
            },
            VcError::Signing(crypto_err) => match crypto_err {
                CryptoError::InvalidEncoding { .. } => Self::BadRequest(err.to_string()),
                CryptoError::SigningFailed(_) => Self::Signing(err.to_string()),
            },
            VcError::Anchor(_) => Self::Signing(err.to_string()),
            VcError::Build(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}
