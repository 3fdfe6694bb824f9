//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps the core error taxonomy (`DuplicateOrInvalid`, `NotFound`,
//! `BackupUnavailable`) to distinguishable HTTP status codes with JSON
//! error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use lum_registry::{ReconcileError, RegistryError};

/// Structured JSON error response body.
///
/// Every error response uses this shape for consistency across the API
/// surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Submission rejected: the HWID is invalid or already known (409).
    #[error("invalid or duplicate hwid: {0}")]
    DuplicateOrInvalid(String),

    /// Operation targeted an unknown HWID (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body could not be parsed or contains invalid values (422).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The backup authority call failed or timed out (502).
    #[error("backup authority unavailable: {0}")]
    BackupUnavailable(String),

    /// A required dependency is not configured (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::DuplicateOrInvalid(_) => (StatusCode::CONFLICT, "DUPLICATE_OR_INVALID"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::UNPROCESSABLE_ENTITY, "BAD_REQUEST"),
            Self::BackupUnavailable(_) => (StatusCode::BAD_GATEWAY, "BACKUP_UNAVAILABLE"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Log upstream trouble for operator visibility; client errors
        // are the caller's problem.
        match &self {
            Self::BackupUnavailable(_) => tracing::error!(error = %self, "backup authority error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::DuplicateOrInvalid => Self::DuplicateOrInvalid(err.to_string()),
            RegistryError::NotFound(hwid) => Self::NotFound(format!("unknown hwid: {hwid}")),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        match &err {
            ReconcileError::BackupUnavailable { .. } => Self::BackupUnavailable(err.to_string()),
        }
    }
}
