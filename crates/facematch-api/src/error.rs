//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Pipeline errors arrive already classified at their origin; this module
//! only maps each class to a status code and a JSON body. 5xx responses
//! carry a generic message and the detail goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use facematch_core::ValidationError;
use facematch_face::FaceError;
use facematch_identity_client::{AuthError, LookupError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orchestration::FaceMatchError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details, present only for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Input rejected by the validator (422). `reason` is the stable
    /// machine-readable cause, echoed in `details.reason`.
    #[error("validation error: {message}")]
    Validation {
        message: String,
        reason: &'static str,
    },

    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// No reference photo on file (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// An identity service call exceeded its timeout (504).
    #[error("upstream timeout: {0}")]
    UpstreamTimeout(String),

    /// An identity service call failed or answered garbage (502).
    #[error("upstream error: {0}")]
    Upstream(String),

    /// One of the two images has no detectable face (422).
    #[error("{0}")]
    NoFace(String),

    /// Image decoding or encoding failed (500). Message is logged only.
    #[error("face processing error: {0}")]
    FaceProcessing(String),

    /// Internal server error (500). Message is logged only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::UpstreamTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "UPSTREAM_TIMEOUT"),
            Self::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            Self::NoFace(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NO_FACE_DETECTED"),
            Self::FaceProcessing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "FACE_PROCESSING_ERROR")
            }
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Upstream detail names internal endpoints; it stays in the log.
        let message = match &self {
            Self::UpstreamTimeout(_) => "Identity service timed out".to_string(),
            Self::Upstream(_) => "Identity service request failed".to_string(),
            Self::FaceProcessing(_) => "Face processing failed".to_string(),
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::warn!(error = %self, code, "request rejected");
        }

        let details = match &self {
            Self::Validation { reason, .. } => Some(serde_json::json!({ "reason": reason })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::Validation {
            reason: err.reason(),
            message: err.to_string(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Timeout { .. } => Self::UpstreamTimeout(err.to_string()),
            AuthError::Upstream { .. } | AuthError::MalformedResponse { .. } => {
                Self::Upstream(err.to_string())
            }
        }
    }
}

impl From<LookupError> for AppError {
    fn from(err: LookupError) -> Self {
        match err {
            LookupError::NotFound { .. } => Self::NotFound(err.to_string()),
            LookupError::Timeout { .. } => Self::UpstreamTimeout(err.to_string()),
            LookupError::Upstream { .. } | LookupError::MalformedResponse { .. } => {
                Self::Upstream(err.to_string())
            }
        }
    }
}

impl From<FaceError> for AppError {
    fn from(err: FaceError) -> Self {
        match err {
            FaceError::NoFaceInSubmitted | FaceError::NoFaceInReference => {
                Self::NoFace(err.to_string())
            }
            FaceError::Processing(_) => Self::FaceProcessing(err.to_string()),
        }
    }
}

impl From<FaceMatchError> for AppError {
    fn from(err: FaceMatchError) -> Self {
        match err {
            FaceMatchError::Validation(e) => e.into(),
            FaceMatchError::Auth(e) => e.into(),
            FaceMatchError::Lookup(e) => e.into(),
            FaceMatchError::Face(e) => e.into(),
            FaceMatchError::Task(msg) => Self::Internal(msg),
        }
    }
}
