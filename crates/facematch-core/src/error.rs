//! # Validation Errors
//!
//! Rejections produced by the input validator, built with `thiserror`.
//! Every variant maps to a stable machine-readable reason so the API layer
//! can surface it in the `details` of a 422 response without parsing
//! the display string.

use thiserror::Error;

/// Caller input is malformed. Not retryable by the system: the caller must
/// fix the input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The identity number does not have exactly 11 digits once non-digit
    /// characters are stripped.
    #[error("identity number must contain exactly 11 digits (found {found})")]
    BadLength {
        /// Number of digits left after stripping.
        found: usize,
    },

    /// All 11 digits are identical, a structurally invalid pattern.
    #[error("identity number is invalid")]
    Degenerate,

    /// The uploaded file does not declare an `image/*` content type.
    #[error("uploaded file must be an image (content type: {})", .content_type.as_deref().unwrap_or("none"))]
    NotImage {
        /// The declared content type, if any.
        content_type: Option<String>,
    },

    /// The uploaded image exceeds the size cap.
    #[error("image too large: {size} bytes (maximum {limit} bytes)")]
    TooLarge {
        /// Declared size in bytes.
        size: u64,
        /// The enforced maximum.
        limit: u64,
    },
}

impl ValidationError {
    /// Stable machine-readable reason for this rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadLength { .. } => "bad_length",
            Self::Degenerate => "degenerate",
            Self::NotImage { .. } => "not_image",
            Self::TooLarge { .. } => "too_large",
        }
    }
}
