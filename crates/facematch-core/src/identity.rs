//! # Identity Number
//!
//! The national identity number whose photo on file is compared against
//! the submitted image. The canonical form is 11 ASCII digits; callers may
//! submit formatted input (`123.456.789-09`), which is normalized by
//! stripping every non-digit character.
//!
//! ## Validation
//!
//! - Exactly 11 digits after stripping, otherwise `bad_length`
//! - Not all 11 digits identical, otherwise `degenerate`
//!
//! Check digits are not verified; this is a format-level gate.

use serde::Serialize;

use crate::error::ValidationError;

/// Number of digits in a canonical identity number.
pub const IDENTITY_NUMBER_LEN: usize = 11;

/// A validated identity number in canonical 11-digit form.
///
/// `Display` masks the middle digits (`123***09`) so the value can appear
/// in log lines. Use [`IdentityNumber::as_str`] for the full value when
/// calling the lookup service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IdentityNumber(String);

impl IdentityNumber {
    /// Access the identity number in canonical 11-digit form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the masked form: first three and last two digits.
    pub fn masked(&self) -> String {
        format!("{}***{}", &self.0[..3], &self.0[IDENTITY_NUMBER_LEN - 2..])
    }
}

impl std::fmt::Display for IdentityNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.masked())
    }
}

impl std::str::FromStr for IdentityNumber {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_identity_number(s)
    }
}

/// Normalize and validate a raw identity number.
///
/// # Errors
///
/// Returns [`ValidationError::BadLength`] unless exactly 11 digits remain
/// after stripping non-digit characters, and [`ValidationError::Degenerate`]
/// if all 11 digits are the same.
pub fn validate_identity_number(raw: &str) -> Result<IdentityNumber, ValidationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != IDENTITY_NUMBER_LEN {
        return Err(ValidationError::BadLength {
            found: digits.len(),
        });
    }

    let first = digits.as_bytes()[0];
    if digits.bytes().all(|b| b == first) {
        return Err(ValidationError::Degenerate);
    }

    Ok(IdentityNumber(digits))
}
