#![deny(missing_docs)]

//! # facematch-core -- Foundational Types for the Face Match Service
//!
//! This crate defines the request-scoped domain types every other crate in
//! the workspace depends on. It has no internal crate dependencies; only
//! `serde`, `thiserror`, and `chrono` from the external ecosystem.
//!
//! ## Design Principles
//!
//! 1. **Validated newtypes.** An [`IdentityNumber`] can only be obtained
//!    through [`validate_identity_number`], so every downstream call works
//!    on the canonical 11-digit form.
//!
//! 2. **Input validation happens before any I/O.** [`validate_image`] and
//!    [`validate_identity_number`] are pure functions with no side effects.
//!
//! 3. **Typed rejection reasons.** [`ValidationError`] carries a stable
//!    machine-readable reason (`bad_length`, `degenerate`, `not_image`,
//!    `too_large`) alongside its human-readable message.

pub mod encoding;
pub mod error;
pub mod identity;
pub mod image;
pub mod outcome;

// Re-export primary types at crate root for ergonomic imports.
pub use encoding::FaceEncoding;
pub use error::ValidationError;
pub use identity::{validate_identity_number, IdentityNumber, IDENTITY_NUMBER_LEN};
pub use image::{validate_image, ImageAsset, IMAGE_CONTENT_TYPE_PREFIX, MAX_IMAGE_BYTES};
pub use outcome::MatchResult;
