//! # facematch-face -- Face comparison
//!
//! Decides whether a submitted photo shows the same person as a reference
//! photo. Face detection and encoding sit behind the [`FaceEncoder`] trait;
//! this crate owns the decoding of both images, the ordering of the checks,
//! and the distance-based decision rule.
//!
//! With the `dlib` feature, [`dlib::DlibEncoder`] provides a native encoder
//! backed by dlib's face recognition models.

pub mod comparator;
#[cfg(feature = "dlib")]
pub mod dlib;
pub mod encoder;
pub mod error;

pub use comparator::{decide, Decision, FaceComparator, DEFAULT_TOLERANCE};
pub use encoder::FaceEncoder;
pub use error::FaceError;
