//! The face-encoding capability.
//!
//! An encoder turns a decoded RGB image into one fixed-length vector per
//! detected face. The comparator is agnostic to how that happens; the dlib
//! backend is one implementation, test doubles are another.

use facematch_core::FaceEncoding;
use image::RgbImage;

use crate::error::FaceError;

/// Detects faces in an image and encodes each as a vector.
///
/// Implementations are CPU-bound and synchronous. Callers on an async
/// runtime must invoke them from the blocking pool.
pub trait FaceEncoder: std::fmt::Debug + Send + Sync {
    /// Encode every face found in `image`. Zero faces is `Ok(vec![])`,
    /// not an error.
    fn encode(&self, image: &RgbImage) -> Result<Vec<FaceEncoding>, FaceError>;

    /// Distance between two encodings. Euclidean unless overridden.
    /// `None` when the encodings are not comparable.
    fn distance(&self, a: &FaceEncoding, b: &FaceEncoding) -> Option<f64> {
        a.euclidean_distance(b)
    }
}
