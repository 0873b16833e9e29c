//! # Face Comparator
//!
//! Compares the submitted image (A) against the reference photo (B):
//!
//! 1. Decode A and encode it. Zero faces is [`FaceError::NoFaceInSubmitted`];
//!    B is not decoded in that case.
//! 2. Decode B and encode it. Zero faces is [`FaceError::NoFaceInReference`].
//! 3. The first face of A is the probe. It is compared against every face
//!    of B; any distance within tolerance is a match.
//! 4. Confidence is `1 - min(distance)`, clamped to `[0, 1]`.
//!
//! Encodings of different dimensions are never compared; that is a
//! [`FaceError::Processing`].

use std::sync::Arc;

use facematch_core::FaceEncoding;
use image::RgbImage;

use crate::encoder::FaceEncoder;
use crate::error::FaceError;

/// Default maximum distance for two faces to be considered the same person.
pub const DEFAULT_TOLERANCE: f64 = 0.6;

/// Outcome of one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Whether any reference face is within tolerance of the probe.
    pub is_match: bool,
    /// `1 - min(distance)`, clamped to `[0, 1]`. Zero with no candidates.
    pub confidence: f64,
}

/// Apply the match rule to the probe-to-candidate distances.
pub fn decide(distances: &[f64], tolerance: f64) -> Decision {
    let is_match = distances.iter().any(|d| *d <= tolerance);
    let confidence = distances
        .iter()
        .copied()
        .reduce(f64::min)
        .map_or(0.0, |min| (1.0 - min).clamp(0.0, 1.0));
    Decision {
        is_match,
        confidence,
    }
}

/// Compares two encoded images using a shared [`FaceEncoder`].
#[derive(Debug, Clone)]
pub struct FaceComparator {
    encoder: Arc<dyn FaceEncoder>,
    tolerance: f64,
}

impl FaceComparator {
    /// Create a comparator with the given match tolerance.
    pub fn new(encoder: Arc<dyn FaceEncoder>, tolerance: f64) -> Self {
        Self { encoder, tolerance }
    }

    /// The configured match tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Compare the submitted image bytes against the reference photo bytes.
    ///
    /// CPU-bound; run on the blocking pool from async code.
    pub fn compare(&self, submitted: &[u8], reference: &[u8]) -> Result<Decision, FaceError> {
        let probe = {
            let image = decode(submitted, "submitted image")?;
            let mut faces = self.encoder.encode(&image)?;
            if faces.is_empty() {
                return Err(FaceError::NoFaceInSubmitted);
            }
            if faces.len() > 1 {
                tracing::debug!(
                    faces = faces.len(),
                    "submitted image has several faces, using the first"
                );
            }
            faces.swap_remove(0)
        };

        let candidates = {
            let image = decode(reference, "reference photo")?;
            self.encoder.encode(&image)?
        };
        if candidates.is_empty() {
            return Err(FaceError::NoFaceInReference);
        }
        if candidates.len() > 1 {
            tracing::warn!(
                faces = candidates.len(),
                "reference photo has more than one face, matching against all"
            );
        }

        let distances = self.distances(&probe, &candidates)?;
        let decision = decide(&distances, self.tolerance);
        tracing::info!(
            is_match = decision.is_match,
            confidence = decision.confidence,
            candidates = candidates.len(),
            "face comparison complete"
        );
        Ok(decision)
    }

    fn distances(
        &self,
        probe: &FaceEncoding,
        candidates: &[FaceEncoding],
    ) -> Result<Vec<f64>, FaceError> {
        candidates
            .iter()
            .map(|candidate| {
                self.encoder.distance(probe, candidate).ok_or_else(|| {
                    FaceError::Processing(format!(
                        "encoding dimensions differ: submitted {}, reference {}",
                        probe.len(),
                        candidate.len()
                    ))
                })
            })
            .collect()
    }
}

fn decode(bytes: &[u8], what: &str) -> Result<RgbImage, FaceError> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgb8())
        .map_err(|e| FaceError::Processing(format!("cannot decode {what}: {e}")))
}
