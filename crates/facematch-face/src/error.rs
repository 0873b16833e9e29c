//! Face comparison errors.

/// Failure while comparing two face images.
#[derive(Debug, thiserror::Error)]
pub enum FaceError {
    /// The submitted image contains no detectable face.
    #[error("no face detected in the submitted image")]
    NoFaceInSubmitted,

    /// The reference photo contains no detectable face.
    #[error("no face detected in the reference photo")]
    NoFaceInReference,

    /// Decoding or encoding failed for a reason other than "no face".
    #[error("face processing failed: {0}")]
    Processing(String),
}

impl FaceError {
    /// Whether this is one of the "no face" outcomes.
    pub fn is_no_face(&self) -> bool {
        matches!(self, Self::NoFaceInSubmitted | Self::NoFaceInReference)
    }
}
