//! # Face Match Orchestration
//!
//! Runs one comparison request through the pipeline:
//!
//! ```text
//! Validating → AcquiringCredential → FetchingReference → Comparing → Done
//!      └──────────────┴──────────────────┴─────────────────┴──→ Failed
//! ```
//!
//! 1. **Validating**: image metadata, then the identity number. A failure
//!    here happens before any network call.
//! 2. **AcquiringCredential**: cached bearer credential, or one exchange.
//! 3. **FetchingReference**: the photo on file for the identity number.
//! 4. **Comparing**: decode and encode both images on the blocking pool.
//!
//! Each stage is attempted once. The first failure ends the run and is
//! returned as-is, tagged with its origin.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use facematch_core::{
    validate_identity_number, validate_image, ImageAsset, MatchResult, ValidationError,
};
use facematch_face::{FaceComparator, FaceError};
use facematch_identity_client::{AuthError, IdentityServiceClient, LookupError};

/// Position of a run in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Validating,
    AcquiringCredential,
    FetchingReference,
    Comparing,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validating => "validating",
            Self::AcquiringCredential => "acquiring_credential",
            Self::FetchingReference => "fetching_reference",
            Self::Comparing => "comparing",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a run failed. Each variant keeps the error from the stage that
/// raised it.
#[derive(Debug, thiserror::Error)]
pub enum FaceMatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Face(#[from] FaceError),
    /// The blocking comparison task panicked or was cancelled.
    #[error("comparison task failed: {0}")]
    Task(String),
}

impl FaceMatchError {
    /// The stage that raised this error.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Validation(_) => PipelineStage::Validating,
            Self::Auth(_) => PipelineStage::AcquiringCredential,
            Self::Lookup(_) => PipelineStage::FetchingReference,
            Self::Face(_) | Self::Task(_) => PipelineStage::Comparing,
        }
    }

    /// Whether the same request may succeed if sent again. Only identity
    /// service timeouts and server-side failures qualify.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_transient(),
            Self::Lookup(e) => e.is_transient(),
            Self::Validation(_) | Self::Face(_) | Self::Task(_) => false,
        }
    }
}

/// Drives the face match pipeline. Cheap to clone; clones share the
/// credential cache and the encoder.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    identity: IdentityServiceClient,
    comparator: FaceComparator,
}

impl Orchestrator {
    pub fn new(identity: IdentityServiceClient, comparator: FaceComparator) -> Self {
        Self {
            identity,
            comparator,
        }
    }

    /// The identity service client, for inspecting the credential cache.
    pub fn identity(&self) -> &IdentityServiceClient {
        &self.identity
    }

    /// Run the full pipeline for one request.
    pub async fn run(
        &self,
        identity_raw: &str,
        image: ImageAsset,
    ) -> Result<MatchResult, FaceMatchError> {
        let started = Instant::now();
        let mut stage = PipelineStage::Validating;

        match self.run_stages(&mut stage, identity_raw, image).await {
            Ok((is_match, confidence)) => {
                advance(&mut stage, PipelineStage::Done);
                let result = MatchResult::new(is_match, confidence, started.elapsed(), Utc::now());
                tracing::info!(
                    is_match = result.is_match,
                    confidence = result.confidence,
                    processing_time_secs = result.processing_time_secs,
                    "face match complete"
                );
                Ok(result)
            }
            Err(err) => {
                tracing::warn!(
                    stage = %stage,
                    transient = err.is_transient(),
                    error = %err,
                    "face match failed"
                );
                advance(&mut stage, PipelineStage::Failed);
                Err(err)
            }
        }
    }

    async fn run_stages(
        &self,
        stage: &mut PipelineStage,
        identity_raw: &str,
        image: ImageAsset,
    ) -> Result<(bool, f64), FaceMatchError> {
        validate_image(&image)?;
        let identity = validate_identity_number(identity_raw)?;
        tracing::info!(identity = %identity, bytes = image.len(), "request validated");

        advance(stage, PipelineStage::AcquiringCredential);
        let credential = self.identity.credentials().acquire().await?;

        advance(stage, PipelineStage::FetchingReference);
        let reference = self
            .identity
            .photos()
            .fetch_identity_photo(&identity, &credential)
            .await?;

        advance(stage, PipelineStage::Comparing);
        let comparator = self.comparator.clone();
        let submitted = image.bytes;
        let decision =
            tokio::task::spawn_blocking(move || comparator.compare(&submitted, &reference))
                .await
                .map_err(|e| FaceMatchError::Task(e.to_string()))??;

        Ok((decision.is_match, decision.confidence))
    }
}

fn advance(stage: &mut PipelineStage, next: PipelineStage) {
    tracing::debug!(from = %stage, to = %next, "pipeline stage");
    *stage = next;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(PipelineStage::AcquiringCredential.to_string(), "acquiring_credential");
        assert!(PipelineStage::Done.is_terminal());
        assert!(PipelineStage::Failed.is_terminal());
        assert!(!PipelineStage::Comparing.is_terminal());
    }

    #[test]
    fn errors_know_their_stage() {
        let err: FaceMatchError = ValidationError::Degenerate.into();
        assert_eq!(err.stage(), PipelineStage::Validating);

        let err: FaceMatchError = LookupError::NotFound {
            identity: "123***09".into(),
        }
        .into();
        assert_eq!(err.stage(), PipelineStage::FetchingReference);

        let err: FaceMatchError = FaceError::NoFaceInSubmitted.into();
        assert_eq!(err.stage(), PipelineStage::Comparing);
    }

    #[test]
    fn only_upstream_outages_are_transient() {
        let err: FaceMatchError = AuthError::Timeout {
            endpoint: "http://t".into(),
            timeout_secs: 30,
        }
        .into();
        assert!(err.is_transient());

        let err: FaceMatchError = LookupError::Upstream {
            endpoint: "http://l".into(),
            status: Some(503),
            reason: "unavailable".into(),
        }
        .into();
        assert!(err.is_transient());

        let err: FaceMatchError = LookupError::NotFound {
            identity: "123***09".into(),
        }
        .into();
        assert!(!err.is_transient());

        let err: FaceMatchError = ValidationError::Degenerate.into();
        assert!(!err.is_transient());
        assert!(!FaceMatchError::from(FaceError::NoFaceInReference).is_transient());
    }
}
