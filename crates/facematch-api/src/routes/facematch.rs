//! # Face Match Endpoint
//!
//! `POST /facematch` with `multipart/form-data` fields `image` (file) and
//! `cpf` (text). Compares the uploaded face against the photo on file for
//! the identity number.

use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use facematch_core::MatchResult;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_multipart, FaceMatchForm};
use crate::state::AppState;

/// Successful comparison response. Returned whether or not the faces match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaceMatchResponse {
    #[serde(rename = "match")]
    pub is_match: bool,
    /// Similarity in `[0, 1]`, 3 decimal places.
    pub confidence: f64,
    pub message: String,
    /// Seconds spent in the pipeline, 2 decimal places.
    pub processing_time: f64,
    /// Seconds since the Unix epoch.
    pub timestamp: f64,
}

impl From<MatchResult> for FaceMatchResponse {
    fn from(result: MatchResult) -> Self {
        Self {
            is_match: result.is_match,
            confidence: result.confidence,
            message: result.message().to_string(),
            processing_time: result.processing_time_secs,
            timestamp: result.unix_timestamp(),
        }
    }
}

/// Build the face match router.
pub fn router() -> Router<AppState> {
    Router::new().route("/facematch", post(face_match))
}

async fn face_match(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FaceMatchResponse>, AppError> {
    let span = tracing::info_span!("face_match", request_id = %Uuid::new_v4());
    async move {
        let form = FaceMatchForm::from_multipart(extract_multipart(multipart)?).await?;
        let result = state
            .orchestrator
            .run(&form.identity_number, form.image)
            .await?;
        Ok(Json(FaceMatchResponse::from(result)))
    }
    .instrument(span)
    .await
}
