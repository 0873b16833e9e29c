//! # Multipart Extraction
//!
//! Reads the `multipart/form-data` upload of `POST /facematch` into a
//! typed [`FaceMatchForm`], mapping transport problems to [`AppError`].

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use facematch_core::{ImageAsset, MAX_IMAGE_BYTES};

use crate::error::AppError;

/// Form field carrying the uploaded image file.
pub const IMAGE_FIELD: &str = "image";
/// Form field carrying the identity number.
pub const IDENTITY_FIELD: &str = "cpf";

/// The two fields of a face match upload.
#[derive(Debug)]
pub struct FaceMatchForm {
    pub image: ImageAsset,
    pub identity_number: String,
}

/// Unwrap the multipart extractor, mapping a rejection (wrong content type,
/// missing boundary) to [`AppError::BadRequest`].
pub fn extract_multipart(
    result: Result<Multipart, MultipartRejection>,
) -> Result<Multipart, AppError> {
    result.map_err(|err| AppError::BadRequest(err.body_text()))
}

impl FaceMatchForm {
    /// Read every field of the upload. Unknown fields are skipped; a
    /// repeated field keeps its last value.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut image = None;
        let mut identity_number = None;

        while let Some(field) = multipart.next_field().await.map_err(field_error)? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(IMAGE_FIELD) => {
                    let content_type = field.content_type().map(str::to_owned);
                    let bytes = field.bytes().await.map_err(field_error)?;
                    image = Some(ImageAsset::uploaded(bytes.to_vec(), content_type));
                }
                Some(IDENTITY_FIELD) => {
                    identity_number = Some(field.text().await.map_err(field_error)?);
                }
                other => {
                    tracing::debug!(field = ?other, "ignoring unknown form field");
                }
            }
        }

        let image = image.ok_or_else(|| missing(IMAGE_FIELD))?;
        let identity_number = identity_number.ok_or_else(|| missing(IDENTITY_FIELD))?;
        Ok(Self {
            image,
            identity_number,
        })
    }
}

fn missing(field: &str) -> AppError {
    AppError::BadRequest(format!("missing form field `{field}`"))
}

fn field_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::Validation {
            message: format!("upload exceeds the {MAX_IMAGE_BYTES} byte image limit"),
            reason: "too_large",
        }
    } else {
        AppError::BadRequest(err.body_text())
    }
}
