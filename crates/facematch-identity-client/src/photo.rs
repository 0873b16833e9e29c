//! # Identity Photo Lookup
//!
//! | Method | Body | Response |
//! |--------|------|----------|
//! | POST | JSON `{"CPF": "<11 digits>", "TipoImagem": 1}` | JSON `{"Imagem": "<base64>"}` |
//!
//! Bearer-authenticated with the cached credential. A 404 is a first-class
//! "no photo on file" outcome, not a failure to retry.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use facematch_core::IdentityNumber;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::credentials::Credential;
use crate::error::{body_excerpt, LookupError};

/// Image-type selector sent with every lookup (frontal face photo).
pub const PHOTO_IMAGE_TYPE: u8 = 1;

#[derive(Debug, Serialize)]
struct PhotoLookupRequest<'a> {
    #[serde(rename = "CPF")]
    identity_number: &'a str,
    #[serde(rename = "TipoImagem")]
    image_type: u8,
}

#[derive(Debug, Deserialize)]
struct PhotoLookupResponse {
    #[serde(rename = "Imagem", default)]
    image: Option<String>,
}

/// Client for the identity-photo lookup endpoint.
#[derive(Debug, Clone)]
pub struct PhotoClient {
    http: reqwest::Client,
    lookup_url: Url,
    timeout: Duration,
}

impl PhotoClient {
    pub(crate) fn new(http: reqwest::Client, lookup_url: Url, timeout: Duration) -> Self {
        Self {
            http,
            lookup_url,
            timeout,
        }
    }

    /// Fetch the photo on file for `identity` and return the decoded bytes.
    ///
    /// Calls `POST {lookup_url}`. No retry.
    pub async fn fetch_identity_photo(
        &self,
        identity: &IdentityNumber,
        credential: &Credential,
    ) -> Result<Vec<u8>, LookupError> {
        tracing::info!(identity = %identity, "fetching identity photo");

        let request = PhotoLookupRequest {
            identity_number: identity.as_str(),
            image_type: PHOTO_IMAGE_TYPE,
        };

        let resp = self
            .http
            .post(self.lookup_url.clone())
            .bearer_auth(credential.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            tracing::info!(identity = %identity, "no photo on file");
            return Err(LookupError::NotFound {
                identity: identity.masked(),
            });
        }
        if !status.is_success() {
            let body = body_excerpt(resp).await;
            tracing::warn!(%status, "photo lookup failed");
            return Err(LookupError::Upstream {
                endpoint: self.lookup_url.to_string(),
                status: Some(status.as_u16()),
                reason: format!("HTTP {status}: {body}"),
            });
        }

        let body = resp.bytes().await.map_err(|e| self.transport_error(e))?;
        let parsed: PhotoLookupResponse = serde_json::from_slice(&body)
            .map_err(|e| self.malformed(format!("response is not valid JSON: {e}")))?;

        let encoded = match parsed.image {
            Some(image) if !image.trim().is_empty() => image,
            _ => return Err(self.malformed("Imagem field missing from response".into())),
        };

        let image = decode_image(&encoded)
            .map_err(|e| self.malformed(format!("Imagem is not valid base64: {e}")))?;
        tracing::info!(bytes = image.len(), "identity photo obtained");

        Ok(image)
    }

    fn transport_error(&self, e: reqwest::Error) -> LookupError {
        if e.is_timeout() {
            LookupError::Timeout {
                endpoint: self.lookup_url.to_string(),
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            LookupError::Upstream {
                endpoint: self.lookup_url.to_string(),
                status: None,
                reason: e.to_string(),
            }
        }
    }

    fn malformed(&self, reason: String) -> LookupError {
        LookupError::MalformedResponse {
            endpoint: self.lookup_url.to_string(),
            reason,
        }
    }
}

/// Decode a standard base64 payload, tolerating embedded line breaks.
fn decode_image(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    STANDARD.decode(compact)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_service_field_names() {
        let req = PhotoLookupRequest {
            identity_number: "12345678909",
            image_type: PHOTO_IMAGE_TYPE,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"CPF": "12345678909", "TipoImagem": 1}));
    }

    #[test]
    fn decode_tolerates_line_breaks() {
        assert_eq!(decode_image("aGVs\nbG8=\r\n").unwrap(), b"hello");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_image("not*base64!").is_err());
    }
}
