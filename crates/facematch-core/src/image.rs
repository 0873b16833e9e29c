//! # Image Assets
//!
//! Raw image payloads as they enter the pipeline: the user upload and the
//! reference photo fetched from the identity service. Only the declared
//! metadata is validated here; decoding happens in the face comparator.

use crate::error::ValidationError;

/// Content-type prefix every uploaded image must declare.
pub const IMAGE_CONTENT_TYPE_PREFIX: &str = "image/";

/// Maximum accepted image size (10 MiB).
pub const MAX_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// An image payload with its declared metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAsset {
    /// Raw encoded image bytes (JPEG, PNG, ...).
    pub bytes: Vec<u8>,
    /// Declared content type label, e.g. `image/jpeg`.
    pub content_type: Option<String>,
    /// Declared size in bytes. Advisory: absence is not an error.
    pub declared_size: Option<u64>,
}

impl ImageAsset {
    /// Wrap bytes received from an upload, declaring their length as the size.
    pub fn uploaded(bytes: Vec<u8>, content_type: Option<String>) -> Self {
        let declared_size = Some(bytes.len() as u64);
        Self {
            bytes,
            content_type,
            declared_size,
        }
    }

    /// Number of bytes actually held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// Image payloads can be megabytes; print only the metadata.
impl std::fmt::Debug for ImageAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAsset")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .field("declared_size", &self.declared_size)
            .finish()
    }
}

/// Validate an image's declared content type and size.
///
/// # Errors
///
/// - [`ValidationError::NotImage`] unless the content type starts with `image/`
/// - [`ValidationError::TooLarge`] if a declared size exceeds [`MAX_IMAGE_BYTES`]
pub fn validate_image(asset: &ImageAsset) -> Result<(), ValidationError> {
    let is_image = asset
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with(IMAGE_CONTENT_TYPE_PREFIX));
    if !is_image {
        return Err(ValidationError::NotImage {
            content_type: asset.content_type.clone(),
        });
    }

    if let Some(size) = asset.declared_size {
        if size > MAX_IMAGE_BYTES {
            return Err(ValidationError::TooLarge {
                size,
                limit: MAX_IMAGE_BYTES,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(content_type: Option<&str>, declared_size: Option<u64>) -> ImageAsset {
        ImageAsset {
            bytes: vec![0xFF, 0xD8, 0xFF],
            content_type: content_type.map(str::to_string),
            declared_size,
        }
    }

    #[test]
    fn accepts_image_types() {
        assert!(validate_image(&asset(Some("image/jpeg"), Some(3))).is_ok());
        assert!(validate_image(&asset(Some("image/png"), None)).is_ok());
    }

    #[test]
    fn rejects_non_image() {
        let err = validate_image(&asset(Some("application/pdf"), Some(3))).unwrap_err();
        assert_eq!(err.reason(), "not_image");
        let err = validate_image(&asset(None, Some(3))).unwrap_err();
        assert_eq!(err.reason(), "not_image");
        // Prefix match is case-sensitive, as declared by the client.
        let err = validate_image(&asset(Some("Image/png"), None)).unwrap_err();
        assert_eq!(err.reason(), "not_image");
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(validate_image(&asset(Some("image/jpeg"), Some(MAX_IMAGE_BYTES))).is_ok());
        let err =
            validate_image(&asset(Some("image/jpeg"), Some(MAX_IMAGE_BYTES + 1))).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooLarge {
                size: MAX_IMAGE_BYTES + 1,
                limit: MAX_IMAGE_BYTES
            }
        );
    }

    #[test]
    fn missing_size_is_not_an_error() {
        assert!(validate_image(&asset(Some("image/webp"), None)).is_ok());
    }

    #[test]
    fn type_checked_before_size() {
        let err = validate_image(&asset(Some("text/plain"), Some(MAX_IMAGE_BYTES * 2))).unwrap_err();
        assert_eq!(err.reason(), "not_image");
    }

    #[test]
    fn uploaded_declares_length() {
        let a = ImageAsset::uploaded(vec![1, 2, 3, 4], Some("image/png".into()));
        assert_eq!(a.declared_size, Some(4));
        assert_eq!(a.len(), 4);
        assert!(!a.is_empty());
    }

    #[test]
    fn debug_omits_bytes() {
        let a = ImageAsset::uploaded(vec![7; 64], Some("image/png".into()));
        let dbg = format!("{a:?}");
        assert!(dbg.contains("len: 64"), "got: {dbg}");
        assert!(!dbg.contains("[7, 7"), "got: {dbg}");
    }
}
