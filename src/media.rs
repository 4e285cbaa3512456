//! Inbound image handling
//!
//! Images arrive base64-encoded (optionally as a data URL). They are decoded
//! and checked against the configured allow-list and size ceiling before any
//! model call is made.

use crate::{Error, Result};
use base64::Engine as _;

const MEGABYTE: usize = 1024 * 1024;

/// Room for the JSON envelope around a base64 image.
const BODY_OVERHEAD: usize = 64 * 1024;

/// Request body size that fits `max_bytes` of image as base64, or `None` on overflow.
pub fn encoded_body_limit(max_bytes: usize) -> Option<usize> {
    max_bytes.div_ceil(3).checked_mul(4)?.checked_add(BODY_OVERHEAD)
}

/// Byte ceiling for an image limit given in megabytes, checked end to end.
pub fn checked_max_bytes(max_image_size_mb: usize) -> Option<usize> {
    let max_bytes = max_image_size_mb.checked_mul(MEGABYTE)?;
    encoded_body_limit(max_bytes).map(|_| max_bytes)
}

/// Decoded image bytes plus their declared mime type.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaAttachment {
    bytes: Vec<u8>,
    mime_type: String,
}

impl MediaAttachment {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 form used for `inlineData` parts.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Limits applied to every inbound image.
#[derive(Debug, Clone)]
pub struct MediaPolicy {
    pub supported_types: Vec<String>,
    pub max_bytes: usize,
}

impl MediaPolicy {
    pub fn new(supported_types: Vec<String>, max_image_size_mb: usize) -> Self {
        Self {
            supported_types,
            max_bytes: max_image_size_mb.saturating_mul(MEGABYTE),
        }
    }

    /// Largest request body accepted on image routes.
    pub fn body_limit(&self) -> usize {
        encoded_body_limit(self.max_bytes).unwrap_or(usize::MAX)
    }

    /// Validate and decode a base64 image payload.
    pub fn decode(&self, data: &str, mime_type: &str) -> Result<MediaAttachment> {
        if !self.supported_types.iter().any(|t| t == mime_type) {
            tracing::warn!("Unsupported image type: {}", mime_type);
            return Err(Error::MediaRejected(format!(
                "Unsupported image type. Supported types: {}",
                self.supported_types.join(", ")
            )));
        }

        let payload = strip_data_url_prefix(data);
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| {
                tracing::warn!("Invalid base64 image data: {}", e);
                Error::MediaRejected("Invalid image data".to_string())
            })?;

        if bytes.len() > self.max_bytes {
            tracing::warn!(
                "Image too large: {:.2} MB",
                bytes.len() as f64 / (1024.0 * 1024.0)
            );
            return Err(Error::MediaRejected(format!(
                "Image too large. Maximum size: {} MB",
                self.max_bytes / MEGABYTE
            )));
        }

        Ok(MediaAttachment {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }
}

/// Drop a `data:<mime>;base64,` prefix if present.
fn strip_data_url_prefix(data: &str) -> &str {
    data.split_once("base64,").map_or(data, |(_, rest)| rest)
}
