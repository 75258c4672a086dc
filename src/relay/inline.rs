//! Inline image references
//!
//! An inline image is a `data:` URI carrying the media type and the
//! base64-encoded bytes, so a browser can render it without a second fetch.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use thiserror::Error;

/// Media type used when the payload signature is not recognized
pub const DEFAULT_MEDIA_TYPE: &str = "image/png";

/// Errors parsing a data URI back into an inline image
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InlineImageError {
    #[error("not a data URI")]
    NotDataUri,

    #[error("data URI is not base64 encoded")]
    NotBase64,

    #[error("data URI has no media type")]
    MissingMediaType,
}

/// A self-describing image: media type plus base64 payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    media_type: String,
    data: String,
}

impl InlineImage {
    /// Create an inline image from an explicit media type and base64 payload
    pub fn new(media_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            data: data.into(),
        }
    }

    /// Wrap a base64 payload, detecting the media type from its leading bytes
    ///
    /// The payload is kept verbatim so the resulting URI decodes to exactly
    /// the bytes that were supplied.
    pub fn from_base64(data: impl Into<String>) -> Self {
        let data = data.into();
        let media_type = sniff_media_type(&data).unwrap_or(DEFAULT_MEDIA_TYPE);
        Self::new(media_type, data)
    }

    /// Media type, e.g. `image/png`
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Base64 payload
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Render as `data:<media-type>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Decode the payload into raw image bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.data.as_bytes())
    }

    /// Parse a `data:<media-type>;base64,<payload>` URI
    pub fn parse_data_uri(uri: &str) -> Result<Self, InlineImageError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or(InlineImageError::NotDataUri)?;
        let (header, data) = rest.split_once(',').ok_or(InlineImageError::NotDataUri)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(InlineImageError::NotBase64)?;
        if media_type.is_empty() {
            return Err(InlineImageError::MissingMediaType);
        }
        Ok(Self::new(media_type, data))
    }
}

impl fmt::Display for InlineImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_data_uri())
    }
}

impl FromStr for InlineImage {
    type Err = InlineImageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_data_uri(s)
    }
}

/// Detect the image format from the first bytes of a base64 payload
fn sniff_media_type(data: &str) -> Option<&'static str> {
    // 16 base64 chars = 12 bytes, enough for the RIFF/WEBP header
    let bytes = data.as_bytes();
    let n = bytes.len().min(16) / 4 * 4;
    let head = BASE64.decode(&bytes[..n]).ok()?;

    if head.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if head.len() >= 12 && head.starts_with(b"RIFF") && &head[8..12] == b"WEBP" {
        Some("image/webp")
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some("image/gif")
    } else {
        None
    }
}
