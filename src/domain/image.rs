//! Uploaded catch photos.
//!
//! The browser hands over images as base64 text (optionally wrapped in a
//! `data:` URI). [`ImageUpload`] keeps that transport encoding as-is: the
//! identification request embeds it verbatim and saved entries reference
//! it as a self-contained data URI.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Rejection reasons for an uploaded image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageError {
    /// The declared MIME type is not an `image/*` type.
    #[error("unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    /// The payload is not valid standard base64.
    #[error("image data is not valid base64")]
    InvalidEncoding,

    /// The payload is empty.
    #[error("image data is empty")]
    Empty,

    /// The data URI is not of the form `data:<mime>;base64,<data>`.
    #[error("malformed data uri")]
    MalformedDataUri,
}

/// A photo awaiting (or used for) identification.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    mime_type: String,
    data: String,
}

impl ImageUpload {
    /// Builds an upload from base64 data and its MIME type.
    ///
    /// Only the transport encoding is checked here; whether the bytes are
    /// a usable photo is left to the identification service.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if the MIME type is not `image/*`, or the data
    /// is empty or not valid base64.
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Result<Self, ImageError> {
        let data = data.into().trim().to_string();
        let mime_type = mime_type.into().trim().to_ascii_lowercase();

        if !mime_type.starts_with("image/") {
            return Err(ImageError::UnsupportedMimeType(mime_type));
        }
        if data.is_empty() {
            return Err(ImageError::Empty);
        }
        BASE64_STANDARD
            .decode(data.as_bytes())
            .map_err(|_| ImageError::InvalidEncoding)?;

        Ok(Self { mime_type, data })
    }

    /// Parses a `data:<mime>;base64,<data>` URI as produced by a browser
    /// `FileReader` or canvas capture.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::MalformedDataUri`] if the URI shape is wrong, or
    /// any error of [`ImageUpload::new`] for its parts.
    pub fn from_data_uri(uri: &str) -> Result<Self, ImageError> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or(ImageError::MalformedDataUri)?;
        let (header, data) = rest.split_once(',').ok_or(ImageError::MalformedDataUri)?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or(ImageError::MalformedDataUri)?;
        Self::new(data, mime_type)
    }

    /// Encodes raw image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError`] if the MIME type is not `image/*` or `bytes`
    /// is empty.
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self, ImageError> {
        Self::new(BASE64_STANDARD.encode(bytes), mime_type)
    }

    /// Returns the MIME type (lower-cased).
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the base64-encoded image data.
    #[must_use]
    pub fn base64_data(&self) -> &str {
        &self.data
    }

    /// Returns the self-contained `data:` URI for this image.
    #[must_use]
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("mime_type", &self.mime_type)
            .field("base64_len", &self.data.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_mime_types() {
        let Ok(image) = ImageUpload::from_bytes(b"\xff\xd8\xff\xe0", "image/JPEG") else {
            panic!("jpeg should be accepted");
        };
        assert_eq!(image.mime_type(), "image/jpeg");
        assert_eq!(image.base64_data(), "/9j/4A==");
    }

    #[test]
    fn rejects_non_image_mime_types() {
        let result = ImageUpload::new("aGVsbG8=", "text/plain");
        assert_eq!(
            result,
            Err(ImageError::UnsupportedMimeType("text/plain".to_string()))
        );
    }

    #[test]
    fn rejects_invalid_base64() {
        assert_eq!(
            ImageUpload::new("not base64!", "image/png"),
            Err(ImageError::InvalidEncoding)
        );
        assert_eq!(ImageUpload::new("  ", "image/png"), Err(ImageError::Empty));
    }

    #[test]
    fn data_uri_round_trip() {
        let Ok(image) = ImageUpload::new("iVBORw0KGgo=", "image/png") else {
            panic!("valid png");
        };
        let uri = image.data_uri();
        assert_eq!(uri, "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(ImageUpload::from_data_uri(&uri), Ok(image));
    }

    #[test]
    fn malformed_data_uris_are_rejected() {
        for uri in ["image/png;base64,AAAA", "data:image/png,AAAA", "data:image/png;base64"] {
            assert_eq!(
                ImageUpload::from_data_uri(uri),
                Err(ImageError::MalformedDataUri),
                "{uri}"
            );
        }
    }

    #[test]
    fn debug_does_not_dump_payload() {
        let Ok(image) = ImageUpload::new("iVBORw0KGgo=", "image/png") else {
            panic!("valid png");
        };
        let debug = format!("{image:?}");
        assert!(!debug.contains("iVBORw0KGgo="));
        assert!(debug.contains("base64_len"));
    }
}
