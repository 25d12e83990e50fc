//! Raster image artifacts.

use crate::ArtifactLocation;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use image::GenericImageView;
use serde::{Deserialize, Serialize};
use storytoons_error::{ValidationError, ValidationErrorKind};

/// Raster formats accepted from image synthesis providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Portable Network Graphics
    #[display("png")]
    Png,
    /// JPEG
    #[display("jpeg")]
    Jpeg,
    /// WebP
    #[display("webp")]
    WebP,
    /// GIF
    #[display("gif")]
    Gif,
}

impl ImageFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
        }
    }

    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::WebP => "webp",
            ImageFormat::Gif => "gif",
        }
    }

    fn to_image_crate(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
            ImageFormat::Gif => image::ImageFormat::Gif,
        }
    }

    fn from_image_crate(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Png => Some(ImageFormat::Png),
            image::ImageFormat::Jpeg => Some(ImageFormat::Jpeg),
            image::ImageFormat::WebP => Some(ImageFormat::WebP),
            image::ImageFormat::Gif => Some(ImageFormat::Gif),
            _ => None,
        }
    }
}

/// A generated raster image.
///
/// Construction decodes the bytes, so an `ImageArtifact` always holds a
/// valid image in a supported format.
///
/// # Examples
///
/// ```
/// use storytoons_core::ImageArtifact;
///
/// assert!(ImageArtifact::from_bytes(Vec::new()).is_err());
/// assert!(ImageArtifact::from_bytes(b"definitely not a png".to_vec()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ImageArtifact {
    /// Encoded image bytes
    bytes: Vec<u8>,
    /// Detected format
    format: ImageFormat,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Where the image was persisted, once stored
    location: Option<ArtifactLocation>,
}

impl ImageArtifact {
    /// Decode and wrap encoded image bytes.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are empty, in an unsupported format, or do not decode.
    #[track_caller]
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyArtifact(
                "image",
            )));
        }

        let detected = image::guess_format(&bytes).map_err(|e| {
            ValidationError::new(ValidationErrorKind::UndecodableImage(e.to_string()))
        })?;
        let format = ImageFormat::from_image_crate(detected).ok_or_else(|| {
            ValidationError::new(ValidationErrorKind::UndecodableImage(format!(
                "unsupported format {:?}",
                detected
            )))
        })?;

        let decoded = image::load_from_memory_with_format(&bytes, format.to_image_crate())
            .map_err(|e| {
                ValidationError::new(ValidationErrorKind::UndecodableImage(e.to_string()))
            })?;
        let (width, height) = decoded.dimensions();

        tracing::debug!(%format, width, height, size = bytes.len(), "Decoded image artifact");

        Ok(Self {
            bytes,
            format,
            width,
            height,
            location: None,
        })
    }

    /// Size of the encoded image in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Base64 encoding of the image bytes, for transport to remote endpoints.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// `data:` URL embedding the image.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime_type(), self.to_base64())
    }

    /// Record where the image was persisted.
    pub fn with_location(mut self, location: ArtifactLocation) -> Self {
        self.location = Some(location);
        self
    }
}
