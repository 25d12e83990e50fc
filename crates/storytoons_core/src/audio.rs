//! Encoded speech artifacts.

use crate::ArtifactLocation;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storytoons_error::{ValidationError, ValidationErrorKind};

/// Audio codecs/containers produced by narration providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// MPEG-1 Audio Layer III
    #[default]
    #[display("mp3")]
    Mp3,
    /// RIFF WAVE
    #[display("wav")]
    Wav,
    /// Opus in an Ogg container
    #[display("opus")]
    Opus,
    /// AAC in ADTS framing
    #[display("aac")]
    Aac,
    /// Free Lossless Audio Codec
    #[display("flac")]
    Flac,
}

impl AudioFormat {
    /// MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Opus => "audio/ogg",
            AudioFormat::Aac => "audio/aac",
            AudioFormat::Flac => "audio/flac",
        }
    }

    /// File extension (without the dot).
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
            AudioFormat::Opus => "ogg",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
        }
    }

    /// Identify the format from leading magic bytes.
    ///
    /// # Examples
    ///
    /// ```
    /// use storytoons_core::AudioFormat;
    ///
    /// assert_eq!(AudioFormat::sniff(b"ID3\x04\x00rest"), Some(AudioFormat::Mp3));
    /// assert_eq!(AudioFormat::sniff(b"RIFF\x24\x00\x00\x00WAVEfmt "), Some(AudioFormat::Wav));
    /// assert_eq!(AudioFormat::sniff(b"hello"), None);
    /// ```
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => {
                Some(AudioFormat::Wav)
            }
            [b'f', b'L', b'a', b'C', ..] => Some(AudioFormat::Flac),
            [b'O', b'g', b'g', b'S', ..] => Some(AudioFormat::Opus),
            [b'I', b'D', b'3', ..] => Some(AudioFormat::Mp3),
            // ADTS sync word with layer bits zero
            [0xFF, second, ..] if second & 0xF6 == 0xF0 => Some(AudioFormat::Aac),
            // MPEG audio frame sync
            [0xFF, second, ..] if second & 0xE0 == 0xE0 => Some(AudioFormat::Mp3),
            _ => None,
        }
    }

    /// Map a `Content-Type` header value to a format.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence {
            "audio/mpeg" | "audio/mp3" => Some(AudioFormat::Mp3),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(AudioFormat::Wav),
            "audio/ogg" | "audio/opus" => Some(AudioFormat::Opus),
            "audio/aac" => Some(AudioFormat::Aac),
            "audio/flac" | "audio/x-flac" => Some(AudioFormat::Flac),
            _ => None,
        }
    }
}

/// Synthesized speech with its declared format.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct AudioArtifact {
    /// Encoded audio bytes
    bytes: Vec<u8>,
    /// Codec/container of the bytes
    format: AudioFormat,
    /// Where the audio was persisted, once stored
    location: Option<ArtifactLocation>,
}

impl AudioArtifact {
    /// Wrap encoded audio with a declared format.
    ///
    /// # Errors
    ///
    /// Fails if the audio is empty.
    #[track_caller]
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyArtifact(
                "audio",
            )));
        }
        Ok(Self {
            bytes,
            format,
            location: None,
        })
    }

    /// Wrap encoded audio, preferring the format sniffed from the bytes over
    /// the declared one.
    #[track_caller]
    pub fn detect(bytes: Vec<u8>, declared: AudioFormat) -> Result<Self, ValidationError> {
        let format = AudioFormat::sniff(&bytes).unwrap_or(declared);
        if format != declared {
            tracing::debug!(%declared, detected = %format, "Audio format differs from request");
        }
        Self::new(bytes, format)
    }

    /// Size of the encoded audio in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// Base64 encoding of the audio bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Record where the audio was persisted.
    pub fn with_location(mut self, location: ArtifactLocation) -> Self {
        self.location = Some(location);
        self
    }
}
