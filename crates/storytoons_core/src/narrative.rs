//! Narrative text produced by the image understanding stage.

use serde::{Deserialize, Serialize};
use storytoons_error::{ValidationError, ValidationErrorKind};

/// A non-empty UTF-8 story describing an image.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct NarrativeText(String);

impl NarrativeText {
    /// Validate and wrap model output. Surrounding whitespace is dropped.
    #[track_caller]
    pub fn new(text: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyNarrative));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The story text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the story.
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl TryFrom<String> for NarrativeText {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NarrativeText> for String {
    fn from(value: NarrativeText) -> Self {
        value.0
    }
}

impl AsRef<str> for NarrativeText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
