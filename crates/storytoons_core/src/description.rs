//! User-supplied image descriptions.

use serde::{Deserialize, Serialize};
use storytoons_error::{ValidationError, ValidationErrorKind};

/// Free-form text describing the image to generate.
///
/// The only rule is non-emptiness: a description made of whitespace is
/// rejected, so the pipeline never submits it to a provider.
///
/// # Examples
///
/// ```
/// use storytoons_core::Description;
///
/// let description = Description::new("  a robot exploring a forest ").unwrap();
/// assert_eq!(description.as_str(), "a robot exploring a forest");
/// assert!(Description::new("   ").is_err());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(try_from = "String", into = "String")]
pub struct Description(String);

impl Description {
    /// Validate and wrap a description.
    #[track_caller]
    pub fn new(text: impl AsRef<str>) -> Result<Self, ValidationError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::EmptyDescription));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The description text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Description {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Description> for String {
    fn from(value: Description) -> Self {
        value.0
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
