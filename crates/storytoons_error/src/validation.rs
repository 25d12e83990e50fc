//! Input and artifact validation errors.

/// Kinds of validation errors raised when constructing pipeline values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ValidationErrorKind {
    /// Description was empty or whitespace only
    #[display("description is empty")]
    EmptyDescription,
    /// Narrative text was empty or whitespace only
    #[display("narrative text is empty")]
    EmptyNarrative,
    /// Artifact had no content
    #[display("{} artifact is empty", _0)]
    EmptyArtifact(&'static str),
    /// Bytes are not a decodable raster image
    #[display("not a decodable image: {}", _0)]
    UndecodableImage(String),
    /// Option value out of range
    #[display("invalid option: {}", _0)]
    InvalidOption(String),
}

/// Validation error with location tracking.
///
/// # Examples
///
/// ```
/// use storytoons_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::EmptyDescription);
/// assert!(err.to_string().contains("description is empty"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new validation error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
