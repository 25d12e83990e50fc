//! Top-level error wrapper types.

use crate::{ConfigError, ServerError, StageError, StorageError, ValidationError};

/// Every error the StoryToons crates can produce.
///
/// # Examples
///
/// ```
/// use storytoons_error::{ConfigError, StorytoonsError};
///
/// let err: StorytoonsError = ConfigError::new("no such provider").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StorytoonsErrorKind {
    /// Pipeline stage failure
    #[from(StageError)]
    Stage(StageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Artifact storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Input or artifact validation error
    #[from(ValidationError)]
    Validation(ValidationError),
    /// HTTP surface error
    #[from(ServerError)]
    Server(ServerError),
}

/// StoryToons error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storytoons_error::{StorytoonsResult, ValidationError, ValidationErrorKind};
///
/// fn might_fail() -> StorytoonsResult<()> {
///     Err(ValidationError::new(ValidationErrorKind::EmptyDescription))?
/// }
///
/// assert!(might_fail().is_err());
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("StoryToons Error: {}", _0)]
pub struct StorytoonsError(Box<StorytoonsErrorKind>);

impl StorytoonsError {
    /// Create a new error from a kind.
    pub fn new(kind: StorytoonsErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StorytoonsErrorKind {
        &self.0
    }
}

impl<T> From<T> for StorytoonsError
where
    T: Into<StorytoonsErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for StoryToons operations.
pub type StorytoonsResult<T> = std::result::Result<T, StorytoonsError>;

/// Result type for a single pipeline stage.
pub type StageResult<T> = std::result::Result<T, StageError>;
