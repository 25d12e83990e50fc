//! Stage failure types.
//!
//! Every pipeline stage reports failures as a [`StageError`]: the [`Stage`]
//! that failed plus a [`StageErrorKind`] from the fixed failure taxonomy.
//! Provider adapters convert transport, status and decode errors into this
//! type before returning, so nothing untyped crosses a stage boundary.

use serde::{Deserialize, Serialize};

/// One step of the describe → image → story → narration pipeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Text-to-image generation
    #[display("image synthesis")]
    Synthesis,
    /// Image-to-text story writing
    #[display("image understanding")]
    Understanding,
    /// Text-to-speech narration
    #[display("narration")]
    Narration,
}

impl Stage {
    /// Human-readable purpose of the stage, used in user-facing error messages.
    pub fn purpose(&self) -> &'static str {
        match self {
            Stage::Synthesis => "Generating the comic image",
            Stage::Understanding => "Writing the story",
            Stage::Narration => "Narrating the story",
        }
    }

    /// The failure kind native to this stage, used for provider-level errors
    /// that are neither authorization nor transport faults.
    pub fn failure(&self, cause: impl Into<String>) -> StageErrorKind {
        let cause = cause.into();
        match self {
            Stage::Synthesis => StageErrorKind::Generation(cause),
            Stage::Understanding => StageErrorKind::Understanding(cause),
            Stage::Narration => StageErrorKind::Narration(cause),
        }
    }
}

/// Failure taxonomy for pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StageErrorKind {
    /// Image synthesis failed (remote error, bad status, undecodable image)
    #[display("{}", _0)]
    Generation(String),
    /// Image understanding failed (remote error, empty or unusable output)
    #[display("{}", _0)]
    Understanding(String),
    /// Narration failed (remote error, malformed or empty audio)
    #[display("{}", _0)]
    Narration(String),
    /// Credential missing or rejected by the provider
    #[display("{}", _0)]
    Authorization(String),
    /// Network-level fault (connect, timeout, broken body)
    #[display("{}", _0)]
    Transport(String),
    /// Produced artifact could not be persisted or read back
    #[display("{}", _0)]
    Storage(String),
}

impl StageErrorKind {
    /// Taxonomy name of this failure kind.
    pub fn name(&self) -> &'static str {
        match self {
            StageErrorKind::Generation(_) => "GenerationFailure",
            StageErrorKind::Understanding(_) => "UnderstandingFailure",
            StageErrorKind::Narration(_) => "NarrationFailure",
            StageErrorKind::Authorization(_) => "AuthorizationFailure",
            StageErrorKind::Transport(_) => "TransportFailure",
            StageErrorKind::Storage(_) => "StorageFailure",
        }
    }

    /// The underlying cause string.
    pub fn cause(&self) -> &str {
        match self {
            StageErrorKind::Generation(cause)
            | StageErrorKind::Understanding(cause)
            | StageErrorKind::Narration(cause)
            | StageErrorKind::Authorization(cause)
            | StageErrorKind::Transport(cause)
            | StageErrorKind::Storage(cause) => cause,
        }
    }
}

/// A typed, recoverable stage failure with source location tracking.
///
/// # Examples
///
/// ```
/// use storytoons_error::{Stage, StageError, StageErrorKind};
///
/// let err = StageError::from_status(Stage::Synthesis, 500, "upstream exploded");
/// assert!(matches!(err.kind, StageErrorKind::Generation(_)));
/// assert!(err.is_transient());
/// assert!(err.to_string().contains("Generating the comic image"));
/// ```
#[derive(Debug, Clone, derive_more::Error)]
pub struct StageError {
    /// Stage that produced the failure
    pub stage: Stage,
    /// The kind of failure
    pub kind: StageErrorKind,
    /// HTTP status returned by the provider, if any
    pub status: Option<u16>,
    /// Line number where the error was created
    pub line: u32,
    /// File where the error was created
    pub file: &'static str,
}

impl std::fmt::Display for StageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} failed ({}): {} at line {} in {}",
            self.stage.purpose(),
            self.kind.name(),
            self.kind,
            self.line,
            self.file
        )
    }
}

impl StageError {
    /// Create a new stage error with automatic location tracking.
    #[track_caller]
    pub fn new(stage: Stage, kind: StageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            stage,
            kind,
            status: None,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Create a failure of the stage's native kind.
    #[track_caller]
    pub fn failure(stage: Stage, cause: impl Into<String>) -> Self {
        Self::new(stage, stage.failure(cause))
    }

    /// Create an authorization failure.
    #[track_caller]
    pub fn authorization(stage: Stage, cause: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::Authorization(cause.into()))
    }

    /// Create a transport failure.
    #[track_caller]
    pub fn transport(stage: Stage, cause: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::Transport(cause.into()))
    }

    /// Create a storage failure.
    #[track_caller]
    pub fn storage(stage: Stage, cause: impl Into<String>) -> Self {
        Self::new(stage, StageErrorKind::Storage(cause.into()))
    }

    /// Classify a non-success provider status.
    ///
    /// 401 and 403 are authorization failures; everything else is a failure
    /// of the stage's native kind.
    #[track_caller]
    pub fn from_status(stage: Stage, status: u16, body: impl AsRef<str>) -> Self {
        let body = body.as_ref().trim();
        let cause = if body.is_empty() {
            format!("provider returned HTTP {}", status)
        } else {
            format!("provider returned HTTP {}: {}", status, body)
        };
        let kind = match status {
            401 | 403 => StageErrorKind::Authorization(cause),
            _ => stage.failure(cause),
        };
        let mut err = Self::new(stage, kind);
        err.status = Some(status);
        err
    }

    /// Whether the failure looks transient (timeouts, rate limits, 5xx).
    ///
    /// Informational only: the orchestrator never retries.
    pub fn is_transient(&self) -> bool {
        if matches!(self.kind, StageErrorKind::Transport(_)) {
            return true;
        }
        matches!(self.status, Some(408 | 429 | 500 | 502 | 503 | 504))
    }

    /// Message suitable for inline display next to the failed stage.
    pub fn user_message(&self) -> String {
        format!("{} failed: {}", self.stage.purpose(), self.kind.cause())
    }
}
