//! HTTP surface error types.

/// Kinds of errors raised by the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ServerErrorKind {
    /// Failed to bind the listen address
    #[display("Failed to bind {}", _0)]
    Bind(String),
    /// Server loop terminated with an error
    #[display("Server error: {}", _0)]
    Serve(String),
}

/// HTTP surface error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The kind of error that occurred
    pub kind: ServerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ServerError {
    /// Create a new server error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
