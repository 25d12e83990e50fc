//! Error types for the StoryToons pipeline.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! Stage failures are the exception users see most: a [`StageError`] always
//! names the [`Stage`] it came from, and its [`StageErrorKind`] is one of the
//! pipeline's failure taxonomy (`Generation`, `Understanding`, `Narration`,
//! `Authorization`, `Transport`, `Storage`).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod server;
mod stage;
mod storage;
mod validation;

pub use config::ConfigError;
pub use error::{StageResult, StorytoonsError, StorytoonsErrorKind, StorytoonsResult};
pub use server::{ServerError, ServerErrorKind};
pub use stage::{Stage, StageError, StageErrorKind};
pub use storage::{StorageError, StorageErrorKind};
pub use validation::{ValidationError, ValidationErrorKind};
