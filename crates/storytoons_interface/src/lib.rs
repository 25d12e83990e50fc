//! Capability traits implemented by StoryToons provider adapters.
//!
//! The pipeline needs exactly three capabilities: turn a description into an
//! image, turn an image into a story, and turn a story into speech. Each
//! provider adapter implements whichever of these it supports, and the
//! orchestrator is generic over the traits rather than over providers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod traits;

pub use traits::{ImageSynthesizer, ImageUnderstanding, Narrator};
