//! StoryToons: describe a scene, get a comic image, a story about it, and
//! a narration of that story.
//!
//! A run goes through three stages, each served by a configurable provider:
//!
//! 1. **Image synthesis**: the description becomes a comic-style image
//! 2. **Image understanding**: a vision model writes a story about the image
//! 3. **Narration**: text-to-speech reads the story aloud
//!
//! # Quick Start
//!
//! ```no_run
//! use storytoons::{Credentials, ProviderRegistry, StorytoonsConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorytoonsConfig::load()?;
//! let registry = ProviderRegistry::new(config, Credentials::from_env())?;
//! let run = registry.pipeline()?.run("a robot exploring a forest").await;
//!
//! match run.failure() {
//!     Some(failure) => eprintln!("{}", failure.user_message()),
//!     None => println!("{}", run.narrative().as_ref().map(|s| s.as_str()).unwrap_or_default()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Cargo Features
//!
//! - `openai`, `clarifai`, `elevenlabs`, `local` - provider adapters
//!   (all enabled by default via `all-providers`)
//! - `observability` - OpenTelemetry span export
//!
//! # Architecture
//!
//! - `storytoons_error` - Error types and the stage failure taxonomy
//! - `storytoons_core` - Descriptions, artifacts, options, credentials
//! - `storytoons_interface` - Stage capability traits
//! - `storytoons_storage` - Per-run artifact storage
//! - `storytoons_models` - Provider adapters
//! - `storytoons_pipeline` - Orchestrator, configuration, provider registry
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod logging;
mod report;
pub mod server;

#[cfg(feature = "observability")]
pub mod observability;

pub use logging::init_logging;
pub use report::{FailureReport, MediaReport, RunReport};

pub use storytoons_core::*;
pub use storytoons_error::*;
pub use storytoons_interface::*;
pub use storytoons_pipeline::*;
pub use storytoons_storage::{
    ArtifactKind, ArtifactMetadata, ArtifactReference, ArtifactStore, FileSystemStorage,
    MemoryStorage,
};
pub use storytoons_models::{DEFAULT_TIMEOUT_SECS, build_http_client};

#[cfg(feature = "openai")]
pub use storytoons_models::OpenAiClient;
#[cfg(feature = "clarifai")]
pub use storytoons_models::ClarifaiClient;
#[cfg(feature = "elevenlabs")]
pub use storytoons_models::ElevenLabsNarrator;
#[cfg(feature = "local")]
pub use storytoons_models::{OllamaVision, StableDiffusionClient};
