//! Core data types for the StoryToons pipeline.
//!
//! A pipeline run turns a [`Description`] into an [`ImageArtifact`], the
//! image into a [`NarrativeText`], and the story into an [`AudioArtifact`].
//! Each type validates itself on construction, so a value that exists is
//! always usable by the next stage.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod audio;
mod credentials;
mod description;
mod location;
mod narrative;
mod options;
mod raster;

pub use audio::{AudioArtifact, AudioFormat};
pub use credentials::{Credentials, ProviderKey};
pub use description::Description;
pub use location::ArtifactLocation;
pub use narrative::NarrativeText;
pub use options::{
    DEFAULT_STORY_PROMPT, DEFAULT_SYNTHESIS_TEMPLATE, MAX_SPEAKING_RATE, MIN_SPEAKING_RATE,
    SynthesisOptions, SynthesisOptionsBuilder, UnderstandingOptions, UnderstandingOptionsBuilder,
    VoiceOptions, VoiceOptionsBuilder,
};
pub use raster::{ImageArtifact, ImageFormat};
