//! Orchestration of the StoryToons describe → image → story → narration
//! pipeline.
//!
//! [`StoryPipeline`] drives one [`PipelineRun`] per description through the
//! three stage adapters. [`ProviderRegistry`] builds those adapters, plus
//! the artifact store, from a layered [`StorytoonsConfig`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod event;
mod pipeline;
mod registry;
mod run;
mod state;

pub use config::{
    ConfigSources, EndpointsConfig, HttpConfig, ProviderKind, ProvidersConfig, StorageBackend,
    StorageConfig, StorytoonsConfig,
};
pub use event::RunEvent;
pub use pipeline::{SpawnedRun, StoryPipeline};
pub use registry::{ProviderRegistry, StageBinding};
pub use run::{PipelineRun, RunId};
pub use state::PipelineState;
