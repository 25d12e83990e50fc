//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the
//! storytoons binary.

mod commands;
mod generate;
mod providers;
mod serve;

pub use commands::{Cli, Commands};
pub use generate::run_generate;
pub use providers::list_providers;
pub use serve::run_server;

use std::path::Path;
use storytoons::{ConfigSources, Credentials, ProviderRegistry, StorytoonsConfig, StorytoonsResult};

/// Load configuration and credentials, honoring an explicit config file.
pub(crate) fn load_config(config_path: Option<&Path>) -> StorytoonsResult<StorytoonsConfig> {
    let mut sources = ConfigSources::discover();
    if let Some(path) = config_path {
        sources = sources.with_explicit_file(path);
    }
    StorytoonsConfig::load_from(sources)
}

/// Build a registry from configuration and the process environment.
pub(crate) fn build_registry(config: StorytoonsConfig) -> StorytoonsResult<ProviderRegistry> {
    ProviderRegistry::new(config, Credentials::from_env())
}
