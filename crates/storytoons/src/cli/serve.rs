//! `storytoons serve`.

use super::{build_registry, load_config};
use std::net::SocketAddr;
use std::path::Path;
use storytoons::{StorytoonsResult, server};

/// Serve the JSON API on `bind`.
pub async fn run_server(bind: SocketAddr, config_path: Option<&Path>) -> StorytoonsResult<()> {
    let pipeline = build_registry(load_config(config_path)?)?.pipeline()?;
    server::serve(pipeline, bind).await
}
