//! `storytoons providers`.

use super::{build_registry, load_config};
use std::path::Path;
use storytoons::StorytoonsResult;

/// Print the provider bound to each stage and whether its credential is set.
pub fn list_providers(config_path: Option<&Path>, json: bool) -> StorytoonsResult<()> {
    let registry = build_registry(load_config(config_path)?)?;
    let bindings = registry.bindings();

    if json {
        match serde_json::to_string_pretty(&bindings) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Failed to encode bindings: {}", e),
        }
        return Ok(());
    }

    for binding in &bindings {
        let credential = match binding.credential() {
            Some(key) if *binding.credential_present() => format!("{} key set", key),
            Some(key) => format!("{} key MISSING ({})", key, key.env_vars().join(" or ")),
            None => "no key needed".to_string(),
        };
        let endpoint = binding.endpoint().as_deref().unwrap_or("default endpoint");
        println!(
            "{:<20} {:<18} {:<28} {}",
            binding.stage().to_string(),
            binding.provider().to_string(),
            endpoint,
            credential
        );
    }
    Ok(())
}
