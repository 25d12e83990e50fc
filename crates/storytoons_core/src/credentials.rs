//! Provider credentials resolved from the process environment.
//!
//! Keys are read once at startup and never validated up front. A stage
//! whose provider key is missing fails with an authorization failure the
//! first time it runs.

use serde::Serialize;
use std::collections::HashMap;
use storytoons_error::{Stage, StageError};

/// Credential slots for the supported providers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, derive_more::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKey {
    /// OpenAI platform API key
    #[display("OpenAI")]
    OpenAi,
    /// Clarifai personal access token
    #[display("Clarifai")]
    Clarifai,
    /// ElevenLabs API key
    #[display("ElevenLabs")]
    ElevenLabs,
    /// Optional bearer token for a Stable Diffusion WebUI server
    #[display("Stable Diffusion WebUI")]
    StableDiffusion,
    /// Optional bearer token for an Ollama server behind a proxy
    #[display("Ollama")]
    Ollama,
}

impl ProviderKey {
    /// Environment variables consulted for this key, in priority order.
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            ProviderKey::OpenAi => &["OPENAI_API_KEY", "OPEN_AI"],
            ProviderKey::Clarifai => &["CLARIFAI_PAT"],
            ProviderKey::ElevenLabs => &["ELEVEN_LABS_API_KEY", "ELEVENLABS_API_KEY"],
            ProviderKey::StableDiffusion => &["STABLE_DIFFUSION_API_KEY"],
            ProviderKey::Ollama => &["OLLAMA_API_KEY"],
        }
    }
}

/// Read-only set of provider secrets.
///
/// # Examples
///
/// ```
/// use storytoons_core::{Credentials, ProviderKey};
/// use storytoons_error::Stage;
///
/// let credentials = Credentials::default().with(ProviderKey::OpenAi, "sk-test");
/// assert_eq!(credentials.get(ProviderKey::OpenAi), Some("sk-test"));
/// assert!(credentials.require(ProviderKey::Clarifai, Stage::Synthesis).is_err());
/// assert!(!format!("{:?}", credentials).contains("sk-test"));
/// ```
#[derive(Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKey, String>,
}

impl Credentials {
    /// Snapshot all known provider keys from the environment.
    ///
    /// Empty variables are treated as absent.
    #[tracing::instrument]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut keys = HashMap::new();
        for key in <ProviderKey as strum::IntoEnumIterator>::iter() {
            let value = key
                .env_vars()
                .iter()
                .filter_map(|name| lookup(name))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty());
            if let Some(value) = value {
                keys.insert(key, value);
            }
        }
        tracing::debug!(configured = keys.len(), "Resolved provider credentials");
        Self { keys }
    }

    /// Return a copy with `key` set to `value`.
    pub fn with(mut self, key: ProviderKey, value: impl Into<String>) -> Self {
        self.keys.insert(key, value.into());
        self
    }

    /// Look up a key.
    pub fn get(&self, key: ProviderKey) -> Option<&str> {
        self.keys.get(&key).map(String::as_str)
    }

    /// Look up a key a stage cannot run without.
    ///
    /// # Errors
    ///
    /// Returns an authorization failure for `stage` naming the missing variable.
    #[track_caller]
    pub fn require(&self, key: ProviderKey, stage: Stage) -> Result<&str, StageError> {
        self.get(key).ok_or_else(|| {
            StageError::authorization(
                stage,
                format!(
                    "{} credential missing; set {}",
                    key,
                    key.env_vars().join(" or ")
                ),
            )
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<String> = self.keys.keys().map(|k| k.to_string()).collect();
        configured.sort();
        f.debug_struct("Credentials")
            .field("configured", &configured)
            .finish()
    }
}
