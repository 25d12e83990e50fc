//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! 1. Bundled defaults (`storytoons.toml` shipped with the crate)
//! 2. `~/.config/storytoons/storytoons.toml`
//! 3. `./storytoons.toml`
//! 4. An explicit file passed on the command line
//! 5. `STORYTOONS__SECTION__KEY` environment variables

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use storytoons_core::{SynthesisOptions, UnderstandingOptions, VoiceOptions};
use storytoons_error::{ConfigError, Stage, StorytoonsResult};
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../storytoons.toml");

/// A provider that can serve one or more stages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum ProviderKind {
    /// OpenAI platform
    #[serde(rename = "openai")]
    #[strum(serialize = "openai")]
    OpenAi,
    /// Clarifai-hosted OpenAI models
    #[serde(rename = "clarifai")]
    #[strum(serialize = "clarifai")]
    Clarifai,
    /// ElevenLabs speech
    #[serde(rename = "elevenlabs")]
    #[strum(serialize = "elevenlabs")]
    ElevenLabs,
    /// Stable Diffusion WebUI server
    #[serde(rename = "stable_diffusion")]
    #[strum(serialize = "stable_diffusion")]
    StableDiffusion,
    /// Ollama vision model server
    #[serde(rename = "ollama")]
    #[strum(serialize = "ollama")]
    Ollama,
}

impl ProviderKind {
    /// Whether the provider can serve `stage`.
    pub fn supports(&self, stage: Stage) -> bool {
        match self {
            ProviderKind::OpenAi | ProviderKind::Clarifai => true,
            ProviderKind::ElevenLabs => stage == Stage::Narration,
            ProviderKind::StableDiffusion => stage == Stage::Synthesis,
            ProviderKind::Ollama => stage == Stage::Understanding,
        }
    }
}

/// Provider selection per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Image synthesis provider
    pub synthesis: ProviderKind,
    /// Image understanding provider
    pub understanding: ProviderKind,
    /// Narration provider
    pub narration: ProviderKind,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            synthesis: ProviderKind::Clarifai,
            understanding: ProviderKind::Clarifai,
            narration: ProviderKind::Clarifai,
        }
    }
}

impl ProvidersConfig {
    /// Provider selected for `stage`.
    pub fn for_stage(&self, stage: Stage) -> ProviderKind {
        match stage {
            Stage::Synthesis => self.synthesis,
            Stage::Understanding => self.understanding,
            Stage::Narration => self.narration,
        }
    }
}

/// Base URL overrides per provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// OpenAI origin
    pub openai: Option<String>,
    /// Clarifai origin
    pub clarifai: Option<String>,
    /// ElevenLabs origin
    pub elevenlabs: Option<String>,
    /// Stable Diffusion WebUI address
    pub stable_diffusion: Option<String>,
    /// Ollama address
    pub ollama: Option<String>,
}

impl EndpointsConfig {
    /// Override configured for `provider`, if any.
    pub fn for_provider(&self, provider: ProviderKind) -> Option<&str> {
        let endpoint = match provider {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Clarifai => &self.clarifai,
            ProviderKind::ElevenLabs => &self.elevenlabs,
            ProviderKind::StableDiffusion => &self.stable_diffusion,
            ProviderKind::Ollama => &self.ollama,
        };
        endpoint.as_deref().filter(|url| !url.trim().is_empty())
    }
}

/// Artifact storage backends.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StorageBackend {
    /// Files under a base directory
    #[default]
    Filesystem,
    /// In-process map, lost on exit
    Memory,
}

/// Artifact storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend to use
    pub backend: StorageBackend,
    /// Base directory for the filesystem backend
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Filesystem,
            path: PathBuf::from("storytoons-data"),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

/// Top-level StoryToons configuration.
///
/// # Example
///
/// ```no_run
/// use storytoons_pipeline::StorytoonsConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StorytoonsConfig::load()?;
/// println!("Synthesis via {}", config.providers.synthesis);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorytoonsConfig {
    /// Provider per stage
    pub providers: ProvidersConfig,
    /// Base URL overrides
    pub endpoints: EndpointsConfig,
    /// Image synthesis defaults
    pub synthesis: SynthesisOptions,
    /// Image understanding defaults
    pub understanding: UnderstandingOptions,
    /// Narration defaults
    pub narration: VoiceOptions,
    /// Artifact storage
    pub storage: StorageConfig,
    /// HTTP client
    pub http: HttpConfig,
}

/// Where configuration is read from.
///
/// [`ConfigSources::discover`] yields the standard locations; tests build
/// their own to stay independent of the host.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Per-user file (optional)
    pub user_file: Option<PathBuf>,
    /// Working-directory file (optional)
    pub local_file: Option<PathBuf>,
    /// Explicitly requested file (must exist)
    pub explicit_file: Option<PathBuf>,
    /// Environment snapshot; `None` reads the process environment
    pub env: Option<config::Map<String, String>>,
}

impl ConfigSources {
    /// Standard locations: `~/.config/storytoons/storytoons.toml` and
    /// `./storytoons.toml`.
    pub fn discover() -> Self {
        Self {
            user_file: dirs::home_dir().map(|home| home.join(".config/storytoons/storytoons.toml")),
            local_file: Some(PathBuf::from("storytoons.toml")),
            explicit_file: None,
            env: None,
        }
    }

    /// Add an explicit file on top of the other sources.
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }
}

impl StorytoonsConfig {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed or the result is invalid.
    #[instrument]
    pub fn load() -> StorytoonsResult<Self> {
        Self::load_from(ConfigSources::discover())
    }

    /// Load configuration from explicit sources layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be parsed, a required file is
    /// missing, or the result is invalid.
    #[instrument(skip(sources))]
    pub fn load_from(sources: ConfigSources) -> StorytoonsResult<Self> {
        debug!("Loading configuration with precedence: env > explicit > local > user > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(path) = sources.user_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = sources.local_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = sources.explicit_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        let mut environment = Environment::with_prefix("STORYTOONS")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true);
        if let Some(vars) = sources.env {
            environment = environment.source(Some(vars));
        }
        builder = builder.add_source(environment);

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load a single configuration file, without defaults or environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StorytoonsResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Fails when a provider is assigned to a stage it cannot serve or when
    /// an option is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for stage in <Stage as strum::IntoEnumIterator>::iter() {
            let provider = self.providers.for_stage(stage);
            if !provider.supports(stage) {
                return Err(ConfigError::new(format!(
                    "Provider '{}' cannot serve the {} stage",
                    provider, stage
                )));
            }
        }

        self.synthesis
            .dimensions()
            .map_err(|e| ConfigError::new(format!("[synthesis] {}", e.kind)))?;
        self.narration
            .validate()
            .map_err(|e| ConfigError::new(format!("[narration] {}", e.kind)))?;

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::new("[http] timeout_secs must be positive"));
        }
        Ok(())
    }
}
