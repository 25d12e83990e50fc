//! Configuration-time provider selection.

use crate::{ProviderKind, StorageBackend, StoryPipeline, StorytoonsConfig};
use derive_getters::Getters;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use storytoons_core::{Credentials, ProviderKey};
use storytoons_error::{ConfigError, Stage, StorytoonsResult};
use storytoons_interface::{ImageSynthesizer, ImageUnderstanding, Narrator};
use storytoons_models::build_http_client;
use storytoons_storage::{ArtifactStore, FileSystemStorage, MemoryStorage};
use tracing::{info, instrument};

#[cfg(feature = "clarifai")]
use storytoons_models::ClarifaiClient;
#[cfg(feature = "elevenlabs")]
use storytoons_models::ElevenLabsNarrator;
#[cfg(feature = "openai")]
use storytoons_models::OpenAiClient;
#[cfg(feature = "local")]
use storytoons_models::{OllamaVision, StableDiffusionClient};

impl ProviderKind {
    /// Credential the provider cannot work without, if any.
    ///
    /// Local servers accept an optional bearer token and need none.
    pub fn required_credential(&self) -> Option<ProviderKey> {
        match self {
            ProviderKind::OpenAi => Some(ProviderKey::OpenAi),
            ProviderKind::Clarifai => Some(ProviderKey::Clarifai),
            ProviderKind::ElevenLabs => Some(ProviderKey::ElevenLabs),
            ProviderKind::StableDiffusion | ProviderKind::Ollama => None,
        }
    }

    fn feature(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Clarifai => "clarifai",
            ProviderKind::ElevenLabs => "elevenlabs",
            ProviderKind::StableDiffusion | ProviderKind::Ollama => "local",
        }
    }
}

/// How one stage is wired, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct StageBinding {
    /// The stage
    stage: Stage,
    /// Selected provider
    provider: ProviderKind,
    /// Base URL override, if configured
    endpoint: Option<String>,
    /// Credential the provider needs, if any
    credential: Option<ProviderKey>,
    /// Whether that credential is present
    credential_present: bool,
}

/// Builds adapters, storage and pipelines from configuration.
///
/// # Example
///
/// ```no_run
/// use storytoons_core::Credentials;
/// use storytoons_pipeline::{ProviderRegistry, StorytoonsConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = ProviderRegistry::new(StorytoonsConfig::load()?, Credentials::from_env())?;
/// let pipeline = registry.pipeline()?;
/// let run = pipeline.run("a cat who learns to fly").await;
/// println!("{}", run.state());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    config: StorytoonsConfig,
    credentials: Credentials,
    http: reqwest::Client,
}

impl ProviderRegistry {
    /// Create a registry.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid or the HTTP client cannot be built.
    #[instrument(skip_all)]
    pub fn new(config: StorytoonsConfig, credentials: Credentials) -> StorytoonsResult<Self> {
        config.validate()?;
        let http = build_http_client(Duration::from_secs(config.http.timeout_secs))?;
        Ok(Self {
            config,
            credentials,
            http,
        })
    }

    /// The configuration in use.
    pub fn config(&self) -> &StorytoonsConfig {
        &self.config
    }

    /// Describe how each stage is wired.
    pub fn bindings(&self) -> Vec<StageBinding> {
        <Stage as strum::IntoEnumIterator>::iter()
            .map(|stage| {
                let provider = self.config.providers.for_stage(stage);
                let credential = provider.required_credential();
                StageBinding {
                    stage,
                    provider,
                    endpoint: self
                        .config
                        .endpoints
                        .for_provider(provider)
                        .map(str::to_string),
                    credential,
                    credential_present: credential
                        .map(|key| self.credentials.get(key).is_some())
                        .unwrap_or(true),
                }
            })
            .collect()
    }

    /// Adapter for the image synthesis stage.
    ///
    /// # Errors
    ///
    /// Fails if the selected provider cannot synthesize images or was not
    /// compiled in.
    pub fn synthesizer(&self) -> Result<Arc<dyn ImageSynthesizer>, ConfigError> {
        let provider = self.config.providers.synthesis;
        let endpoint = self.config.endpoints.for_provider(provider);
        match provider {
            #[cfg(feature = "openai")]
            ProviderKind::OpenAi => Ok(Arc::new(self.openai(endpoint))),
            #[cfg(feature = "clarifai")]
            ProviderKind::Clarifai => Ok(Arc::new(self.clarifai(endpoint))),
            #[cfg(feature = "local")]
            ProviderKind::StableDiffusion => {
                let mut client =
                    StableDiffusionClient::from_credentials(self.http.clone(), &self.credentials);
                if let Some(url) = endpoint {
                    client = client.with_base_url(url);
                }
                Ok(Arc::new(client))
            }
            other => Err(unavailable(other, Stage::Synthesis)),
        }
    }

    /// Adapter for the image understanding stage.
    ///
    /// # Errors
    ///
    /// Fails if the selected provider cannot read images or was not
    /// compiled in.
    pub fn understanding(&self) -> Result<Arc<dyn ImageUnderstanding>, ConfigError> {
        let provider = self.config.providers.understanding;
        let endpoint = self.config.endpoints.for_provider(provider);
        match provider {
            #[cfg(feature = "openai")]
            ProviderKind::OpenAi => Ok(Arc::new(self.openai(endpoint))),
            #[cfg(feature = "clarifai")]
            ProviderKind::Clarifai => Ok(Arc::new(self.clarifai(endpoint))),
            #[cfg(feature = "local")]
            ProviderKind::Ollama => {
                let mut client = OllamaVision::from_credentials(self.http.clone(), &self.credentials);
                if let Some(url) = endpoint {
                    client = client.with_base_url(url);
                }
                Ok(Arc::new(client))
            }
            other => Err(unavailable(other, Stage::Understanding)),
        }
    }

    /// Adapter for the narration stage.
    ///
    /// # Errors
    ///
    /// Fails if the selected provider cannot speak or was not compiled in.
    pub fn narrator(&self) -> Result<Arc<dyn Narrator>, ConfigError> {
        let provider = self.config.providers.narration;
        let endpoint = self.config.endpoints.for_provider(provider);
        match provider {
            #[cfg(feature = "openai")]
            ProviderKind::OpenAi => Ok(Arc::new(self.openai(endpoint))),
            #[cfg(feature = "clarifai")]
            ProviderKind::Clarifai => Ok(Arc::new(self.clarifai(endpoint))),
            #[cfg(feature = "elevenlabs")]
            ProviderKind::ElevenLabs => {
                let mut narrator =
                    ElevenLabsNarrator::from_credentials(self.http.clone(), &self.credentials);
                if let Some(url) = endpoint {
                    narrator = narrator.with_base_url(url);
                }
                Ok(Arc::new(narrator))
            }
            other => Err(unavailable(other, Stage::Narration)),
        }
    }

    /// Artifact store for the configured backend.
    ///
    /// # Errors
    ///
    /// Fails if the filesystem base directory cannot be created.
    pub fn store(&self) -> StorytoonsResult<Arc<dyn ArtifactStore>> {
        match self.config.storage.backend {
            StorageBackend::Filesystem => Ok(Arc::new(FileSystemStorage::new(
                self.config.storage.path.clone(),
            )?)),
            StorageBackend::Memory => Ok(Arc::new(MemoryStorage::new())),
        }
    }

    /// Assemble a pipeline with the configured adapters, options and store.
    ///
    /// # Errors
    ///
    /// Fails if any adapter or the store cannot be built.
    #[instrument(skip(self))]
    pub fn pipeline(&self) -> StorytoonsResult<StoryPipeline> {
        let pipeline = StoryPipeline::new(self.synthesizer()?, self.understanding()?, self.narrator()?)
            .with_synthesis_options(self.config.synthesis.clone())
            .with_understanding_options(self.config.understanding.clone())
            .with_voice(self.config.narration.clone())
            .with_store(self.store()?);
        info!(?pipeline, "Pipeline assembled");
        Ok(pipeline)
    }

    #[cfg(feature = "openai")]
    fn openai(&self, endpoint: Option<&str>) -> OpenAiClient {
        let client = OpenAiClient::from_credentials(self.http.clone(), &self.credentials);
        match endpoint {
            Some(url) => client.with_base_url(url),
            None => client,
        }
    }

    #[cfg(feature = "clarifai")]
    fn clarifai(&self, endpoint: Option<&str>) -> ClarifaiClient {
        let client = ClarifaiClient::from_credentials(self.http.clone(), &self.credentials);
        match endpoint {
            Some(url) => client.with_base_url(url),
            None => client,
        }
    }
}

#[track_caller]
fn unavailable(provider: ProviderKind, stage: Stage) -> ConfigError {
    if provider.supports(stage) {
        ConfigError::new(format!(
            "Provider '{}' is not compiled in; enable the '{}' feature",
            provider,
            provider.feature()
        ))
    } else {
        ConfigError::new(format!(
            "Provider '{}' cannot serve the {} stage",
            provider, stage
        ))
    }
}
