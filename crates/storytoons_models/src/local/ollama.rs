//! Ollama vision client.

use crate::http::{body_error, ensure_success, join_url, send_error, unusable_output};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storytoons_core::{Credentials, ImageArtifact, NarrativeText, ProviderKey, UnderstandingOptions};
use storytoons_error::{Stage, StageResult};
use storytoons_interface::ImageUnderstanding;
use tracing::{debug, info, instrument};

/// Default Ollama address.
pub const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";

/// Default multimodal model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llava";

const PROVIDER: &str = "ollama";

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    images: Vec<String>,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Image understanding backed by a local Ollama vision model.
#[derive(Clone)]
pub struct OllamaVision {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for OllamaVision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OllamaVision")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl OllamaVision {
    /// Create a client against the default local address.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_key: None,
            base_url: OLLAMA_BASE_URL.to_string(),
        }
    }

    /// Create a client, picking up an optional bearer token from `credentials`.
    pub fn from_credentials(client: Client, credentials: &Credentials) -> Self {
        let mut this = Self::new(client);
        this.api_key = credentials.get(ProviderKey::Ollama).map(str::to_string);
        this
    }

    /// Point the client at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ImageUnderstanding for OllamaVision {
    #[instrument(skip_all, fields(provider = PROVIDER, image_bytes = image.size()))]
    async fn describe(
        &self,
        image: &ImageArtifact,
        options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        let stage = Stage::Understanding;
        let model = options.model().as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
        let request = GenerateRequest {
            model,
            prompt: options.prompt(),
            images: vec![image.to_base64()],
            stream: false,
            options: GenerateOptions {
                temperature: *options.temperature(),
                num_predict: *options.max_tokens(),
            },
        };

        let url = join_url(&self.base_url, "/api/generate");
        debug!(url = %url, model, "Sending Ollama request");
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| send_error(stage, PROVIDER, e))?;
        let response = ensure_success(stage, PROVIDER, response).await?;
        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let narrative =
            NarrativeText::new(&body.response).map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(chars = narrative.char_count(), "Story written");
        Ok(narrative)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
