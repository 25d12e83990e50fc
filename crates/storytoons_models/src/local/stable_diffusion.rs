//! Stable Diffusion WebUI (`/sdapi/v1/txt2img`) client.

use crate::http::{body_error, decode_base64, ensure_success, join_url, send_error, unusable_output};
use async_trait::async_trait;
use derive_builder::Builder;
use derive_getters::Getters;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storytoons_core::{Credentials, Description, ImageArtifact, ProviderKey, SynthesisOptions};
use storytoons_error::{Stage, StageError, StageResult};
use storytoons_interface::ImageSynthesizer;
use tracing::{debug, info, instrument};

/// Default WebUI address.
pub const STABLE_DIFFUSION_BASE_URL: &str = "http://127.0.0.1:7860";

const PROVIDER: &str = "stable_diffusion";

/// txt2img request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct Txt2ImgRequest {
    /// Prompt text
    prompt: String,
    /// Sampler steps
    steps: u32,
    /// Output width in pixels
    width: u32,
    /// Output height in pixels
    height: u32,
    /// Images per batch
    #[builder(default = "1")]
    batch_size: u32,
    /// Checkpoint override
    #[builder(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    override_settings: Option<serde_json::Value>,
}

impl Txt2ImgRequest {
    /// Creates a new builder for `Txt2ImgRequest`.
    pub fn builder() -> Txt2ImgRequestBuilder {
        Txt2ImgRequestBuilder::default()
    }
}

#[derive(Debug, Deserialize)]
struct Txt2ImgResponse {
    #[serde(default)]
    images: Vec<String>,
}

/// Image synthesizer backed by a Stable Diffusion WebUI server.
///
/// Diffusion text encoders truncate long prompts, so the server receives the
/// bare description rather than the rendered comic-artist template.
#[derive(Clone)]
pub struct StableDiffusionClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for StableDiffusionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StableDiffusionClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl StableDiffusionClient {
    /// Create a client against the default local address.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_key: None,
            base_url: STABLE_DIFFUSION_BASE_URL.to_string(),
        }
    }

    /// Create a client, picking up an optional bearer token from `credentials`.
    pub fn from_credentials(client: Client, credentials: &Credentials) -> Self {
        let mut this = Self::new(client);
        this.api_key = credentials
            .get(ProviderKey::StableDiffusion)
            .map(str::to_string);
        this
    }

    /// Point the client at a different server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ImageSynthesizer for StableDiffusionClient {
    #[instrument(skip_all, fields(provider = PROVIDER))]
    async fn synthesize(
        &self,
        description: &Description,
        options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        let stage = Stage::Synthesis;
        let (width, height) = options
            .dimensions()
            .map_err(|e| StageError::failure(stage, e.kind.to_string()))?;
        let override_settings = options
            .model()
            .as_ref()
            .map(|checkpoint| serde_json::json!({ "sd_model_checkpoint": checkpoint }));
        let request = Txt2ImgRequest::builder()
            .prompt(description.as_str())
            .steps(*options.steps())
            .width(width)
            .height(height)
            .override_settings(override_settings)
            .build()
            .map_err(|e| StageError::failure(stage, format!("Invalid txt2img request: {}", e)))?;

        let url = join_url(&self.base_url, "/sdapi/v1/txt2img");
        debug!(url = %url, steps = request.steps(), "Sending txt2img request");
        let mut builder = self.client.post(&url).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| send_error(stage, PROVIDER, e))?;
        let response = ensure_success(stage, PROVIDER, response).await?;
        let body: Txt2ImgResponse = response
            .json()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let encoded = body
            .images
            .first()
            .ok_or_else(|| StageError::failure(stage, "Stable Diffusion returned no images"))?;
        let bytes = decode_base64(stage, PROVIDER, encoded)?;
        let image =
            ImageArtifact::from_bytes(bytes).map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(
            width = image.width(),
            height = image.height(),
            "Image synthesized"
        );
        Ok(image)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
