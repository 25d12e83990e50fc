//! Clarifai REST client.

use super::dto::{ClarifaiData, ClarifaiRequest, ClarifaiResponse};
use crate::http::{body_error, decode_base64, ensure_success, join_url, send_error, unusable_output};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Map, Value, json};
use storytoons_core::{
    AudioArtifact, AudioFormat, Credentials, Description, ImageArtifact, NarrativeText,
    ProviderKey, SynthesisOptions, UnderstandingOptions, VoiceOptions,
};
use storytoons_error::{Stage, StageError, StageResult};
use storytoons_interface::{ImageSynthesizer, ImageUnderstanding, Narrator};
use tracing::{debug, error, info, instrument};

/// Default Clarifai API origin.
pub const CLARIFAI_BASE_URL: &str = "https://api.clarifai.com";

const PROVIDER: &str = "clarifai";

/// Community models used for each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ClarifaiModel {
    /// `openai/dall-e/dall-e-3`
    #[strum(to_string = "dall-e-3")]
    DallE3,
    /// `openai/chat-completion/gpt-4-vision`
    #[strum(to_string = "gpt-4-vision")]
    Gpt4Vision,
    /// `openai/tts/openai-tts-1`
    #[strum(to_string = "openai-tts-1")]
    OpenAiTts,
}

impl ClarifaiModel {
    /// `outputs` endpoint path for the model.
    pub fn outputs_path(&self) -> &'static str {
        match self {
            ClarifaiModel::DallE3 => "/v2/users/openai/apps/dall-e/models/dall-e-3/outputs",
            ClarifaiModel::Gpt4Vision => {
                "/v2/users/openai/apps/chat-completion/models/gpt-4-vision/outputs"
            }
            ClarifaiModel::OpenAiTts => "/v2/users/openai/apps/tts/models/openai-tts-1/outputs",
        }
    }
}

/// Client for Clarifai-hosted OpenAI models.
///
/// Requests authenticate with the Clarifai personal access token. The vision
/// and speech models additionally accept an OpenAI key as an inference
/// param, which is forwarded when configured.
#[derive(Clone)]
pub struct ClarifaiClient {
    client: Client,
    pat: Option<String>,
    openai_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for ClarifaiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClarifaiClient")
            .field("base_url", &self.base_url)
            .field("has_pat", &self.pat.is_some())
            .field("forwards_openai_key", &self.openai_key.is_some())
            .finish()
    }
}

impl ClarifaiClient {
    /// Create a client against the public API.
    pub fn new(client: Client, pat: Option<String>) -> Self {
        Self {
            client,
            pat,
            openai_key: None,
            base_url: CLARIFAI_BASE_URL.to_string(),
        }
    }

    /// Create a client from the Clarifai PAT and optional OpenAI key in `credentials`.
    pub fn from_credentials(client: Client, credentials: &Credentials) -> Self {
        let mut this = Self::new(
            client,
            credentials.get(ProviderKey::Clarifai).map(str::to_string),
        );
        this.openai_key = credentials.get(ProviderKey::OpenAi).map(str::to_string);
        this
    }

    /// Forward an OpenAI key with vision and speech predictions.
    pub fn with_openai_key(mut self, key: impl Into<String>) -> Self {
        self.openai_key = Some(key.into());
        self
    }

    /// Point the client at a different origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Run one prediction and return the first output's data.
    #[instrument(skip(self, input, params), fields(model = %model))]
    async fn predict(
        &self,
        stage: Stage,
        model: ClarifaiModel,
        input: &str,
        params: Map<String, Value>,
    ) -> StageResult<ClarifaiData> {
        let pat = self.pat.as_deref().ok_or_else(|| {
            StageError::authorization(
                stage,
                format!(
                    "{} credential missing; set {}",
                    ProviderKey::Clarifai,
                    ProviderKey::Clarifai.env_vars().join(" or ")
                ),
            )
        })?;

        let url = join_url(&self.base_url, model.outputs_path());
        debug!(url = %url, "Sending Clarifai prediction");
        let request = ClarifaiRequest::text(input, params);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Key {}", pat))
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(stage, PROVIDER, e))?;
        let response = ensure_success(stage, PROVIDER, response).await?;

        let body: ClarifaiResponse = response
            .json()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        // Clarifai reports model failures inside a 200 response.
        let status = body.status();
        if !status.is_success() {
            error!(code = status.code(), message = %status.message(), "Clarifai prediction failed");
            let cause = format!("Clarifai prediction failed: {}", status.message());
            return Err(if status.is_authorization() {
                StageError::authorization(stage, cause)
            } else {
                StageError::failure(stage, cause)
            });
        }

        body.first_data()
            .cloned()
            .ok_or_else(|| StageError::failure(stage, "Clarifai returned no outputs"))
    }

    fn openai_key_param(&self, params: &mut Map<String, Value>) {
        if let Some(key) = &self.openai_key {
            params.insert("api_key".to_string(), json!(key));
        }
    }
}

#[async_trait]
impl ImageSynthesizer for ClarifaiClient {
    #[instrument(skip_all, fields(provider = PROVIDER))]
    async fn synthesize(
        &self,
        description: &Description,
        options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        let stage = Stage::Synthesis;
        let mut params = Map::new();
        params.insert("quality".to_string(), json!(options.quality()));
        params.insert("size".to_string(), json!(options.size()));

        let data = self
            .predict(
                stage,
                ClarifaiModel::DallE3,
                &options.render_prompt(description),
                params,
            )
            .await?;
        let encoded = data
            .image()
            .as_ref()
            .map(|image| image.base64().as_str())
            .filter(|encoded| !encoded.is_empty())
            .ok_or_else(|| StageError::failure(stage, "Clarifai returned no image data"))?;

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

#[async_trait]
impl ImageUnderstanding for ClarifaiClient {
    #[instrument(skip_all, fields(provider = PROVIDER, image_bytes = image.size()))]
    async fn describe(
        &self,
        image: &ImageArtifact,
        options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        let stage = Stage::Understanding;
        let mut params = Map::new();
        params.insert("temperature".to_string(), json!(options.temperature()));
        params.insert("max_tokens".to_string(), json!(options.max_tokens()));
        params.insert("image_base64".to_string(), json!(image.to_base64()));
        self.openai_key_param(&mut params);

        let data = self
            .predict(stage, ClarifaiModel::Gpt4Vision, options.prompt(), params)
            .await?;
        let text = data
            .text()
            .as_ref()
            .map(|text| text.raw().as_str())
            .unwrap_or_default();

        let narrative = NarrativeText::new(text).map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(chars = narrative.char_count(), "Story written");
        Ok(narrative)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[async_trait]
impl Narrator for ClarifaiClient {
    #[instrument(skip_all, fields(provider = PROVIDER, voice = %voice.voice()))]
    async fn narrate(
        &self,
        text: &NarrativeText,
        voice: &VoiceOptions,
    ) -> StageResult<AudioArtifact> {
        let stage = Stage::Narration;
        voice
            .validate()
            .map_err(|e| StageError::failure(stage, e.kind.to_string()))?;

        let mut params = Map::new();
        params.insert("voice".to_string(), json!(voice.voice()));
        params.insert("speed".to_string(), json!(voice.speed()));
        self.openai_key_param(&mut params);

        let data = self
            .predict(stage, ClarifaiModel::OpenAiTts, text.as_str(), params)
            .await?;
        let encoded = data
            .audio()
            .as_ref()
            .map(|audio| audio.base64().as_str())
            .filter(|encoded| !encoded.is_empty())
            .ok_or_else(|| StageError::failure(stage, "Clarifai returned no audio data"))?;

        let bytes = decode_base64(stage, PROVIDER, encoded)?;
        // The TTS model always answers in MP3.
        let audio = AudioArtifact::detect(bytes, AudioFormat::Mp3)
            .map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(bytes = audio.size(), format = ?audio.format(), "Narration ready");
        Ok(audio)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
