//! OpenAI REST client.

use super::dto::{
    ChatContentPart, ChatMessage, ChatRequest, ChatResponse, ImageRequest, ImageResponse,
    ImageUrl, SpeechRequest,
};
use crate::http::{body_error, decode_base64, ensure_success, join_url, send_error, unusable_output};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use storytoons_core::{
    AudioArtifact, AudioFormat, Credentials, Description, ImageArtifact, NarrativeText,
    ProviderKey, SynthesisOptions, UnderstandingOptions, VoiceOptions,
};
use storytoons_error::{Stage, StageError, StageResult};
use storytoons_interface::{ImageSynthesizer, ImageUnderstanding, Narrator};
use tracing::{debug, info, instrument};

/// Default OpenAI API origin.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

const PROVIDER: &str = "openai";
const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
const DEFAULT_VISION_MODEL: &str = "gpt-4o";
const DEFAULT_SPEECH_MODEL: &str = "tts-1";

/// Client for the OpenAI images, chat and speech endpoints.
///
/// One client serves all three stages. The API key is optional at
/// construction; calls made without one fail with an authorization failure.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl OpenAiClient {
    /// Create a client against the public API.
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    /// Create a client using the OpenAI key from `credentials`.
    pub fn from_credentials(client: Client, credentials: &Credentials) -> Self {
        Self::new(
            client,
            credentials.get(ProviderKey::OpenAi).map(str::to_string),
        )
    }

    /// Point the client at a different origin (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Configured origin.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[track_caller]
    fn api_key(&self, stage: Stage) -> StageResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            StageError::authorization(
                stage,
                format!(
                    "{} credential missing; set {}",
                    ProviderKey::OpenAi,
                    ProviderKey::OpenAi.env_vars().join(" or ")
                ),
            )
        })
    }

    async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        stage: Stage,
        path: &str,
        body: &T,
    ) -> StageResult<reqwest::Response> {
        let api_key = self.api_key(stage)?;
        let url = join_url(&self.base_url, path);
        debug!(url = %url, "Sending OpenAI request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| send_error(stage, PROVIDER, e))?;

        ensure_success(stage, PROVIDER, response).await
    }
}

#[async_trait]
impl ImageSynthesizer for OpenAiClient {
    #[instrument(skip_all, fields(provider = PROVIDER))]
    async fn synthesize(
        &self,
        description: &Description,
        options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        let stage = Stage::Synthesis;
        let request = ImageRequest::builder()
            .model(
                options
                    .model()
                    .clone()
                    .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            )
            .prompt(options.render_prompt(description))
            .size(options.size().clone())
            .quality(options.quality().clone())
            .build()
            .map_err(|e| StageError::failure(stage, format!("Invalid image request: {}", e)))?;

        let response = self
            .post_json(stage, "/v1/images/generations", &request)
            .await?;
        let body: ImageResponse = response
            .json()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let encoded = body
            .data()
            .first()
            .and_then(|image| image.b64_json().as_deref())
            .ok_or_else(|| StageError::failure(stage, "OpenAI returned no image data"))?;
        let bytes = decode_base64(stage, PROVIDER, encoded)?;
        let image =
            ImageArtifact::from_bytes(bytes).map_err(|e| unusable_output(stage, PROVIDER, e))?;

        info!(
            width = image.width(),
            height = image.height(),
            format = ?image.format(),
            "Image synthesized"
        );
        Ok(image)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[async_trait]
impl ImageUnderstanding for OpenAiClient {
    #[instrument(skip_all, fields(provider = PROVIDER, image_bytes = image.size()))]
    async fn describe(
        &self,
        image: &ImageArtifact,
        options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        let stage = Stage::Understanding;
        let message = ChatMessage::user(vec![
            ChatContentPart::Text {
                text: options.prompt().clone(),
            },
            ChatContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_url(),
                },
            },
        ]);
        let request = ChatRequest::builder()
            .model(
                options
                    .model()
                    .clone()
                    .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string()),
            )
            .messages(vec![message])
            .temperature(*options.temperature())
            .max_tokens(*options.max_tokens())
            .build()
            .map_err(|e| StageError::failure(stage, format!("Invalid chat request: {}", e)))?;

        let response = self
            .post_json(stage, "/v1/chat/completions", &request)
            .await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let text = body.first_text().unwrap_or_default();
        let narrative = NarrativeText::new(text).map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(chars = narrative.char_count(), "Story written");
        Ok(narrative)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

#[async_trait]
impl Narrator for OpenAiClient {
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

        let request = SpeechRequest::builder()
            .model(
                voice
                    .model()
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SPEECH_MODEL.to_string()),
            )
            .input(text.as_str())
            .voice(voice.voice().clone())
            .speed(*voice.speed())
            .response_format(voice.format().extension())
            .build()
            .map_err(|e| StageError::failure(stage, format!("Invalid speech request: {}", e)))?;

        let response = self.post_json(stage, "/v1/audio/speech", &request).await?;
        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(AudioFormat::from_mime)
            .unwrap_or(*voice.format());
        let bytes = response
            .bytes()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let audio = AudioArtifact::detect(bytes.to_vec(), declared)
            .map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(bytes = audio.size(), format = ?audio.format(), "Narration ready");
        Ok(audio)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
