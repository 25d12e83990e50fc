//! ElevenLabs REST client.

use crate::http::{body_error, ensure_success, join_url, send_error, unusable_output};
use async_trait::async_trait;
use derive_getters::Getters;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storytoons_core::{AudioArtifact, AudioFormat, Credentials, NarrativeText, ProviderKey, VoiceOptions};
use storytoons_error::{Stage, StageError, StageResult};
use storytoons_interface::Narrator;
use tracing::{debug, info, instrument};

/// Default ElevenLabs API origin.
pub const ELEVENLABS_BASE_URL: &str = "https://api.elevenlabs.io";

/// Voice used when the configured voice is an OpenAI stock name ("Rachel").
pub const DEFAULT_ELEVENLABS_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// Default synthesis model.
pub const DEFAULT_ELEVENLABS_MODEL: &str = "eleven_multilingual_v2";

const PROVIDER: &str = "elevenlabs";

/// Stock voice names of other providers, mapped to the default voice here.
const FOREIGN_VOICE_NAMES: &[&str] = &[
    "default", "alloy", "ash", "coral", "echo", "fable", "onyx", "nova", "sage", "shimmer",
];

/// ElevenLabs accepts a narrower speaking-rate range than the pipeline.
const SPEED_RANGE: (f32, f32) = (0.7, 1.2);

/// Per-request voice tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Getters)]
pub struct VoiceSettings {
    /// Speaking rate
    speed: f32,
}

/// `POST /v1/text-to-speech/{voice_id}` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ElevenLabsRequest {
    /// Text to speak
    text: String,
    /// Synthesis model
    model_id: String,
    /// Voice tuning
    voice_settings: VoiceSettings,
}

/// Narrator backed by ElevenLabs.
///
/// Always requests MP3 output, so every artifact it returns is MP3.
#[derive(Clone)]
pub struct ElevenLabsNarrator {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    default_voice: String,
}

impl std::fmt::Debug for ElevenLabsNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElevenLabsNarrator")
            .field("base_url", &self.base_url)
            .field("default_voice", &self.default_voice)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl ElevenLabsNarrator {
    /// Create a narrator against the public API.
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            base_url: ELEVENLABS_BASE_URL.to_string(),
            default_voice: DEFAULT_ELEVENLABS_VOICE.to_string(),
        }
    }

    /// Create a narrator using the ElevenLabs key from `credentials`.
    pub fn from_credentials(client: Client, credentials: &Credentials) -> Self {
        Self::new(
            client,
            credentials.get(ProviderKey::ElevenLabs).map(str::to_string),
        )
    }

    /// Point the narrator at a different origin.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Voice id used when the requested voice is not an ElevenLabs id.
    pub fn with_default_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.default_voice = voice_id.into();
        self
    }

    /// Resolve the voice id to put in the request path.
    pub fn voice_id<'a>(&'a self, voice: &'a VoiceOptions) -> &'a str {
        let requested = voice.voice().trim();
        if FOREIGN_VOICE_NAMES
            .iter()
            .any(|name| name.eq_ignore_ascii_case(requested))
        {
            &self.default_voice
        } else {
            requested
        }
    }
}

#[async_trait]
impl Narrator for ElevenLabsNarrator {
    #[instrument(skip_all, fields(provider = PROVIDER))]
    async fn narrate(
        &self,
        text: &NarrativeText,
        voice: &VoiceOptions,
    ) -> StageResult<AudioArtifact> {
        let stage = Stage::Narration;
        voice
            .validate()
            .map_err(|e| StageError::failure(stage, e.kind.to_string()))?;
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            StageError::authorization(
                stage,
                format!(
                    "{} credential missing; set {}",
                    ProviderKey::ElevenLabs,
                    ProviderKey::ElevenLabs.env_vars().join(" or ")
                ),
            )
        })?;

        let request = ElevenLabsRequest {
            text: text.as_str().to_string(),
            model_id: voice
                .model()
                .clone()
                .unwrap_or_else(|| DEFAULT_ELEVENLABS_MODEL.to_string()),
            voice_settings: VoiceSettings {
                speed: voice.speed().clamp(SPEED_RANGE.0, SPEED_RANGE.1),
            },
        };
        let voice_id = self.voice_id(voice);
        let url = join_url(&self.base_url, &format!("/v1/text-to-speech/{}", voice_id));
        debug!(url = %url, "Sending ElevenLabs request");

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", "mp3_44100_128")])
            .header("xi-api-key", api_key)
            .header("Accept", AudioFormat::Mp3.mime_type())
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(stage, PROVIDER, e))?;
        let response = ensure_success(stage, PROVIDER, response).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| body_error(stage, PROVIDER, e))?;

        let audio = AudioArtifact::new(bytes.to_vec(), AudioFormat::Mp3)
            .map_err(|e| unusable_output(stage, PROVIDER, e))?;
        info!(bytes = audio.size(), voice_id, "Narration ready");
        Ok(audio)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}
