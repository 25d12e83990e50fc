//! Provider adapters for the StoryToons pipeline.
//!
//! Each provider lives behind its own feature flag and implements one or
//! more of the stage traits from `storytoons_interface`.
//!
//! # Available Providers
//!
//! | Provider | Feature | Synthesis | Understanding | Narration |
//! |----------|---------|-----------|---------------|-----------|
//! | OpenAI | `openai` | DALL·E 3 | GPT-4o | TTS-1 |
//! | Clarifai | `clarifai` | DALL·E 3 | GPT-4 Vision | OpenAI TTS |
//! | ElevenLabs | `elevenlabs` | | | ✓ |
//! | Stable Diffusion WebUI | `local` | ✓ | | |
//! | Ollama | `local` | | llava | |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "openai")]
//! # {
//! use std::time::Duration;
//! use storytoons_core::{Credentials, Description, SynthesisOptions};
//! use storytoons_interface::ImageSynthesizer;
//! use storytoons_models::{OpenAiClient, build_http_client};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let http = build_http_client(Duration::from_secs(120))?;
//! let client = OpenAiClient::from_credentials(http, &Credentials::from_env());
//! let description = Description::new("a fox piloting a hot air balloon")?;
//! let image = client.synthesize(&description, &SynthesisOptions::default()).await?;
//! println!("{}x{}", image.width(), image.height());
//! # Ok(())
//! # }
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod http;

pub use http::{DEFAULT_TIMEOUT_SECS, build_http_client};

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "clarifai")]
mod clarifai;

#[cfg(feature = "elevenlabs")]
mod elevenlabs;

#[cfg(feature = "local")]
mod local;

#[cfg(feature = "openai")]
pub use openai::{
    ChatContentPart, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ImageRequest,
    ImageRequestBuilder, ImageResponse, ImageUrl, OPENAI_BASE_URL, OpenAiClient, SpeechRequest,
    SpeechRequestBuilder,
};

#[cfg(feature = "clarifai")]
pub use clarifai::{
    CLARIFAI_BASE_URL, ClarifaiClient, ClarifaiData, ClarifaiInput, ClarifaiMedia, ClarifaiModel,
    ClarifaiOutput, ClarifaiRequest, ClarifaiResponse, ClarifaiStatus, ClarifaiText,
};

#[cfg(feature = "elevenlabs")]
pub use elevenlabs::{
    DEFAULT_ELEVENLABS_MODEL, DEFAULT_ELEVENLABS_VOICE, ELEVENLABS_BASE_URL, ElevenLabsNarrator,
    ElevenLabsRequest, VoiceSettings,
};

#[cfg(feature = "local")]
pub use local::{
    DEFAULT_OLLAMA_MODEL, OLLAMA_BASE_URL, OllamaVision, STABLE_DIFFUSION_BASE_URL,
    StableDiffusionClient, Txt2ImgRequest,
};
