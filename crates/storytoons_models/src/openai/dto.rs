//! OpenAI request and response payloads.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// `POST /v1/images/generations` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ImageRequest {
    /// Model identifier
    model: String,
    /// Rendered prompt
    prompt: String,
    /// Number of images
    #[builder(default = "1")]
    n: u32,
    /// Output size as `WIDTHxHEIGHT`
    size: String,
    /// "standard" or "hd"
    quality: String,
    /// Always `b64_json`; URL responses would need a second fetch
    #[builder(default = "\"b64_json\".to_string()")]
    response_format: String,
}

impl ImageRequest {
    /// Creates a new builder for `ImageRequest`.
    pub fn builder() -> ImageRequestBuilder {
        ImageRequestBuilder::default()
    }
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ImageData {
    /// Base64-encoded image bytes
    #[serde(default)]
    b64_json: Option<String>,
    /// Prompt as rewritten by the model
    #[serde(default)]
    revised_prompt: Option<String>,
}

/// `POST /v1/images/generations` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct ImageResponse {
    /// Generated images
    #[serde(default)]
    data: Vec<ImageData>,
}

/// Image reference inside a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// `data:` URL carrying the image
    pub url: String,
}

/// One part of a multimodal chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatContentPart {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
    /// Inline image
    ImageUrl {
        /// The image reference
        image_url: ImageUrl,
    },
}

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ChatMessage {
    /// Message role
    role: String,
    /// Message parts
    content: Vec<ChatContentPart>,
}

impl ChatMessage {
    /// A user message made of the given parts.
    pub fn user(content: Vec<ChatContentPart>) -> Self {
        Self {
            role: "user".to_string(),
            content,
        }
    }
}

/// `POST /v1/chat/completions` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct ChatRequest {
    /// Model identifier
    model: String,
    /// Conversation
    messages: Vec<ChatMessage>,
    /// Sampling temperature
    temperature: f32,
    /// Upper bound on generated tokens
    max_tokens: u32,
}

impl ChatRequest {
    /// Creates a new builder for `ChatRequest`.
    pub fn builder() -> ChatRequestBuilder {
        ChatRequestBuilder::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatResponseMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct ChatChoice {
    pub(crate) message: ChatResponseMessage,
}

/// `POST /v1/chat/completions` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub(crate) choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Text of the first choice, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// `POST /v1/audio/speech` request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into))]
pub struct SpeechRequest {
    /// Model identifier
    model: String,
    /// Text to speak
    input: String,
    /// Voice name
    voice: String,
    /// Speaking rate
    speed: f32,
    /// Output container ("mp3", "wav", ...)
    response_format: String,
}

impl SpeechRequest {
    /// Creates a new builder for `SpeechRequest`.
    pub fn builder() -> SpeechRequestBuilder {
        SpeechRequestBuilder::default()
    }
}
