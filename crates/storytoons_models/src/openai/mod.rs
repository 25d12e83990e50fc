//! OpenAI platform integration: DALL·E images, GPT-4o vision and TTS.

mod client;
mod dto;

pub use client::{OPENAI_BASE_URL, OpenAiClient};
pub use dto::{
    ChatContentPart, ChatMessage, ChatRequest, ChatRequestBuilder, ChatResponse, ImageRequest,
    ImageRequestBuilder, ImageResponse, ImageUrl, SpeechRequest, SpeechRequestBuilder,
};
