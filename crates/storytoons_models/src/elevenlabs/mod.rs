//! ElevenLabs text-to-speech integration.

mod client;

pub use client::{
    DEFAULT_ELEVENLABS_MODEL, DEFAULT_ELEVENLABS_VOICE, ELEVENLABS_BASE_URL, ElevenLabsNarrator,
    ElevenLabsRequest, VoiceSettings,
};
