//! Stub stage adapters and a throwaway API server.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use std::io::Cursor;
use std::net::SocketAddr;
use std::sync::Arc;
use storytoons::{
    AudioArtifact, AudioFormat, Description, ImageArtifact, ImageSynthesizer, ImageUnderstanding,
    NarrativeText, Narrator, StageError, StageResult, StoryPipeline, SynthesisOptions,
    UnderstandingOptions, VoiceOptions,
    server::{ApiState, create_router},
};

pub const STORY: &str = "The lighthouse keeper's cat sailed away on a paper boat.";

/// Encode a small PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = ImageBuffer::from_fn(8, 8, |x, y| Rgb([x as u8 * 30, y as u8 * 30, 90u8]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

/// MP3 frame header followed by padding.
pub fn mp3_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFB, 0x90, 0x64];
    bytes.extend(std::iter::repeat_n(0u8, 128));
    bytes
}

#[derive(Debug)]
pub struct StubSynthesizer(pub Option<StageError>);

#[async_trait]
impl ImageSynthesizer for StubSynthesizer {
    async fn synthesize(
        &self,
        _description: &Description,
        _options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        match &self.0 {
            Some(e) => Err(e.clone()),
            None => Ok(ImageArtifact::from_bytes(png_bytes()).expect("png artifact")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug)]
pub struct StubUnderstanding;

#[async_trait]
impl ImageUnderstanding for StubUnderstanding {
    async fn describe(
        &self,
        _image: &ImageArtifact,
        _options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        Ok(NarrativeText::new(STORY).expect("story"))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

#[derive(Debug)]
pub struct StubNarrator;

#[async_trait]
impl Narrator for StubNarrator {
    async fn narrate(
        &self,
        _text: &NarrativeText,
        _voice: &VoiceOptions,
    ) -> StageResult<AudioArtifact> {
        Ok(AudioArtifact::new(mp3_bytes(), AudioFormat::Mp3).expect("mp3 artifact"))
    }

    fn provider_name(&self) -> &'static str {
        "stub"
    }
}

/// A pipeline whose synthesis stage fails with `synthesis_error`, if given.
pub fn stub_pipeline(synthesis_error: Option<StageError>) -> StoryPipeline {
    StoryPipeline::new(
        Arc::new(StubSynthesizer(synthesis_error)),
        Arc::new(StubUnderstanding),
        Arc::new(StubNarrator),
    )
}

/// Serve the API for `pipeline` on an ephemeral port.
pub async fn spawn_api(pipeline: StoryPipeline) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let router = create_router(ApiState::new(pipeline));
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve");
    });
    addr
}
