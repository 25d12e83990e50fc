//! Scripted stage adapters for pipeline tests.

#![allow(dead_code)]

use async_trait::async_trait;
use image::{ImageBuffer, Rgb};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storytoons_core::{
    AudioArtifact, AudioFormat, Description, ImageArtifact, NarrativeText, SynthesisOptions,
    UnderstandingOptions, VoiceOptions,
};
use storytoons_error::{Stage, StageError, StageResult};
use storytoons_interface::{ImageSynthesizer, ImageUnderstanding, Narrator};
use storytoons_pipeline::StoryPipeline;

/// Encode a small PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200u8]));
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

/// Size of the canned narration buffer.
pub const WAV_LEN: usize = 5 * 1024;

/// WAV header padded with silence to [`WAV_LEN`] bytes.
pub fn wav_bytes() -> Vec<u8> {
    let mut bytes = b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec();
    bytes.resize(WAV_LEN, 0);
    bytes
}

/// How a mock stage behaves.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Succeed with the stage's canned output
    Succeed,
    /// Fail with this error
    Fail(StageError),
    /// Sleep, then succeed
    Delay(Duration),
}

/// Mock synthesizer that counts calls and records prompts.
#[derive(Debug)]
pub struct MockSynthesizer {
    pub behavior: Behavior,
    pub calls: AtomicUsize,
    pub last_description: std::sync::Mutex<Option<String>>,
}

impl MockSynthesizer {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_description: std::sync::Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageSynthesizer for MockSynthesizer {
    async fn synthesize(
        &self,
        description: &Description,
        _options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_description.lock().unwrap() = Some(description.as_str().to_string());
        match &self.behavior {
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Delay(d) => {
                tokio::time::sleep(*d).await;
                Ok(ImageArtifact::from_bytes(png_bytes(16, 16)).unwrap())
            }
            Behavior::Succeed => Ok(ImageArtifact::from_bytes(png_bytes(16, 16)).unwrap()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Mock understanding stage.
#[derive(Debug)]
pub struct MockUnderstanding {
    pub behavior: Behavior,
    pub story: String,
    pub calls: AtomicUsize,
}

impl MockUnderstanding {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Self::with_story(behavior, "Once upon a time, a robot found a mossy door.")
    }

    pub fn with_story(behavior: Behavior, story: &str) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            story: story.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageUnderstanding for MockUnderstanding {
    async fn describe(
        &self,
        _image: &ImageArtifact,
        _options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Delay(d) => {
                tokio::time::sleep(*d).await;
                NarrativeText::new(&self.story)
                    .map_err(|e| StageError::failure(Stage::Understanding, e.kind.to_string()))
            }
            Behavior::Succeed => NarrativeText::new(&self.story)
                .map_err(|e| StageError::failure(Stage::Understanding, e.kind.to_string())),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Mock narrator.
#[derive(Debug)]
pub struct MockNarrator {
    pub behavior: Behavior,
    pub calls: AtomicUsize,
}

impl MockNarrator {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Narrator for MockNarrator {
    async fn narrate(
        &self,
        _text: &NarrativeText,
        _voice: &VoiceOptions,
    ) -> StageResult<AudioArtifact> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Delay(d) => {
                tokio::time::sleep(*d).await;
                Ok(AudioArtifact::new(wav_bytes(), AudioFormat::Wav).unwrap())
            }
            Behavior::Succeed => Ok(AudioArtifact::new(wav_bytes(), AudioFormat::Wav).unwrap()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Mocks for all three stages, kept for call-count assertions.
pub struct Mocks {
    pub synthesizer: Arc<MockSynthesizer>,
    pub understanding: Arc<MockUnderstanding>,
    pub narrator: Arc<MockNarrator>,
}

impl Mocks {
    pub fn new(synthesis: Behavior, understanding: Behavior, narration: Behavior) -> Self {
        Self {
            synthesizer: MockSynthesizer::new(synthesis),
            understanding: MockUnderstanding::new(understanding),
            narrator: MockNarrator::new(narration),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(Behavior::Succeed, Behavior::Succeed, Behavior::Succeed)
    }

    pub fn pipeline(&self) -> StoryPipeline {
        StoryPipeline::new(
            self.synthesizer.clone(),
            self.understanding.clone(),
            self.narrator.clone(),
        )
    }

    pub fn call_counts(&self) -> (usize, usize, usize) {
        (
            self.synthesizer.calls(),
            self.understanding.calls(),
            self.narrator.calls(),
        )
    }
}
