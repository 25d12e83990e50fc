//! Trait definitions for the three pipeline stages.

use async_trait::async_trait;
use std::sync::Arc;
use storytoons_core::{
    AudioArtifact, Description, ImageArtifact, NarrativeText, SynthesisOptions,
    UnderstandingOptions, VoiceOptions,
};
use storytoons_error::StageResult;

/// Text-to-image capability.
///
/// Implementations must return a decodable image or a [`StageError`] tagged
/// with [`Stage::Synthesis`]; transport errors never escape untyped.
///
/// [`StageError`]: storytoons_error::StageError
/// [`Stage::Synthesis`]: storytoons_error::Stage::Synthesis
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Generate one image for the description.
    async fn synthesize(
        &self,
        description: &Description,
        options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact>;

    /// Provider name (e.g., "openai", "clarifai").
    fn provider_name(&self) -> &'static str;
}

/// Image-to-text capability.
#[async_trait]
pub trait ImageUnderstanding: Send + Sync {
    /// Write a story about the image. Empty output is a failure.
    async fn describe(
        &self,
        image: &ImageArtifact,
        options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;
}

/// Text-to-speech capability.
#[async_trait]
pub trait Narrator: Send + Sync {
    /// Speak the story.
    async fn narrate(&self, text: &NarrativeText, voice: &VoiceOptions)
    -> StageResult<AudioArtifact>;

    /// Provider name.
    fn provider_name(&self) -> &'static str;
}

#[async_trait]
impl<T: ImageSynthesizer + ?Sized> ImageSynthesizer for Arc<T> {
    async fn synthesize(
        &self,
        description: &Description,
        options: &SynthesisOptions,
    ) -> StageResult<ImageArtifact> {
        (**self).synthesize(description, options).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}

#[async_trait]
impl<T: ImageUnderstanding + ?Sized> ImageUnderstanding for Arc<T> {
    async fn describe(
        &self,
        image: &ImageArtifact,
        options: &UnderstandingOptions,
    ) -> StageResult<NarrativeText> {
        (**self).describe(image, options).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}

#[async_trait]
impl<T: Narrator + ?Sized> Narrator for Arc<T> {
    async fn narrate(
        &self,
        text: &NarrativeText,
        voice: &VoiceOptions,
    ) -> StageResult<AudioArtifact> {
        (**self).narrate(text, voice).await
    }

    fn provider_name(&self) -> &'static str {
        (**self).provider_name()
    }
}
