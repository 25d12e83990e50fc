//! Per-stage generation options.
//!
//! Each stage accepts a small set of recognized options. Anything left
//! unspecified falls back to the defaults below, which reproduce the
//! comic/story/narration tone the pipeline is built around.

use crate::{AudioFormat, Description};
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use storytoons_error::{ValidationError, ValidationErrorKind};

/// Default prompt wrapped around the user's description.
pub const DEFAULT_SYNTHESIS_TEMPLATE: &str = "You are a professional comic artist. Based on the below user's description and content, create a proper story comic: {description}";

/// Default instruction sent with the image to the understanding stage.
pub const DEFAULT_STORY_PROMPT: &str = "Analyze the content of this image and write a creative, engaging story that brings the scene to life. Describe the characters, setting, and actions in a way that would captivate a young audience:";

/// Options for the image synthesis stage.
///
/// # Examples
///
/// ```
/// use storytoons_core::{Description, SynthesisOptions, SynthesisOptionsBuilder};
///
/// let options = SynthesisOptionsBuilder::default()
///     .prompt_template("Draw: {description}")
///     .build()
///     .unwrap();
/// let description = Description::new("a cat").unwrap();
/// assert_eq!(options.render_prompt(&description), "Draw: a cat");
/// assert_eq!(options.quality(), "standard");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct SynthesisOptions {
    /// Prompt template; `{description}` is replaced by the user's text
    prompt_template: String,
    /// Provider model identifier (adapter default when unset)
    model: Option<String>,
    /// Quality hint ("standard" or "hd")
    quality: String,
    /// Output size as `WIDTHxHEIGHT`
    size: String,
    /// Sampler steps for local diffusion servers
    steps: u32,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            prompt_template: DEFAULT_SYNTHESIS_TEMPLATE.to_string(),
            model: None,
            quality: "standard".to_string(),
            size: "1024x1024".to_string(),
            steps: 30,
        }
    }
}

impl SynthesisOptions {
    /// Substitute the description into the prompt template.
    ///
    /// A template without the placeholder gets the description appended.
    pub fn render_prompt(&self, description: &Description) -> String {
        if self.prompt_template.contains("{description}") {
            self.prompt_template
                .replace("{description}", description.as_str())
        } else {
            format!("{} {}", self.prompt_template, description.as_str())
        }
    }

    /// Parse `size` into pixel dimensions.
    ///
    /// # Errors
    ///
    /// Fails if `size` is not of the form `WIDTHxHEIGHT` with non-zero values.
    #[track_caller]
    pub fn dimensions(&self) -> Result<(u32, u32), ValidationError> {
        let invalid = || {
            ValidationError::new(ValidationErrorKind::InvalidOption(format!(
                "size must be WIDTHxHEIGHT, got '{}'",
                self.size
            )))
        };
        let (width, height) = self.size.split_once('x').ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok((width, height))
    }
}

/// Options for the image understanding stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct UnderstandingOptions {
    /// Instruction describing the desired story tone and audience
    prompt: String,
    /// Provider model identifier (adapter default when unset)
    model: Option<String>,
    /// Sampling temperature
    temperature: f32,
    /// Upper bound on generated tokens
    max_tokens: u32,
}

impl Default for UnderstandingOptions {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_STORY_PROMPT.to_string(),
            model: None,
            temperature: 0.2,
            max_tokens: 1024,
        }
    }
}

/// Slowest speaking rate accepted by narration providers.
pub const MIN_SPEAKING_RATE: f32 = 0.25;
/// Fastest speaking rate accepted by narration providers.
pub const MAX_SPEAKING_RATE: f32 = 4.0;

/// Voice synthesis options for the narration stage.
///
/// # Examples
///
/// ```
/// use storytoons_core::{VoiceOptions, VoiceOptionsBuilder};
///
/// let defaults = VoiceOptions::default();
/// assert_eq!(defaults.voice(), "alloy");
/// assert_eq!(*defaults.speed(), 1.0);
///
/// let fast = VoiceOptionsBuilder::default().speed(9.0).build().unwrap();
/// assert!(fast.validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder, Getters)]
#[builder(setter(into), default)]
#[serde(default)]
pub struct VoiceOptions {
    /// Voice identity (provider-specific name or id)
    voice: String,
    /// Speaking rate multiplier
    speed: f32,
    /// Requested output format
    format: AudioFormat,
    /// Provider model identifier (adapter default when unset)
    model: Option<String>,
}

impl Default for VoiceOptions {
    fn default() -> Self {
        Self {
            voice: "alloy".to_string(),
            speed: 1.0,
            format: AudioFormat::Mp3,
            model: None,
        }
    }
}

impl VoiceOptions {
    /// Check that the options are in range.
    ///
    /// # Errors
    ///
    /// Fails if the voice is blank or the speed is outside
    /// [`MIN_SPEAKING_RATE`]..=[`MAX_SPEAKING_RATE`].
    #[track_caller]
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.voice.trim().is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::InvalidOption(
                "voice must not be empty".to_string(),
            )));
        }
        if !(MIN_SPEAKING_RATE..=MAX_SPEAKING_RATE).contains(&self.speed) {
            return Err(ValidationError::new(ValidationErrorKind::InvalidOption(
                format!(
                    "speed {} outside {}..={}",
                    self.speed, MIN_SPEAKING_RATE, MAX_SPEAKING_RATE
                ),
            )));
        }
        Ok(())
    }
}
