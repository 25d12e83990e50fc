//! Progress events emitted by spawned runs.

use crate::RunId;
use storytoons_core::{ArtifactLocation, AudioFormat, ImageFormat};
use storytoons_error::{Stage, StageError};

/// A step of progress in a spawned run.
///
/// Events arrive in pipeline order and end with exactly one `Completed` or
/// `Failed`, unless the description was empty, in which case the channel
/// closes without any event.
#[derive(Debug, Clone)]
pub enum RunEvent {
    /// A stage began
    StageStarted {
        /// Run identifier
        run_id: RunId,
        /// Stage that started
        stage: Stage,
    },
    /// Synthesis produced an image
    ImageReady {
        /// Run identifier
        run_id: RunId,
        /// Image format
        format: ImageFormat,
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
        /// Where the image was persisted
        location: Option<ArtifactLocation>,
    },
    /// Understanding produced a story
    NarrativeReady {
        /// Run identifier
        run_id: RunId,
        /// The story
        text: String,
    },
    /// Narration produced audio
    AudioReady {
        /// Run identifier
        run_id: RunId,
        /// Audio format
        format: AudioFormat,
        /// Size in bytes
        size: usize,
        /// Where the audio was persisted
        location: Option<ArtifactLocation>,
    },
    /// Every stage succeeded
    Completed {
        /// Run identifier
        run_id: RunId,
    },
    /// A stage failed and the run stopped
    Failed {
        /// Run identifier
        run_id: RunId,
        /// The failure
        error: StageError,
    },
}

impl RunEvent {
    /// Run the event belongs to.
    pub fn run_id(&self) -> RunId {
        match self {
            RunEvent::StageStarted { run_id, .. }
            | RunEvent::ImageReady { run_id, .. }
            | RunEvent::NarrativeReady { run_id, .. }
            | RunEvent::AudioReady { run_id, .. }
            | RunEvent::Completed { run_id }
            | RunEvent::Failed { run_id, .. } => *run_id,
        }
    }

    /// Whether this is the last event of the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Completed { .. } | RunEvent::Failed { .. })
    }
}
