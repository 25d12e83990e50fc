//! The record of one pipeline run.

use crate::PipelineState;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use storytoons_core::{AudioArtifact, ImageArtifact, NarrativeText};
use storytoons_error::{Stage, StageError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique identifier of a run; artifacts are persisted under it.
pub type RunId = Uuid;

/// One execution of the pipeline for one description.
///
/// Artifacts are owned by the run, so concurrent runs never observe each
/// other's output. A failed run keeps whatever earlier stages produced.
#[derive(Debug, Clone, Getters)]
pub struct PipelineRun {
    /// Run identifier
    id: RunId,
    /// Description as submitted
    description: String,
    /// Current state
    state: PipelineState,
    /// Generated image, once synthesis succeeds
    image: Option<ImageArtifact>,
    /// Written story, once understanding succeeds
    narrative: Option<NarrativeText>,
    /// Narration audio, once narration succeeds
    audio: Option<AudioArtifact>,
    /// Failure that stopped the run
    failure: Option<StageError>,
    /// When the run record was created
    created_at: DateTime<Utc>,
    /// When the run reached a terminal state
    finished_at: Option<DateTime<Utc>>,
}

impl PipelineRun {
    /// Create an idle run for `description`.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            state: PipelineState::Idle,
            image: None,
            narrative: None,
            audio: None,
            failure: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Whether every stage succeeded.
    pub fn is_done(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Whether a stage failed.
    pub fn is_failed(&self) -> bool {
        self.state == PipelineState::Failed
    }

    /// Stage that failed, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        self.failure.as_ref().map(|failure| failure.stage)
    }

    /// Wall-clock duration, once finished.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        self.finished_at.map(|finished| finished - self.created_at)
    }

    pub(crate) fn transition(&mut self, next: PipelineState) {
        if !self.state.can_transition_to(next) {
            warn!(run_id = %self.id, from = %self.state, to = %next, "Illegal state transition");
            return;
        }
        debug!(run_id = %self.id, from = %self.state, to = %next, "State transition");
        self.state = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
    }

    pub(crate) fn fail(&mut self, failure: StageError) {
        self.transition(PipelineState::Failed);
        self.failure = Some(failure);
    }

    pub(crate) fn set_image(&mut self, image: ImageArtifact) {
        self.image = Some(image);
    }

    pub(crate) fn set_narrative(&mut self, narrative: NarrativeText) {
        self.narrative = Some(narrative);
    }

    pub(crate) fn set_audio(&mut self, audio: AudioArtifact) {
        self.audio = Some(audio);
    }
}
