//! Pipeline state machine.

use serde::{Deserialize, Serialize};
use storytoons_error::Stage;

/// Where a run is in the describe → image → story → narration sequence.
///
/// ```text
/// Idle → Synthesizing → Understanding → Narrating → Done
///            ↘              ↘               ↘
///                          Failed
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PipelineState {
    /// Nothing submitted yet, or the description was empty
    #[default]
    Idle,
    /// Image synthesis in flight
    Synthesizing,
    /// Image understanding in flight
    Understanding,
    /// Narration in flight
    Narrating,
    /// Every stage produced its artifact
    Done,
    /// A stage failed; see the run's failure
    Failed,
}

impl PipelineState {
    /// The in-flight state for a stage.
    pub fn running(stage: Stage) -> Self {
        match stage {
            Stage::Synthesis => PipelineState::Synthesizing,
            Stage::Understanding => PipelineState::Understanding,
            Stage::Narration => PipelineState::Narrating,
        }
    }

    /// The stage executing in this state, if any.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Synthesizing => Some(Stage::Synthesis),
            PipelineState::Understanding => Some(Stage::Understanding),
            PipelineState::Narrating => Some(Stage::Narration),
            PipelineState::Idle | PipelineState::Done | PipelineState::Failed => None,
        }
    }

    /// Whether the run has finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Done | PipelineState::Failed)
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Idle, Synthesizing)
                | (Synthesizing, Understanding)
                | (Understanding, Narrating)
                | (Narrating, Done)
                | (Synthesizing | Understanding | Narrating, Failed)
        )
    }
}
