//! JSON-friendly view of a finished run.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use storytoons_core::ArtifactLocation;
use storytoons_error::{Stage, StageError};
use storytoons_pipeline::{PipelineRun, PipelineState};
use uuid::Uuid;

/// Why a run failed, phrased for display next to the failed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Stage that failed
    pub stage: Stage,
    /// What the stage was doing ("Generating the comic image")
    pub purpose: String,
    /// Failure class ("GenerationFailure", ...)
    pub kind: String,
    /// Provider or transport cause
    pub cause: String,
    /// One-line message for users
    pub message: String,
    /// Provider HTTP status, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Whether retrying later might help
    pub transient: bool,
}

impl From<&StageError> for FailureReport {
    fn from(error: &StageError) -> Self {
        Self {
            stage: error.stage,
            purpose: error.stage.purpose().to_string(),
            kind: error.kind.name().to_string(),
            cause: error.kind.cause().to_string(),
            message: error.user_message(),
            status: error.status,
            transient: error.is_transient(),
        }
    }
}

/// An encoded artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaReport {
    /// MIME type
    pub mime_type: String,
    /// Base64 content
    pub base64: String,
    /// Where the artifact was persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ArtifactLocation>,
}

/// Summary of a run, as returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run identifier
    pub run_id: Uuid,
    /// Final state
    pub state: PipelineState,
    /// Description as submitted
    pub description: String,
    /// Failure, if the run failed
    pub failure: Option<FailureReport>,
    /// Generated image
    pub image: Option<MediaReport>,
    /// Written story
    pub story: Option<String>,
    /// Narration audio
    pub audio: Option<MediaReport>,
}

impl From<&PipelineRun> for RunReport {
    fn from(run: &PipelineRun) -> Self {
        Self {
            run_id: *run.id(),
            state: *run.state(),
            description: run.description().clone(),
            failure: run.failure().as_ref().map(FailureReport::from),
            image: run.image().as_ref().map(|image| MediaReport {
                mime_type: image.format().mime_type().to_string(),
                base64: STANDARD.encode(image.bytes()),
                location: image.location().clone(),
            }),
            story: run.narrative().as_ref().map(|text| text.as_str().to_string()),
            audio: run.audio().as_ref().map(|audio| MediaReport {
                mime_type: audio.format().mime_type().to_string(),
                base64: STANDARD.encode(audio.bytes()),
                location: audio.location().clone(),
            }),
        }
    }
}
