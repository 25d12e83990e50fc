//! The pipeline orchestrator.

use crate::{PipelineRun, PipelineState, RunEvent, RunId};
use std::sync::Arc;
use storytoons_core::{
    ArtifactLocation, AudioArtifact, Description, ImageArtifact, NarrativeText, SynthesisOptions,
    UnderstandingOptions, VoiceOptions,
};
use storytoons_error::{Stage, StageError, StageResult, StorytoonsError, StorytoonsErrorKind};
use storytoons_interface::{ImageSynthesizer, ImageUnderstanding, Narrator};
use storytoons_storage::{ArtifactKind, ArtifactMetadata, ArtifactStore};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info, info_span};

/// Runs descriptions through synthesis, understanding and narration.
///
/// Stages run strictly in sequence and each starts only once the previous
/// one produced its artifact. Failures are recorded on the returned
/// [`PipelineRun`]; nothing is retried and nothing produced earlier is
/// discarded.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use storytoons_core::Credentials;
/// use storytoons_models::{OpenAiClient, build_http_client};
/// use storytoons_pipeline::StoryPipeline;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let http = build_http_client(std::time::Duration::from_secs(120))?;
/// let openai = Arc::new(OpenAiClient::from_credentials(http, &Credentials::from_env()));
/// let pipeline = StoryPipeline::new(openai.clone(), openai.clone(), openai);
///
/// let run = pipeline.run("a robot exploring a forest").await;
/// if let Some(story) = run.narrative() {
///     println!("{}", story);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StoryPipeline {
    synthesizer: Arc<dyn ImageSynthesizer>,
    understanding: Arc<dyn ImageUnderstanding>,
    narrator: Arc<dyn Narrator>,
    synthesis_options: SynthesisOptions,
    understanding_options: UnderstandingOptions,
    voice: VoiceOptions,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl std::fmt::Debug for StoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoryPipeline")
            .field("synthesizer", &self.synthesizer.provider_name())
            .field("understanding", &self.understanding.provider_name())
            .field("narrator", &self.narrator.provider_name())
            .field(
                "store",
                &self.store.as_ref().map(|store| store.backend_name()),
            )
            .finish()
    }
}

/// A run executing on its own task.
#[derive(Debug)]
pub struct SpawnedRun {
    /// Identifier of the run
    pub run_id: RunId,
    /// Resolves to the finished run record
    pub handle: JoinHandle<PipelineRun>,
    /// Progress events, closed when the run finishes
    pub events: mpsc::UnboundedReceiver<RunEvent>,
}

struct EventSink(Option<mpsc::UnboundedSender<RunEvent>>);

impl EventSink {
    fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.0 {
            if sender.send(event).is_err() {
                debug!("Event receiver dropped");
            }
        }
    }
}

impl StoryPipeline {
    /// Create a pipeline from one adapter per stage, with default options
    /// and no artifact store.
    pub fn new(
        synthesizer: Arc<dyn ImageSynthesizer>,
        understanding: Arc<dyn ImageUnderstanding>,
        narrator: Arc<dyn Narrator>,
    ) -> Self {
        Self {
            synthesizer,
            understanding,
            narrator,
            synthesis_options: SynthesisOptions::default(),
            understanding_options: UnderstandingOptions::default(),
            voice: VoiceOptions::default(),
            store: None,
        }
    }

    /// Set image synthesis options.
    pub fn with_synthesis_options(mut self, options: SynthesisOptions) -> Self {
        self.synthesis_options = options;
        self
    }

    /// Set image understanding options.
    pub fn with_understanding_options(mut self, options: UnderstandingOptions) -> Self {
        self.understanding_options = options;
        self
    }

    /// Set narration voice options.
    pub fn with_voice(mut self, voice: VoiceOptions) -> Self {
        self.voice = voice;
        self
    }

    /// Persist image and audio artifacts per run in `store`.
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Artifact store, if configured.
    pub fn store(&self) -> Option<&Arc<dyn ArtifactStore>> {
        self.store.as_ref()
    }

    /// Provider serving each stage.
    pub fn providers(&self) -> [(Stage, &'static str); 3] {
        [
            (Stage::Synthesis, self.synthesizer.provider_name()),
            (Stage::Understanding, self.understanding.provider_name()),
            (Stage::Narration, self.narrator.provider_name()),
        ]
    }

    /// Run the pipeline to completion.
    ///
    /// Always returns the run record. An empty description leaves the run
    /// `Idle` without invoking any stage.
    pub async fn run(&self, description: impl Into<String>) -> PipelineRun {
        self.execute(PipelineRun::new(description), EventSink(None))
            .await
    }

    /// Run the pipeline on a tokio task, reporting progress over a channel.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, description: impl Into<String>) -> SpawnedRun {
        let run = PipelineRun::new(description);
        let run_id = *run.id();
        let (sender, events) = mpsc::unbounded_channel();
        let pipeline = self.clone();
        let handle =
            tokio::spawn(async move { pipeline.execute(run, EventSink(Some(sender))).await });

        SpawnedRun {
            run_id,
            handle,
            events,
        }
    }

    async fn execute(&self, mut run: PipelineRun, events: EventSink) -> PipelineRun {
        let run_id = *run.id();
        let span = info_span!("pipeline_run", run_id = %run_id);

        async move {
            let description = match Description::new(run.description()) {
                Ok(description) => description,
                Err(e) => {
                    info!(reason = %e.kind, "Nothing to do; run stays idle");
                    return run;
                }
            };
            info!("Run started");

            self.begin(&mut run, &events, Stage::Synthesis);
            let image = match self
                .synthesize(run_id, &description)
                .instrument(info_span!(
                    "stage",
                    stage = %Stage::Synthesis,
                    provider = self.synthesizer.provider_name()
                ))
                .await
            {
                Ok(image) => image,
                Err(e) => return abort(run, &events, e),
            };
            events.emit(RunEvent::ImageReady {
                run_id,
                format: *image.format(),
                width: *image.width(),
                height: *image.height(),
                location: image.location().clone(),
            });
            run.set_image(image.clone());

            self.begin(&mut run, &events, Stage::Understanding);
            let narrative = match self
                .understand(&image)
                .instrument(info_span!(
                    "stage",
                    stage = %Stage::Understanding,
                    provider = self.understanding.provider_name()
                ))
                .await
            {
                Ok(narrative) => narrative,
                Err(e) => return abort(run, &events, e),
            };
            events.emit(RunEvent::NarrativeReady {
                run_id,
                text: narrative.as_str().to_string(),
            });
            run.set_narrative(narrative.clone());

            self.begin(&mut run, &events, Stage::Narration);
            let audio = match self
                .narrate(run_id, &narrative)
                .instrument(info_span!(
                    "stage",
                    stage = %Stage::Narration,
                    provider = self.narrator.provider_name()
                ))
                .await
            {
                Ok(audio) => audio,
                Err(e) => return abort(run, &events, e),
            };
            events.emit(RunEvent::AudioReady {
                run_id,
                format: *audio.format(),
                size: audio.size(),
                location: audio.location().clone(),
            });
            run.set_audio(audio);

            run.transition(PipelineState::Done);
            info!(elapsed_ms = ?run.elapsed().map(|d| d.num_milliseconds()), "Run completed");
            events.emit(RunEvent::Completed { run_id });
            run
        }
        .instrument(span)
        .await
    }

    fn begin(&self, run: &mut PipelineRun, events: &EventSink, stage: Stage) {
        run.transition(PipelineState::running(stage));
        info!(stage = %stage, "{}", stage.purpose());
        events.emit(RunEvent::StageStarted {
            run_id: *run.id(),
            stage,
        });
    }

    async fn synthesize(
        &self,
        run_id: RunId,
        description: &Description,
    ) -> StageResult<ImageArtifact> {
        let image = self
            .synthesizer
            .synthesize(description, &self.synthesis_options)
            .await?;
        let format = *image.format();
        let location = self
            .persist(
                run_id,
                Stage::Synthesis,
                image.bytes(),
                ArtifactMetadata::new(ArtifactKind::Image, format.mime_type(), format.extension()),
            )
            .await?;

        Ok(match location {
            Some(location) => image.with_location(location),
            None => image,
        })
    }

    async fn understand(&self, image: &ImageArtifact) -> StageResult<NarrativeText> {
        self.understanding
            .describe(image, &self.understanding_options)
            .await
    }

    async fn narrate(&self, run_id: RunId, narrative: &NarrativeText) -> StageResult<AudioArtifact> {
        let audio = self.narrator.narrate(narrative, &self.voice).await?;
        let format = *audio.format();
        let location = self
            .persist(
                run_id,
                Stage::Narration,
                audio.bytes(),
                ArtifactMetadata::new(ArtifactKind::Audio, format.mime_type(), format.extension()),
            )
            .await?;

        Ok(match location {
            Some(location) => audio.with_location(location),
            None => audio,
        })
    }

    async fn persist(
        &self,
        run_id: RunId,
        stage: Stage,
        bytes: &[u8],
        metadata: ArtifactMetadata,
    ) -> StageResult<Option<ArtifactLocation>> {
        let Some(store) = &self.store else {
            return Ok(None);
        };
        let reference = store
            .store(run_id, bytes, &metadata)
            .await
            .map_err(|e| storage_failure(stage, e))?;
        Ok(Some(reference.location()))
    }
}

fn abort(mut run: PipelineRun, events: &EventSink, failure: StageError) -> PipelineRun {
    error!(
        stage = %failure.stage,
        kind = failure.kind.name(),
        cause = failure.kind.cause(),
        status = ?failure.status,
        "Stage failed"
    );
    events.emit(RunEvent::Failed {
        run_id: *run.id(),
        error: failure.clone(),
    });
    run.fail(failure);
    run
}

#[track_caller]
fn storage_failure(stage: Stage, e: StorytoonsError) -> StageError {
    let cause = match e.kind() {
        StorytoonsErrorKind::Storage(storage) => storage.kind.to_string(),
        other => other.to_string(),
    };
    StageError::storage(stage, cause)
}
