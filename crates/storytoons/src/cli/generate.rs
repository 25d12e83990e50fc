//! `storytoons generate`.

use super::{build_registry, load_config};
use std::path::{Path, PathBuf};
use storytoons::{
    PipelineRun, PipelineState, RunEvent, StorageBackend, StorytoonsResult,
};
use tracing::{info, instrument};

/// Run the pipeline for one description and print the outcome.
///
/// Stage failures are reported inline and do not make the command fail;
/// only configuration problems do.
#[instrument(skip_all, fields(output_dir = ?output_dir))]
pub async fn run_generate(
    description: &str,
    output_dir: Option<PathBuf>,
    config_path: Option<&Path>,
) -> StorytoonsResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(dir) = output_dir {
        config.storage.backend = StorageBackend::Filesystem;
        config.storage.path = dir;
    }
    let pipeline = build_registry(config)?.pipeline()?;

    let mut spawned = pipeline.spawn(description);
    info!(run_id = %spawned.run_id, "Run submitted");

    while let Some(event) = spawned.events.recv().await {
        print_event(&event);
    }

    let run = match spawned.handle.await {
        Ok(run) => run,
        Err(e) => {
            eprintln!("✗ Pipeline task ended abnormally: {}", e);
            return Ok(());
        }
    };
    print_summary(&run);
    Ok(())
}

fn print_event(event: &RunEvent) {
    match event {
        RunEvent::StageStarted { stage, .. } => println!("… {}", stage.purpose()),
        RunEvent::ImageReady { width, height, .. } => {
            println!("✓ Comic image ready ({}x{})", width, height)
        }
        RunEvent::NarrativeReady { .. } => println!("✓ Story written"),
        RunEvent::AudioReady { format, size, .. } => {
            println!("✓ Narration ready ({}, {} bytes)", format, size)
        }
        RunEvent::Completed { .. } => {}
        RunEvent::Failed { error, .. } => eprintln!("✗ {}", error.user_message()),
    }
}

fn print_summary(run: &PipelineRun) {
    if *run.state() == PipelineState::Idle {
        eprintln!("Nothing to do: please enter a description.");
        return;
    }

    if let Some(story) = run.narrative() {
        println!();
        println!("{}", story);
        println!();
    }
    if let Some(location) = run.image().as_ref().and_then(|image| image.location().as_ref()) {
        println!("Image: {}", location.path);
    }
    if let Some(location) = run.audio().as_ref().and_then(|audio| audio.location().as_ref()) {
        println!("Audio: {}", location.path);
    }
    println!("Run {} finished: {}", run.id(), run.state());
}
