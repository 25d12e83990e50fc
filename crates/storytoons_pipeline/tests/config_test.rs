//! Configuration layering and provider registry tests.

use std::io::Write;
use storytoons_core::{AudioFormat, Credentials, ProviderKey};
use storytoons_error::{Stage, StorytoonsErrorKind};
use storytoons_pipeline::{
    ConfigSources, ProviderKind, ProviderRegistry, StorageBackend, StorytoonsConfig,
};
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn isolated() -> ConfigSources {
    ConfigSources {
        env: Some(config::Map::new()),
        ..ConfigSources::default()
    }
}

fn env(vars: &[(&str, &str)]) -> config::Map<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_bundled_defaults() {
    let config = StorytoonsConfig::load_from(isolated()).unwrap();

    assert_eq!(config.providers.synthesis, ProviderKind::Clarifai);
    assert_eq!(config.providers.understanding, ProviderKind::Clarifai);
    assert_eq!(config.providers.narration, ProviderKind::Clarifai);
    assert_eq!(config.synthesis.size(), "1024x1024");
    assert_eq!(config.synthesis.quality(), "standard");
    assert!((config.understanding.temperature() - 0.2).abs() < f32::EPSILON);
    assert_eq!(config.narration.voice(), "alloy");
    assert_eq!(*config.narration.format(), AudioFormat::Mp3);
    assert_eq!(config.storage.backend, StorageBackend::Filesystem);
    assert_eq!(config.http.timeout_secs, 120);
    assert_eq!(
        config.endpoints.for_provider(ProviderKind::Ollama),
        Some("http://127.0.0.1:11434")
    );
}

#[test]
fn test_local_file_overrides_user_file() {
    let user = toml_file(
        r#"
        [providers]
        synthesis = "openai"
        narration = "elevenlabs"
        "#,
    );
    let local = toml_file(
        r#"
        [providers]
        synthesis = "stable_diffusion"

        [narration]
        voice = "nova"
        speed = 1.25
        "#,
    );
    let sources = ConfigSources {
        user_file: Some(user.path().to_path_buf()),
        local_file: Some(local.path().to_path_buf()),
        ..isolated()
    };

    let config = StorytoonsConfig::load_from(sources).unwrap();

    assert_eq!(config.providers.synthesis, ProviderKind::StableDiffusion);
    assert_eq!(config.providers.understanding, ProviderKind::Clarifai);
    assert_eq!(config.providers.narration, ProviderKind::ElevenLabs);
    assert_eq!(config.narration.voice(), "nova");
    assert!((config.narration.speed() - 1.25).abs() < f32::EPSILON);
    // Untouched keys in a partially overridden section keep their defaults.
    assert_eq!(*config.narration.format(), AudioFormat::Mp3);
}

#[test]
fn test_environment_overrides_files() {
    let local = toml_file(
        r#"
        [providers]
        understanding = "openai"
        "#,
    );
    let sources = ConfigSources {
        local_file: Some(local.path().to_path_buf()),
        env: Some(env(&[
            ("STORYTOONS__PROVIDERS__UNDERSTANDING", "ollama"),
            ("STORYTOONS__HTTP__TIMEOUT_SECS", "30"),
            ("STORYTOONS__STORAGE__BACKEND", "memory"),
            ("UNRELATED", "ignored"),
        ])),
        ..ConfigSources::default()
    };

    let config = StorytoonsConfig::load_from(sources).unwrap();

    assert_eq!(config.providers.understanding, ProviderKind::Ollama);
    assert_eq!(config.http.timeout_secs, 30);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
}

#[test]
fn test_missing_optional_files_are_skipped() {
    let sources = ConfigSources {
        user_file: Some("/nonexistent/storytoons.toml".into()),
        local_file: Some("/also/nonexistent/storytoons.toml".into()),
        ..isolated()
    };
    assert!(StorytoonsConfig::load_from(sources).is_ok());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let sources = isolated().with_explicit_file("/nonexistent/custom.toml");
    let err = StorytoonsConfig::load_from(sources).unwrap_err();
    assert!(matches!(err.kind(), StorytoonsErrorKind::Config(_)));
}

#[test]
fn test_provider_stage_mismatch_is_config_error() {
    let local = toml_file(
        r#"
        [providers]
        synthesis = "elevenlabs"
        "#,
    );
    let sources = ConfigSources {
        local_file: Some(local.path().to_path_buf()),
        ..isolated()
    };

    let err = StorytoonsConfig::load_from(sources).unwrap_err();
    match err.kind() {
        StorytoonsErrorKind::Config(config) => {
            assert!(config.message.contains("elevenlabs"));
            assert!(config.message.contains("image synthesis"));
        }
        other => panic!("expected config error, got {}", other),
    }
}

#[test]
fn test_unknown_provider_is_config_error() {
    let sources = ConfigSources {
        env: Some(env(&[("STORYTOONS__PROVIDERS__NARRATION", "carrier_pigeon")])),
        ..ConfigSources::default()
    };
    let err = StorytoonsConfig::load_from(sources).unwrap_err();
    assert!(matches!(err.kind(), StorytoonsErrorKind::Config(_)));
}

#[test]
fn test_out_of_range_speed_is_config_error() {
    let local = toml_file("[narration]\nspeed = 9.0\n");
    let err = StorytoonsConfig::from_file(local.path()).unwrap_err();
    assert!(err.to_string().contains("[narration]"));
}

#[test]
fn test_from_file_reads_single_file() {
    let file = toml_file(
        r#"
        [providers]
        synthesis = "openai"
        understanding = "openai"
        narration = "openai"

        [storage]
        backend = "memory"
        "#,
    );

    let config = StorytoonsConfig::from_file(file.path()).unwrap();

    assert_eq!(config.providers.narration, ProviderKind::OpenAi);
    assert_eq!(config.storage.backend, StorageBackend::Memory);
    assert_eq!(config.synthesis.size(), "1024x1024");
}

#[test]
fn test_provider_kind_stage_support() {
    assert!(ProviderKind::OpenAi.supports(Stage::Narration));
    assert!(ProviderKind::Clarifai.supports(Stage::Synthesis));
    assert!(ProviderKind::StableDiffusion.supports(Stage::Synthesis));
    assert!(!ProviderKind::StableDiffusion.supports(Stage::Understanding));
    assert!(ProviderKind::Ollama.supports(Stage::Understanding));
    assert!(!ProviderKind::ElevenLabs.supports(Stage::Synthesis));
}

#[tokio::test]
async fn test_registry_builds_configured_adapters() {
    let mut config = StorytoonsConfig::default();
    config.providers.synthesis = ProviderKind::StableDiffusion;
    config.providers.understanding = ProviderKind::Ollama;
    config.providers.narration = ProviderKind::ElevenLabs;
    config.storage.backend = StorageBackend::Memory;

    let registry = ProviderRegistry::new(config, Credentials::default()).unwrap();
    let pipeline = registry.pipeline().unwrap();

    assert_eq!(
        pipeline.providers(),
        [
            (Stage::Synthesis, "stable_diffusion"),
            (Stage::Understanding, "ollama"),
            (Stage::Narration, "elevenlabs"),
        ]
    );
    assert_eq!(pipeline.store().unwrap().backend_name(), "memory");
}

#[test]
fn test_registry_rejects_invalid_combination() {
    let mut config = StorytoonsConfig::default();
    config.providers.narration = ProviderKind::Ollama;

    let err = ProviderRegistry::new(config, Credentials::default()).unwrap_err();
    assert!(matches!(err.kind(), StorytoonsErrorKind::Config(_)));
}

#[test]
fn test_registry_bindings_report_credentials() {
    let mut config = StorytoonsConfig::default();
    config.providers.synthesis = ProviderKind::OpenAi;
    config.providers.understanding = ProviderKind::Ollama;
    let credentials = Credentials::default().with(ProviderKey::OpenAi, "sk-test");

    let registry = ProviderRegistry::new(config, credentials).unwrap();
    let bindings = registry.bindings();

    assert_eq!(bindings.len(), 3);
    assert_eq!(*bindings[0].provider(), ProviderKind::OpenAi);
    assert!(*bindings[0].credential_present());
    assert_eq!(*bindings[1].credential(), None);
    assert!(*bindings[1].credential_present());
    assert_eq!(*bindings[2].provider(), ProviderKind::Clarifai);
    assert_eq!(*bindings[2].credential(), Some(ProviderKey::Clarifai));
    assert!(!*bindings[2].credential_present());
}

#[tokio::test]
async fn test_registry_missing_credential_fails_at_call_time() {
    let mut config = StorytoonsConfig::default();
    config.providers.synthesis = ProviderKind::OpenAi;
    config.storage.backend = StorageBackend::Memory;

    let registry = ProviderRegistry::new(config, Credentials::default()).unwrap();
    let run = registry.pipeline().unwrap().run("a cat").await;

    assert!(run.is_failed());
    let failure = run.failure().as_ref().unwrap();
    assert_eq!(failure.stage, Stage::Synthesis);
    assert!(matches!(
        failure.kind,
        storytoons_error::StageErrorKind::Authorization(_)
    ));
}
