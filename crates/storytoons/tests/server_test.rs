//! HTTP API tests against stub adapters.

mod test_utils;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use storytoons::{
    MemoryStorage, PipelineState, RunReport, Stage, StageError, server::serve,
};
use std::sync::Arc;
use test_utils::{STORY, mp3_bytes, png_bytes, spawn_api, stub_pipeline};

#[tokio::test]
async fn test_health() {
    let addr = spawn_api(stub_pipeline(None)).await;

    let response = reqwest::get(format!("http://{}/health", addr))
        .await
        .expect("request");
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("json");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_successful_run_returns_all_artifacts() {
    let addr = spawn_api(stub_pipeline(None)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/runs", addr))
        .json(&json!({"description": "a cat on a paper boat"}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 200);

    let report: RunReport = response.json().await.expect("report");
    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.description, "a cat on a paper boat");
    assert!(report.failure.is_none());
    assert_eq!(report.story.as_deref(), Some(STORY));

    let image = report.image.expect("image");
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(STANDARD.decode(image.base64).expect("b64"), png_bytes());
    assert!(image.location.is_none());

    let audio = report.audio.expect("audio");
    assert_eq!(audio.mime_type, "audio/mpeg");
    assert_eq!(STANDARD.decode(audio.base64).expect("b64"), mp3_bytes());
}

#[tokio::test]
async fn test_empty_description_is_unprocessable() {
    let addr = spawn_api(stub_pipeline(None)).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/runs", addr))
        .json(&json!({"description": "   "}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 422);

    let report: RunReport = response.json().await.expect("report");
    assert_eq!(report.state, PipelineState::Idle);
    assert!(report.image.is_none());
    assert!(report.story.is_none());
    assert!(report.audio.is_none());
}

#[tokio::test]
async fn test_failed_run_reports_stage_inline() {
    let failure = StageError::from_status(Stage::Synthesis, 503, "model overloaded");
    let addr = spawn_api(stub_pipeline(Some(failure))).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/runs", addr))
        .json(&json!({"description": "a storm over the harbour"}))
        .send()
        .await
        .expect("request");
    assert_eq!(response.status(), 200);

    let report: RunReport = response.json().await.expect("report");
    assert_eq!(report.state, PipelineState::Failed);
    assert!(report.image.is_none());
    assert!(report.story.is_none());

    let failure = report.failure.expect("failure");
    assert_eq!(failure.stage, Stage::Synthesis);
    assert_eq!(failure.kind, "GenerationFailure");
    assert_eq!(failure.status, Some(503));
    assert!(failure.transient);
    assert!(failure.message.starts_with("Generating the comic image failed"));
    assert!(failure.cause.contains("model overloaded"));
}

#[tokio::test]
async fn test_persisted_artifacts_carry_locations() {
    let pipeline = stub_pipeline(None).with_store(Arc::new(MemoryStorage::new()));
    let addr = spawn_api(pipeline).await;

    let report: RunReport = reqwest::Client::new()
        .post(format!("http://{}/api/runs", addr))
        .json(&json!({"description": "a fox reading a map"}))
        .send()
        .await
        .expect("request")
        .json()
        .await
        .expect("report");

    let image = report.image.expect("image");
    let location = image.location.expect("image location");
    assert_eq!(location.backend, "memory");
    assert!(location.path.contains(&report.run_id.to_string()));
    assert!(report.audio.expect("audio").location.is_some());
}

#[tokio::test]
async fn test_serve_reports_bind_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let taken = listener.local_addr().expect("local addr");

    let result = serve(stub_pipeline(None), taken).await;
    let err = result.expect_err("port already in use");
    assert!(err.to_string().contains("Failed to bind"));
}
