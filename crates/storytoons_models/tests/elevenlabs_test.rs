//! ElevenLabs narrator tests against a local stub server.

#![cfg(feature = "elevenlabs")]

mod test_utils;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use serde_json::Value;
use std::collections::HashMap;
use storytoons_core::{AudioFormat, NarrativeText, VoiceOptions, VoiceOptionsBuilder};
use storytoons_error::StageErrorKind;
use storytoons_interface::Narrator;
use storytoons_models::{DEFAULT_ELEVENLABS_VOICE, ElevenLabsNarrator};
use test_utils::{captured, http_client, mp3_bytes, spawn_stub};

fn narrator(base_url: &str) -> ElevenLabsNarrator {
    ElevenLabsNarrator::new(http_client(), Some("xi-test".to_string())).with_base_url(base_url)
}

fn stub_router(log: test_utils::Captured) -> Router {
    Router::new().route(
        "/v1/text-to-speech/:voice_id",
        post(
            move |Path(voice_id): Path<String>,
                  Query(query): Query<HashMap<String, String>>,
                  headers: HeaderMap,
                  Json(body): Json<Value>| {
                let log = log.clone();
                async move {
                    if headers.get("xi-api-key").map(|v| v.as_bytes()) != Some(b"xi-test".as_slice()) {
                        return (StatusCode::UNAUTHORIZED, Vec::new());
                    }
                    log.lock().unwrap().push(serde_json::json!({
                        "voice_id": voice_id,
                        "output_format": query.get("output_format"),
                        "body": body,
                    }));
                    (StatusCode::OK, mp3_bytes())
                }
            },
        ),
    )
}

#[tokio::test]
async fn test_stock_voice_name_maps_to_default_voice() {
    let seen = captured();
    let base = spawn_stub(stub_router(seen.clone())).await;
    let text = NarrativeText::new("A lighthouse keeper met a whale.").unwrap();

    let audio = narrator(&base)
        .narrate(&text, &VoiceOptions::default())
        .await
        .unwrap();

    assert_eq!(*audio.format(), AudioFormat::Mp3);
    let request = seen.lock().unwrap()[0].clone();
    assert_eq!(request["voice_id"], DEFAULT_ELEVENLABS_VOICE);
    assert_eq!(request["output_format"], "mp3_44100_128");
    assert_eq!(request["body"]["text"], "A lighthouse keeper met a whale.");
    assert_eq!(request["body"]["model_id"], "eleven_multilingual_v2");
    assert_eq!(request["body"]["voice_settings"]["speed"], 1.0);
}

#[tokio::test]
async fn test_explicit_voice_id_and_clamped_speed() {
    let seen = captured();
    let base = spawn_stub(stub_router(seen.clone())).await;
    let text = NarrativeText::new("Quickly now.").unwrap();
    let voice = VoiceOptionsBuilder::default()
        .voice("pNInz6obpgDQGcFmaJgB")
        .speed(2.0)
        .build()
        .unwrap();

    narrator(&base).narrate(&text, &voice).await.unwrap();

    let request = seen.lock().unwrap()[0].clone();
    assert_eq!(request["voice_id"], "pNInz6obpgDQGcFmaJgB");
    let speed = request["body"]["voice_settings"]["speed"].as_f64().unwrap();
    assert!((speed - 1.2).abs() < 1e-6);
}

#[tokio::test]
async fn test_rejected_key_is_authorization_failure() {
    let base = spawn_stub(stub_router(captured())).await;
    let text = NarrativeText::new("Hello.").unwrap();
    let narrator =
        ElevenLabsNarrator::new(http_client(), Some("wrong".to_string())).with_base_url(&base);

    let err = narrator
        .narrate(&text, &VoiceOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind, StageErrorKind::Authorization(_)));
    assert_eq!(err.status, Some(401));
}

#[tokio::test]
async fn test_missing_key_is_authorization_failure() {
    let text = NarrativeText::new("Hello.").unwrap();
    let narrator = ElevenLabsNarrator::new(http_client(), None).with_base_url("http://127.0.0.1:9");

    let err = narrator
        .narrate(&text, &VoiceOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind, StageErrorKind::Authorization(_)));
    assert!(err.kind.cause().contains("ELEVEN_LABS_API_KEY"));
}

#[tokio::test]
async fn test_server_error_is_narration_failure() {
    let router = Router::new().route(
        "/v1/text-to-speech/:voice_id",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
    );
    let base = spawn_stub(router).await;
    let text = NarrativeText::new("Hello.").unwrap();

    let err = narrator(&base)
        .narrate(&text, &VoiceOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err.kind, StageErrorKind::Narration(_)));
    assert!(err.is_transient());
}

#[test]
fn test_voice_id_resolution() {
    let narrator = ElevenLabsNarrator::new(http_client(), None).with_default_voice("custom");
    let stock = VoiceOptionsBuilder::default().voice("Nova").build().unwrap();
    let own = VoiceOptionsBuilder::default().voice("abc123").build().unwrap();
    assert_eq!(narrator.voice_id(&stock), "custom");
    assert_eq!(narrator.voice_id(&own), "abc123");
}
