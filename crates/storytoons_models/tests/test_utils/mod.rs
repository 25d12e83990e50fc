//! Test utilities for provider adapter tests.
//!
//! Adapters are exercised against in-process axum servers that impersonate
//! the provider endpoints.

#![allow(dead_code)]

use axum::Router;
use image::{ImageBuffer, Rgb};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bind `router` on an ephemeral localhost port and return its base URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("stub server");
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn dead_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{}", addr)
}

/// HTTP client with a short timeout for tests.
pub fn http_client() -> reqwest::Client {
    storytoons_models::build_http_client(Duration::from_secs(5)).expect("http client")
}

/// Encode a small gradient image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x * 5 % 256) as u8, (y * 9 % 256) as u8, 128u8])
    });
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .expect("encode png");
    buffer.into_inner()
}

/// PNG fixture as standard base64.
pub fn png_base64(width: u32, height: u32) -> String {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD.encode(png_bytes(width, height))
}

/// A minimal MPEG audio frame header followed by silence.
pub fn mp3_bytes() -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xFB, 0x90, 0x64];
    bytes.extend(std::iter::repeat_n(0u8, 256));
    bytes
}

/// Shared log of request bodies seen by a stub.
pub type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

/// Create an empty capture log.
pub fn captured() -> Captured {
    Arc::new(Mutex::new(Vec::new()))
}
