//! Shared HTTP plumbing for provider adapters.
//!
//! Every adapter funnels reqwest errors and non-success responses through
//! these helpers so the mapping onto the stage failure taxonomy is the same
//! for all providers.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::{Client, Response};
use std::time::Duration;
use storytoons_error::{ConfigError, Stage, StageError, StageResult, ValidationError};
use tracing::error;

/// Longest provider error body kept in a failure message.
const MAX_ERROR_BODY: usize = 512;

/// Default request timeout; image generation routinely takes tens of seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Build the HTTP client shared by all adapters.
///
/// # Errors
///
/// Returns a configuration error if the TLS backend cannot be initialized.
pub fn build_http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("storytoons/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::new(format!("Failed to build HTTP client: {}", e)))
}

/// Map an error from sending a request.
#[track_caller]
pub(crate) fn send_error(stage: Stage, provider: &str, e: reqwest::Error) -> StageError {
    error!(provider, error = ?e, "HTTP request failed");
    if e.is_builder() {
        StageError::failure(stage, format!("{} request could not be built: {}", provider, e))
    } else {
        StageError::transport(stage, format!("{} request failed: {}", provider, e))
    }
}

/// Map an error from reading or decoding a response body.
#[track_caller]
pub(crate) fn body_error(stage: Stage, provider: &str, e: reqwest::Error) -> StageError {
    error!(provider, error = ?e, "Failed to read response");
    if e.is_decode() {
        StageError::failure(stage, format!("{} returned a malformed response: {}", provider, e))
    } else {
        StageError::transport(stage, format!("{} response interrupted: {}", provider, e))
    }
}

/// Pass successful responses through; turn anything else into a stage failure.
pub(crate) async fn ensure_success(
    stage: Stage,
    provider: &str,
    response: Response,
) -> StageResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    error!(provider, status = %status, error = %body, "API error");

    Err(StageError::from_status(stage, status.as_u16(), body))
}

/// Decode base64 content, tolerating a `data:` URL prefix.
#[track_caller]
pub(crate) fn decode_base64(stage: Stage, provider: &str, encoded: &str) -> StageResult<Vec<u8>> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    STANDARD.decode(payload.trim()).map_err(|e| {
        StageError::failure(stage, format!("{} returned invalid base64: {}", provider, e))
    })
}

/// Map provider output that failed validation (empty text, undecodable image).
#[track_caller]
pub(crate) fn unusable_output(stage: Stage, provider: &str, e: ValidationError) -> StageError {
    StageError::failure(stage, format!("{} returned unusable output: {}", provider, e.kind))
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.openai.com/", "/v1/audio/speech"),
            "https://api.openai.com/v1/audio/speech"
        );
        assert_eq!(join_url("http://h:1", "a/b"), "http://h:1/a/b");
    }

    #[test]
    fn test_decode_base64_accepts_data_url() {
        let plain = decode_base64(Stage::Synthesis, "test", "aGVsbG8=").unwrap();
        let url = decode_base64(Stage::Synthesis, "test", "data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(plain, b"hello");
        assert_eq!(url, b"hello");
    }

    #[test]
    fn test_decode_base64_failure_is_stage_native() {
        let err = decode_base64(Stage::Narration, "test", "%%%").unwrap_err();
        assert!(matches!(
            err.kind,
            storytoons_error::StageErrorKind::Narration(_)
        ));
    }
}
