//! HTTP API over the pipeline.

use crate::RunReport;
use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use storytoons_error::{ServerError, ServerErrorKind, StorytoonsResult};
use storytoons_pipeline::{PipelineState, StoryPipeline};
use tracing::{info, instrument};

/// API state holding the shared pipeline.
#[derive(Clone)]
pub struct ApiState {
    pipeline: Arc<StoryPipeline>,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(pipeline: StoryPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Body of `POST /api/runs`.
#[derive(Debug, Clone, Deserialize)]
pub struct RunRequest {
    /// Scene to illustrate
    pub description: String,
}

/// Creates the API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/runs", post(create_run))
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Run the pipeline for one description.
///
/// Stage failures are part of the report, so a failed run still answers
/// 200. Only an empty description is rejected, with 422.
#[instrument(skip_all)]
async fn create_run(
    State(state): State<ApiState>,
    Json(request): Json<RunRequest>,
) -> impl IntoResponse {
    let run = state.pipeline.run(request.description).await;
    let status = if *run.state() == PipelineState::Idle {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::OK
    };
    (status, Json(RunReport::from(&run)))
}

/// Bind `addr` and serve the API until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(pipeline: StoryPipeline, addr: SocketAddr) -> StorytoonsResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Bind(format!("{}: {}", addr, e))))?;
    let local = listener
        .local_addr()
        .map_err(|e| ServerError::new(ServerErrorKind::Bind(e.to_string())))?;
    info!(addr = %local, "StoryToons API listening");

    axum::serve(listener, create_router(ApiState::new(pipeline)))
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;
    Ok(())
}
