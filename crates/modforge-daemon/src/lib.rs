//! The HTTP/SSE control-plane surface: the one slice of the outer
//! transport layer in scope for this workspace ("except where it carries
//! run events"). Thin by design — every route delegates straight to
//! [`modforge_runtime::RunController`].

#![deny(unsafe_code)]
#![warn(missing_docs)]

use axum::{
    extract::{Path as AxPath, Query, State},
    http::StatusCode,
    response::sse::{Event as SseEvent, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::run::Run;
use modforge_core::SpecDelta;
use modforge_runtime::RunController;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::info;
use uuid::Uuid;

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    /// The Run controller every route delegates to.
    pub controller: Arc<RunController>,
}

/// Build the Axum router exposing the run triggers and event stream,
/// plus `/runs/{id}` for polling clients.
#[must_use]
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/workspaces/{id}/generate", post(trigger_generate))
        .route("/workspaces/{id}/build", post(trigger_build))
        .route("/runs/{id}", get(get_run))
        .route("/runs/{id}/approve", post(approve_run))
        .route("/runs/{id}/reject", post(reject_run))
        .route("/runs/{id}/cancel", post(cancel_run))
        .route("/runs/{id}/reply", post(reply_run))
        .route("/runs/{id}/events", get(run_events))
        .with_state(state)
}

/// The daemon's uniform error response shape, per `ApiError { code,
/// message, details }`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into(), details: None }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl From<ForgeError> for ApiError {
    fn from(err: ForgeError) -> Self {
        match err.code() {
            ErrorCode::RunInProgress => ApiError::conflict(err.to_string()),
            ErrorCode::RunNotFound => ApiError::not_found(err.to_string()),
            ErrorCode::InvalidTransition
            | ErrorCode::PathNotFound
            | ErrorCode::PathTypeMismatch
            | ErrorCode::NoCurrentSpec
            | ErrorCode::VersionNotFound
            | ErrorCode::InvalidEnumValue => ApiError::invalid_request(err.to_string()),
            _ => ApiError::internal_error(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

#[derive(Debug, Serialize)]
struct TriggerResponse {
    run_id: Uuid,
}

async fn trigger_generate(
    State(state): State<Arc<AppState>>,
    AxPath(workspace_id): AxPath<String>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let run_id = state.controller.trigger_generate(&workspace_id, req.prompt).await?;
    Ok(Json(TriggerResponse { run_id }))
}

async fn trigger_build(
    State(state): State<Arc<AppState>>,
    AxPath(workspace_id): AxPath<String>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let run_id = state.controller.trigger_build(&workspace_id).await?;
    Ok(Json(TriggerResponse { run_id }))
}

async fn get_run(State(state): State<Arc<AppState>>, AxPath(run_id): AxPath<Uuid>) -> Result<Json<Run>, ApiError> {
    Ok(Json(state.controller.snapshot(run_id).await?))
}

#[derive(Debug, Default, Deserialize)]
struct ApproveRequest {
    #[serde(default)]
    modified_deltas: Option<Vec<SpecDelta>>,
}

async fn approve_run(
    State(state): State<Arc<AppState>>,
    AxPath(run_id): AxPath<Uuid>,
    body: Option<Json<ApproveRequest>>,
) -> Result<StatusCode, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    state.controller.approve(run_id, req.modified_deltas).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Default, Deserialize)]
struct RejectRequest {
    #[serde(default)]
    reason: Option<String>,
}

async fn reject_run(
    State(state): State<Arc<AppState>>,
    AxPath(run_id): AxPath<Uuid>,
    body: Option<Json<RejectRequest>>,
) -> Result<StatusCode, ApiError> {
    let req = body.map(|Json(r)| r).unwrap_or_default();
    state.controller.reject(run_id, req.reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn cancel_run(State(state): State<Arc<AppState>>, AxPath(run_id): AxPath<Uuid>) -> Result<StatusCode, ApiError> {
    state.controller.cancel(run_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct ReplyRequest {
    prompt: String,
}

async fn reply_run(
    State(state): State<Arc<AppState>>,
    AxPath(run_id): AxPath<Uuid>,
    Json(req): Json<ReplyRequest>,
) -> Result<Json<TriggerResponse>, ApiError> {
    let new_run_id = state.controller.reply(run_id, req.prompt).await?;
    Ok(Json(TriggerResponse { run_id: new_run_id }))
}

#[derive(Debug, Deserialize)]
struct EventsQuery {
    #[serde(default)]
    since: u64,
}

async fn run_events(
    State(state): State<Arc<AppState>>,
    AxPath(run_id): AxPath<Uuid>,
    Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let mut subscription = state.controller.subscribe(run_id, query.since).await?;

    let (tx, rx) = mpsc::channel(256);
    tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            let sse_event = SseEvent::default()
                .id(event.seq.to_string())
                .event(event_type_name(&event.event_type))
                .json_data(json!({ "seq": event.seq, "payload": event.payload, "timestamp": event.timestamp }))
                .unwrap_or_else(|_| SseEvent::default().event("error").data("serialization failed"));
            if tx.send(Ok(sse_event)).await.is_err() {
                break;
            }
        }
        info!(run_id = %run_id, "event subscriber stream ended");
    });

    Ok(Sse::new(ReceiverStream::new(rx)))
}

fn event_type_name(event_type: &modforge_core::run::RunEventType) -> String {
    serde_json::to_value(event_type)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| "event".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_bus::EventBus;
    use modforge_core::config::ForgeConfig;
    use modforge_core::error::ForgeError as CoreForgeError;
    use modforge_core::spec::ModSpec;
    use modforge_core::SpecDelta as CoreSpecDelta;
    use modforge_executor::collaborators::{BuildOutcome, Builder, TextureGenerator};
    use modforge_executor::CancellationToken;
    use modforge_runtime::MockOrchestrator;
    use modforge_store::SpecStore;
    use std::path::Path;
    use std::time::Duration;

    struct MockTextureGenerator;
    #[async_trait::async_trait]
    impl TextureGenerator for MockTextureGenerator {
        async fn generate(&self, _prompt: &str, _reference_ids: &[String], _variant_count: u32) -> Result<Vec<Vec<u8>>, CoreForgeError> {
            Ok(vec![])
        }
    }

    struct MockBuilder;
    #[async_trait::async_trait]
    impl Builder for MockBuilder {
        async fn build(&self, _workspace_dir: &Path, _timeout: Duration, _cancellation: &CancellationToken) -> Result<BuildOutcome, CoreForgeError> {
            Ok(BuildOutcome { jar_path: "build/libs/mod-1.0.0.jar".into(), file_size: 10 })
        }
    }

    async fn test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let specs = Arc::new(SpecStore::new(dir.path()));
        specs.initialize("ws-1", ModSpec::default()).await.unwrap();
        let bus = Arc::new(EventBus::new(3600));
        let orchestrator: Arc<dyn modforge_runtime::Orchestrator> =
            Arc::new(MockOrchestrator::with_deltas(vec![CoreSpecDelta::add("items[0]", json!({ "item_name": "Ruby Sword" }))]));
        let controller = RunController::new(
            specs,
            bus,
            orchestrator,
            Arc::new(MockTextureGenerator),
            Arc::new(MockBuilder),
            dir.path().join("runs"),
            ForgeConfig::default(),
        );
        Arc::new(AppState { controller: Arc::new(controller) })
    }

    #[tokio::test]
    async fn trigger_generate_returns_a_run_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        let Json(resp) = trigger_generate(State(state), AxPath("ws-1".to_string()), Json(GenerateRequest { prompt: "Create a ruby sword".to_string() }))
            .await
            .unwrap();
        assert_ne!(resp.run_id, Uuid::nil());
    }

    #[tokio::test]
    async fn second_trigger_maps_run_in_progress_to_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        let _ = trigger_generate(
            State(Arc::clone(&state)),
            AxPath("ws-1".to_string()),
            Json(GenerateRequest { prompt: "first".to_string() }),
        )
        .await
        .unwrap();

        let err = trigger_build(State(state), AxPath("ws-1".to_string())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn get_run_for_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir).await;
        let err = get_run(State(state), AxPath(Uuid::new_v4())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
