//! The Run controller: the state machine that wires the Spec
//! Store, Compiler, Planner, Executor, and Orchestrator together behind
//! `trigger_generate`/`trigger_build`/`approve`/`reject`/`cancel`, and
//! publishes every transition onto the event bus.

use crate::orchestrator::Orchestrator;
use crate::progress::ProgressTrackingSink;
use async_trait::async_trait;
use modforge_bus::{BusEventSink, EventBus};
use modforge_core::config::ForgeConfig;
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::run::{Run, RunEventType, RunResult, RunState, RunType};
use modforge_core::SpecDelta;
use modforge_executor::{default_registry, BuildOutcome, Builder, CancellationToken, EventSink, Executor, RunContext, TextureGenerator};
use modforge_store::SpecStore;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// A run plus the cancellation token governing its in-flight pipeline.
struct RunRecord {
    run: Run,
    cancellation: CancellationToken,
}

/// Everything the Run controller needs to drive the pipeline, shared
/// across every workspace via `Arc`.
struct Inner {
    specs: Arc<SpecStore>,
    bus: Arc<EventBus>,
    orchestrator: Arc<dyn Orchestrator>,
    executor: Executor,
    config: ForgeConfig,
    runs_dir: PathBuf,
    runs: RwLock<HashMap<Uuid, Arc<RwLock<RunRecord>>>>,
    active_by_workspace: RwLock<HashMap<String, Uuid>>,
}

/// Owns the lifecycle of every run across every workspace: enforces "at
/// most one non-terminal run per workspace",
/// drives the generate/build algorithms, and fans out every transition
/// through the injected [`EventBus`].
#[derive(Clone)]
pub struct RunController {
    inner: Arc<Inner>,
}

impl RunController {
    /// Construct a controller rooted at `runs_dir` for per-run workspace
    /// directories, bound to the given collaborators and configuration.
    #[must_use]
    pub fn new(
        specs: Arc<SpecStore>,
        bus: Arc<EventBus>,
        orchestrator: Arc<dyn Orchestrator>,
        texture_generator: Arc<dyn TextureGenerator>,
        builder: Arc<dyn Builder>,
        runs_dir: impl Into<PathBuf>,
        config: ForgeConfig,
    ) -> Self {
        let registry = default_registry(texture_generator, builder, std::time::Duration::from_secs(config.build_timeout_secs));
        Self {
            inner: Arc::new(Inner {
                specs,
                bus,
                orchestrator,
                executor: Executor::new(registry, config.clone()),
                config,
                runs_dir: runs_dir.into(),
                runs: RwLock::new(HashMap::new()),
                active_by_workspace: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Snapshot of a run's current state, progress, and log tail, for
    /// polling clients (the "retained snapshot").
    pub async fn snapshot(&self, run_id: Uuid) -> Result<Run, ForgeError> {
        let record = self.record(run_id).await?;
        let guard = record.read().await;
        Ok(guard.run.clone())
    }

    /// Subscribe to `run_id`'s event stream starting after `since`,
    /// replaying backlog then delivering new events as they're published.
    /// Fails if the run is unknown to this controller.
    pub async fn subscribe(&self, run_id: Uuid, since: u64) -> Result<modforge_bus::RunSubscription, ForgeError> {
        self.record(run_id).await?;
        Ok(self.inner.bus.subscribe(run_id, since))
    }

    /// Trigger a generate run: calls the Orchestrator, then gates on
    /// clarification or approval. Rejects with [`ErrorCode::RunInProgress`]
    /// if `workspace_id` already has a non-terminal run.
    pub async fn trigger_generate(&self, workspace_id: &str, prompt: String) -> Result<Uuid, ForgeError> {
        let run = self.admit_run(workspace_id, RunType::Generate, Some(prompt.clone())).await?;
        let run_id = run.id;
        self.mark_running(run_id).await;
        self.publish(run_id, RunEventType::RunStatus, json!({ "status": "running" })).await;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { run_generate(inner, run_id, workspace_id_owned(workspace_id), prompt).await });
        Ok(run_id)
    }

    /// Trigger a build run: compiles the current spec, plans, and drives
    /// the DAG to completion. No approval gate.
    pub async fn trigger_build(&self, workspace_id: &str) -> Result<Uuid, ForgeError> {
        let run = self.admit_run(workspace_id, RunType::Build, None).await?;
        let run_id = run.id;
        self.mark_running(run_id).await;
        self.publish(run_id, RunEventType::RunStatus, json!({ "status": "running" })).await;

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { run_build(inner, run_id, workspace_id_owned(workspace_id)).await });
        Ok(run_id)
    }

    /// Approve a generate run's pending deltas (optionally replacing them
    /// with `modified_deltas`), applying them through the Spec Store and
    /// transitioning the run to `SUCCEEDED`.
    pub async fn approve(&self, run_id: Uuid, modified_deltas: Option<Vec<SpecDelta>>) -> Result<(), ForgeError> {
        let record = self.record(run_id).await?;
        let (workspace_id, deltas) = {
            let guard = record.read().await;
            require_state(&guard.run, RunState::AwaitingApproval)?;
            (guard.run.workspace_id.clone(), modified_deltas.unwrap_or_else(|| guard.run.pending_deltas.clone()))
        };

        let mut last_version = None;
        for delta in &deltas {
            let (_, version) = self.inner.specs.apply_delta(&workspace_id, delta).await?;
            last_version = Some(version);
        }

        let (spec, _) = self.inner.specs.get_current(&workspace_id).await?;
        let version = last_version.map(|v| v.version).unwrap_or(0);
        self.publish(
            run_id,
            RunEventType::SpecSaved,
            json!({
                "spec_version": version,
                "items_count": spec.items.len(),
                "blocks_count": spec.blocks.len(),
                "tools_count": spec.tools.len(),
            }),
        )
        .await;

        {
            let mut guard = record.write().await;
            guard.run.pending_deltas.clear();
            guard.run.result = Some(RunResult::SpecSaved {
                spec_version: version,
                items_count: spec.items.len(),
                blocks_count: spec.blocks.len(),
                tools_count: spec.tools.len(),
            });
            finish(&mut guard.run, RunState::Succeeded);
        }
        self.publish(run_id, RunEventType::RunStatus, json!({ "status": "succeeded" })).await;
        self.retire(run_id, &workspace_id).await;
        Ok(())
    }

    /// Reject a generate run's pending deltas, discarding them.
    pub async fn reject(&self, run_id: Uuid, reason: Option<String>) -> Result<(), ForgeError> {
        let record = self.record(run_id).await?;
        let workspace_id = {
            let mut guard = record.write().await;
            require_state(&guard.run, RunState::AwaitingApproval)?;
            guard.run.pending_deltas.clear();
            finish(&mut guard.run, RunState::Rejected);
            guard.run.workspace_id.clone()
        };
        self.publish(run_id, RunEventType::RunStatus, json!({ "status": "rejected", "reason": reason })).await;
        self.retire(run_id, &workspace_id).await;
        Ok(())
    }

    /// Cooperatively cancel a running build or generate pipeline. Valid
    /// only while the run is `RUNNING`; the run transitions to `CANCELED`
    /// once every dispatched task has returned.
    pub async fn cancel(&self, run_id: Uuid) -> Result<(), ForgeError> {
        let record = self.record(run_id).await?;
        let guard = record.read().await;
        require_state(&guard.run, RunState::Running)?;
        guard.cancellation.cancel();
        Ok(())
    }

    /// Reply to a run awaiting clarification: ends that run's pipeline
    /// invocation and spawns a fresh generate run with `new_prompt`, rather
    /// than mutating this one.
    pub async fn reply(&self, run_id: Uuid, new_prompt: String) -> Result<Uuid, ForgeError> {
        let record = self.record(run_id).await?;
        let workspace_id = {
            let guard = record.read().await;
            require_state(&guard.run, RunState::AwaitingInput)?;
            guard.run.workspace_id.clone()
        };
        self.clear_active(&workspace_id, run_id).await;
        self.trigger_generate(&workspace_id, new_prompt).await
    }

    async fn admit_run(&self, workspace_id: &str, run_type: RunType, originating_message: Option<String>) -> Result<Run, ForgeError> {
        let mut active = self.inner.active_by_workspace.write().await;
        if let Some(existing) = active.get(workspace_id) {
            return Err(ForgeError::RunInProgress {
                code: ErrorCode::RunInProgress,
                workspace_id: workspace_id.to_string(),
                existing_run_id: *existing,
            });
        }
        let run = Run::new(workspace_id, run_type, originating_message);
        active.insert(workspace_id.to_string(), run.id);
        drop(active);

        let record = Arc::new(RwLock::new(RunRecord {
            run: run.clone(),
            cancellation: CancellationToken::new(),
        }));
        self.inner.runs.write().await.insert(run.id, record);
        info!(run_id = %run.id, workspace_id, ?run.run_type, "run admitted");
        Ok(run)
    }

    /// Transition a freshly admitted run from `QUEUED` to `RUNNING`,
    /// before the `run.status=running` event is published, so `cancel()`
    /// and polling reads of [`Self::snapshot`] agree with the event stream.
    async fn mark_running(&self, run_id: Uuid) {
        if let Some(record) = self.inner.runs.read().await.get(&run_id).cloned() {
            record.write().await.run.state = RunState::Running;
        }
    }

    async fn record(&self, run_id: Uuid) -> Result<Arc<RwLock<RunRecord>>, ForgeError> {
        self.inner
            .runs
            .read()
            .await
            .get(&run_id)
            .cloned()
            .ok_or(ForgeError::RunNotFound { code: ErrorCode::RunNotFound, run_id })
    }

    async fn clear_active(&self, workspace_id: &str, run_id: Uuid) {
        let mut active = self.inner.active_by_workspace.write().await;
        if active.get(workspace_id) == Some(&run_id) {
            active.remove(workspace_id);
        }
    }

    async fn retire(&self, run_id: Uuid, workspace_id: &str) {
        self.clear_active(workspace_id, run_id).await;
        self.inner.bus.retire(run_id);
    }

    async fn publish(&self, run_id: Uuid, event_type: RunEventType, payload: serde_json::Value) {
        self.inner.bus.publish(run_id, event_type, payload);
    }
}

fn workspace_id_owned(workspace_id: &str) -> String {
    workspace_id.to_string()
}

fn require_state(run: &Run, expected: RunState) -> Result<(), ForgeError> {
    if run.state == expected {
        return Ok(());
    }
    Err(ForgeError::InvalidTransition {
        code: ErrorCode::InvalidTransition,
        run_id: run.id,
        from: format!("{:?}", run.state),
        action: format!("expected {expected:?}"),
    })
}

fn finish(run: &mut Run, state: RunState) {
    run.state = state;
    run.finished_at = Some(chrono::Utc::now());
    if state == RunState::Succeeded {
        run.progress = 100;
    }
}

/// Generate-run algorithm, steps 1-4 (5 and 6 live in
/// [`RunController::approve`]/[`RunController::reject`]).
async fn run_generate(inner: Arc<Inner>, run_id: Uuid, workspace_id: String, prompt: String) {
    let current_spec = inner.specs.get_current(&workspace_id).await.ok().map(|(spec, _)| spec);
    let response = match inner.orchestrator.propose(&prompt, current_spec.as_ref()).await {
        Ok(response) => response,
        Err(err) => {
            fail_run(&inner, run_id, &workspace_id, "orchestrator", &err.to_string()).await;
            return;
        }
    };

    if !response.clarifying_questions.is_empty() {
        transition_awaiting_input(&inner, run_id, &response).await;
        return;
    }

    if response.deltas.is_empty() {
        // No deltas proposed and no clarification needed: a benign
        // "nothing to change" outcome rather than a failure.
        let record = match inner.runs.read().await.get(&run_id).cloned() {
            Some(record) => record,
            None => return,
        };
        {
            let mut guard = record.write().await;
            finish(&mut guard.run, RunState::Rejected);
        }
        inner.bus.publish(
            run_id,
            RunEventType::RunStatus,
            json!({ "status": "rejected", "reason": "orchestrator produced no changes" }),
        );
        clear_active(&inner, &workspace_id, run_id).await;
        inner.bus.retire(run_id);
        return;
    }

    let record = match inner.runs.read().await.get(&run_id).cloned() {
        Some(record) => record,
        None => return,
    };
    let total = response.deltas.len();
    for (index, delta) in response.deltas.iter().enumerate() {
        inner.bus.publish(
            run_id,
            RunEventType::SpecPreview,
            json!({ "delta": delta, "delta_index": index, "total_deltas": total }),
        );
    }
    {
        let mut guard = record.write().await;
        guard.run.pending_deltas = response.deltas.clone();
        guard.run.state = RunState::AwaitingApproval;
    }
    inner.bus.publish(
        run_id,
        RunEventType::RunAwaitingApproval,
        json!({ "pending_deltas": response.deltas, "deltas_count": total }),
    );
}

async fn transition_awaiting_input(inner: &Arc<Inner>, run_id: Uuid, response: &crate::orchestrator::OrchestratorResponse) {
    let record = match inner.runs.read().await.get(&run_id).cloned() {
        Some(record) => record,
        None => return,
    };
    {
        let mut guard = record.write().await;
        guard.run.state = RunState::AwaitingInput;
    }
    inner.bus.publish(
        run_id,
        RunEventType::RunAwaitingInput,
        json!({ "clarifying_questions": response.clarifying_questions, "reasoning": response.reasoning }),
    );
}

/// Build-run algorithm, all six steps.
async fn run_build(inner: Arc<Inner>, run_id: Uuid, workspace_id: String) {
    let (spec, version) = match inner.specs.get_current(&workspace_id).await {
        Ok(pair) => pair,
        Err(err) => {
            fail_run(&inner, run_id, &workspace_id, "load_spec", &err.to_string()).await;
            return;
        }
    };

    let ir = match modforge_compiler::compile(&spec, &inner.config.default_compatibility, version) {
        Ok(ir) => ir,
        Err(err) => {
            fail_run(&inner, run_id, &workspace_id, "compile", &err.to_string()).await;
            return;
        }
    };
    log_and_progress(&inner, run_id, 20, "compile", "compiled spec to IR").await;

    let mut dag = modforge_planner::plan(&ir);
    log_and_progress(&inner, run_id, 30, "plan", "planned task DAG").await;

    let record = match inner.runs.read().await.get(&run_id).cloned() {
        Some(record) => record,
        None => return,
    };
    let cancellation = record.read().await.cancellation.clone();

    let workspace_dir = inner.runs_dir.join(run_id.to_string());
    let bus_sink: Arc<dyn EventSink> = Arc::new(BusEventSink::new(Arc::clone(&inner.bus), run_id));
    let sink: Arc<dyn EventSink> = Arc::new(ProgressTrackingSink::new(bus_sink, dag.tasks.len()));
    let run_ctx = RunContext {
        run_id,
        workspace_dir,
        cancellation,
        sink,
    };

    match inner.executor.execute(&ir, &mut dag, run_ctx).await {
        modforge_executor::ExecutionOutcome::Completed(outputs) => {
            finish_build_success(&inner, run_id, &workspace_id, &outputs).await;
        }
        modforge_executor::ExecutionOutcome::Failed(err) => {
            fail_run(&inner, run_id, &workspace_id, "execution", &err.to_string()).await;
        }
        modforge_executor::ExecutionOutcome::Canceled => {
            let mut guard = record.write().await;
            finish(&mut guard.run, RunState::Canceled);
            drop(guard);
            inner.bus.publish(run_id, RunEventType::RunStatus, json!({ "status": "canceled" }));
            clear_active(&inner, &workspace_id, run_id).await;
            inner.bus.retire(run_id);
        }
    }
}

async fn finish_build_success(inner: &Arc<Inner>, run_id: Uuid, workspace_id: &str, outputs: &HashMap<String, serde_json::Value>) {
    let record = match inner.runs.read().await.get(&run_id).cloned() {
        Some(record) => record,
        None => return,
    };

    if let Some(build_output) = outputs.get("build") {
        let artifact_id = Uuid::new_v4();
        let file_name = build_output
            .get("jar_path")
            .and_then(|v| v.as_str())
            .and_then(|p| p.rsplit('/').next())
            .unwrap_or("artifact.jar")
            .to_string();
        let file_size = build_output.get("file_size").and_then(|v| v.as_u64()).unwrap_or(0);

        inner.bus.publish(
            run_id,
            RunEventType::ArtifactCreated,
            json!({
                "artifact_id": artifact_id,
                "file_name": file_name,
                "artifact_type": "jar",
                "file_size": file_size,
            }),
        );

        let mut guard = record.write().await;
        guard.run.result = Some(RunResult::Artifact {
            artifact_id,
            file_name,
            artifact_type: "jar".to_string(),
            file_size,
        });
        finish(&mut guard.run, RunState::Succeeded);
    } else {
        let mut guard = record.write().await;
        finish(&mut guard.run, RunState::Succeeded);
        warn!(run_id = %run_id, "build run completed without a build task output");
    }

    inner.bus.publish(run_id, RunEventType::RunStatus, json!({ "status": "succeeded" }));
    clear_active(inner, workspace_id, run_id).await;
    inner.bus.retire(run_id);
}

async fn fail_run(inner: &Arc<Inner>, run_id: Uuid, workspace_id: &str, phase: &str, cause: &str) {
    if let Some(record) = inner.runs.read().await.get(&run_id).cloned() {
        let mut guard = record.write().await;
        finish(&mut guard.run, RunState::Failed);
    }
    inner.bus.publish(
        run_id,
        RunEventType::Error,
        json!({ "message": format!("{phase} failed"), "phase": phase, "cause": cause }),
    );
    inner.bus.publish(run_id, RunEventType::RunStatus, json!({ "status": "failed" }));
    clear_active(inner, workspace_id, run_id).await;
    inner.bus.retire(run_id);
}

async fn log_and_progress(inner: &Arc<Inner>, run_id: Uuid, progress: u8, phase: &str, message: &str) {
    if let Some(record) = inner.runs.read().await.get(&run_id).cloned() {
        let mut guard = record.write().await;
        guard.run.progress = guard.run.progress.max(progress);
        guard.run.log_tail.push(message.to_string());
        if guard.run.log_tail.len() > 50 {
            guard.run.log_tail.remove(0);
        }
    }
    inner.bus.publish(run_id, RunEventType::LogAppend, json!({ "message": message, "level": "info", "phase": phase }));
    inner.bus.publish(run_id, RunEventType::RunProgress, json!({ "progress": progress }));
}

async fn clear_active(inner: &Arc<Inner>, workspace_id: &str, run_id: Uuid) {
    let mut active = inner.active_by_workspace.write().await;
    if active.get(workspace_id) == Some(&run_id) {
        active.remove(workspace_id);
    }
}
