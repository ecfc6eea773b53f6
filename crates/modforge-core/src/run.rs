//! Run and event types owned by the Run controller (`modforge-runtime`)
//! and the event bus (`modforge-bus`).

use crate::delta::SpecDelta;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a run proposes spec changes (`Generate`) or compiles and builds
/// the current spec (`Build`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunType {
    /// Calls the Orchestrator, proposes deltas, gates on approval.
    Generate,
    /// Compiles the current spec and invokes the Builder; no approval gate.
    Build,
}

/// Lifecycle state of a [`Run`]. See `modforge-runtime` for the transition
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Accepted, not yet started.
    Queued,
    /// Actively executing (Orchestrator call, or Compiler/Planner/Executor
    /// pipeline).
    Running,
    /// Waiting on a user reply to clarifying questions.
    AwaitingInput,
    /// Waiting on `approve`/`reject` of pending deltas.
    AwaitingApproval,
    /// Terminal: completed successfully.
    Succeeded,
    /// Terminal: failed.
    Failed,
    /// Terminal: cancelled mid-flight.
    Canceled,
    /// Terminal: proposed deltas were rejected.
    Rejected,
}

impl RunState {
    /// Whether this state admits no further transitions.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled | Self::Rejected)
    }
}

/// Outcome payload attached to a run once it reaches a terminal state
/// with a concrete result (as opposed to rejection/cancellation, which
/// carry none).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunResult {
    /// A build run produced one or more artifact files.
    Artifact {
        /// Unique artifact identifier.
        artifact_id: Uuid,
        /// File name, e.g. `examplemod-1.0.0.jar`.
        file_name: String,
        /// Artifact MIME/content type discriminator, e.g. `"jar"`.
        artifact_type: String,
        /// Size in bytes.
        file_size: u64,
    },
    /// A generate run's deltas were approved and saved.
    SpecSaved {
        /// The spec version the deltas produced.
        spec_version: u64,
        /// Resulting `items` length.
        items_count: usize,
        /// Resulting `blocks` length.
        blocks_count: usize,
        /// Resulting `tools` length.
        tools_count: usize,
    },
}

/// A single end-to-end invocation of the pipeline for one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Run {
    /// Unique run identifier.
    pub id: Uuid,
    /// The workspace this run operates on.
    pub workspace_id: String,
    /// Generate or build.
    pub run_type: RunType,
    /// Current lifecycle state.
    pub state: RunState,
    /// Monotonically non-decreasing, 0-100.
    pub progress: u8,
    /// Bounded tail of recent `log.append` messages, most recent last.
    pub log_tail: Vec<String>,
    /// Populated once the run reaches a result-bearing terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<RunResult>,
    /// Deltas awaiting approval; populated only for `Generate` runs between
    /// `AwaitingApproval` and `Succeeded`/`Rejected`.
    #[serde(default)]
    pub pending_deltas: Vec<SpecDelta>,
    /// The user prompt that started a `Generate` run, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originating_message: Option<String>,
    /// Relative paths of assets written by this run's tasks, cleared
    /// (ownership transferred to the workspace) on `Succeeded`.
    #[serde(default)]
    pub owned_assets: Vec<String>,
    /// When the run was created.
    pub started_at: DateTime<Utc>,
    /// When the run reached a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Run {
    /// Construct a freshly-queued run.
    #[must_use]
    pub fn new(workspace_id: impl Into<String>, run_type: RunType, originating_message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id: workspace_id.into(),
            run_type,
            state: RunState::Queued,
            progress: 0,
            log_tail: Vec::new(),
            result: None,
            pending_deltas: Vec::new(),
            originating_message,
            owned_assets: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }
}

/// The type discriminant of a [`RunEvent`], matching the wire event names
/// in the external event stream (`run.status`, `log.append`, …).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RunEventType {
    /// `run.status`
    #[serde(rename = "run.status")]
    RunStatus,
    /// `run.progress`
    #[serde(rename = "run.progress")]
    RunProgress,
    /// `log.append`
    #[serde(rename = "log.append")]
    LogAppend,
    /// `spec.preview`
    #[serde(rename = "spec.preview")]
    SpecPreview,
    /// `spec.saved`
    #[serde(rename = "spec.saved")]
    SpecSaved,
    /// `run.awaiting_approval`
    #[serde(rename = "run.awaiting_approval")]
    RunAwaitingApproval,
    /// `run.awaiting_input`
    #[serde(rename = "run.awaiting_input")]
    RunAwaitingInput,
    /// `artifact.created`
    #[serde(rename = "artifact.created")]
    ArtifactCreated,
    /// `task.started`
    #[serde(rename = "task.started")]
    TaskStarted,
    /// `task.finished`
    #[serde(rename = "task.finished")]
    TaskFinished,
    /// `error`
    #[serde(rename = "error")]
    Error,
}

/// A single, sequenced record on a run's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunEvent {
    /// The run this event belongs to.
    pub run_id: Uuid,
    /// Strictly increasing within a run, starting at 1.
    pub seq: u64,
    /// Which kind of event this is.
    #[serde(rename = "type")]
    pub event_type: RunEventType,
    /// Event-specific payload; shape is determined by `event_type`.
    pub payload: serde_json::Value,
    /// When the event was published.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_recognized() {
        assert!(RunState::Succeeded.is_terminal());
        assert!(RunState::Failed.is_terminal());
        assert!(RunState::Canceled.is_terminal());
        assert!(RunState::Rejected.is_terminal());
        assert!(!RunState::Running.is_terminal());
        assert!(!RunState::AwaitingApproval.is_terminal());
    }

    #[test]
    fn run_event_type_serializes_to_dotted_wire_names() {
        let event_type = RunEventType::RunAwaitingApproval;
        assert_eq!(
            serde_json::to_string(&event_type).unwrap(),
            "\"run.awaiting_approval\""
        );
    }

    #[test]
    fn new_run_starts_queued_with_zero_progress() {
        let run = Run::new("ws-1", RunType::Build, None);
        assert_eq!(run.state, RunState::Queued);
        assert_eq!(run.progress, 0);
        assert!(run.finished_at.is_none());
    }
}
