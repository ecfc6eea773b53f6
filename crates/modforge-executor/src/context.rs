//! Per-run and per-task context threaded into tool handlers.

use crate::cancel::CancellationToken;
use crate::events::EventSink;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// State shared by every task dispatched within one run.
#[derive(Clone)]
pub struct RunContext {
    /// The run this execution belongs to.
    pub run_id: Uuid,
    /// The run's workspace directory on disk (`runs/<id>/`).
    pub workspace_dir: PathBuf,
    /// Signaled when the run is cancelled; propagated into every task.
    pub cancellation: CancellationToken,
    /// Where `task.started`/`task.finished` events are published.
    pub sink: Arc<dyn EventSink>,
}

impl RunContext {
    /// Construct a [`TaskContext`] for a specific task within this run.
    #[must_use]
    pub fn for_task(&self, task_id: impl Into<String>) -> TaskContext {
        TaskContext {
            run_id: self.run_id,
            task_id: task_id.into(),
            workspace_dir: self.workspace_dir.clone(),
            cancellation: self.cancellation.clone(),
            sink: Arc::clone(&self.sink),
        }
    }
}

/// Context passed to a single [`crate::ToolHandler::invoke`] call.
#[derive(Clone)]
pub struct TaskContext {
    /// The run this task belongs to.
    pub run_id: Uuid,
    /// This task's stable id within the DAG.
    pub task_id: String,
    /// The run's workspace directory on disk.
    pub workspace_dir: PathBuf,
    /// Cooperative cancellation signal.
    pub cancellation: CancellationToken,
    /// Event-publishing handle, shared with every other task in the run.
    pub sink: Arc<dyn EventSink>,
}
