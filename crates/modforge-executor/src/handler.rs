//! The tool handler trait every task kind binds to.

use crate::context::TaskContext;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{Map, Value};

/// A named, strongly-typed side-effecting function the Executor invokes
/// for every task whose `kind` matches [`ToolHandler::kind`].
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// The task `kind` this handler is bound to, e.g. `"generate_texture"`.
    fn kind(&self) -> &str;

    /// Perform the task's work. `params` is the already-resolved
    /// parameter map (tool-declared parameters intersected with task
    /// inputs and dispatched IR context); a missing declared-required
    /// parameter never reaches a handler — the Executor rejects the task
    /// with `MissingParameter` first.
    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError>;
}
