//! Phase 1: lay out the run's workspace directory tree.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};

const DIRECTORIES: &[&str] = &[
    "src/main/java",
    "src/main/resources",
    "assets",
    "data",
    "build/libs",
];

/// Creates the conventional Fabric/Forge project skeleton the remaining
/// tasks write into.
pub struct SetupWorkspaceHandler;

#[async_trait]
impl ToolHandler for SetupWorkspaceHandler {
    fn kind(&self) -> &str {
        "setup_workspace"
    }

    async fn invoke(&self, ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
        for dir in DIRECTORIES {
            tokio::fs::create_dir_all(ctx.workspace_dir.join(dir)).await?;
        }
        Ok(json!({ "directories_created": DIRECTORIES.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::events::NoopEventSink;
    use std::sync::Arc;
    use uuid::Uuid;

    #[tokio::test]
    async fn creates_every_conventional_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "setup_workspace".to_string(),
            workspace_dir: dir.path().to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        };
        SetupWorkspaceHandler.invoke(&ctx, Map::new()).await.unwrap();
        for d in DIRECTORIES {
            assert!(dir.path().join(d).is_dir(), "missing {d}");
        }
    }
}
