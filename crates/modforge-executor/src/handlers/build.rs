//! Phase 7: the terminal task. Shells out to the injected `Builder`
//! collaborator and reports the produced JAR.

use crate::collaborators::Builder;
use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::expect_str;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Invokes the configured build command and reports the resulting JAR.
pub struct BuildHandler {
    builder: Arc<dyn Builder>,
    timeout: Duration,
}

impl BuildHandler {
    /// Bind a concrete build collaborator and its timeout.
    #[must_use]
    pub fn new(builder: Arc<dyn Builder>, timeout: Duration) -> Self {
        Self { builder, timeout }
    }
}

#[async_trait]
impl ToolHandler for BuildHandler {
    fn kind(&self) -> &str {
        "build"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let mod_id = expect_str(&params, "mod_id");
        let mod_version = expect_str(&params, "mod_version");

        let outcome = self.builder.build(&ctx.workspace_dir, self.timeout, &ctx.cancellation).await?;

        Ok(json!({
            "mod_id": mod_id,
            "mod_version": mod_version,
            "jar_path": outcome.jar_path.display().to_string(),
            "file_size": outcome.file_size,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::collaborators::BuildOutcome;
    use crate::events::NoopEventSink;
    use std::path::{Path, PathBuf};
    use uuid::Uuid;

    struct MockBuilder;

    #[async_trait]
    impl Builder for MockBuilder {
        async fn build(&self, _workspace_dir: &Path, _timeout: Duration, _cancellation: &CancellationToken) -> Result<BuildOutcome, ForgeError> {
            Ok(BuildOutcome {
                jar_path: PathBuf::from("build/libs/examplemod-1.0.0.jar"),
                file_size: 4096,
            })
        }
    }

    #[tokio::test]
    async fn reports_the_builders_jar_path_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "build".to_string(),
            workspace_dir: dir.path().to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        };
        let handler = BuildHandler::new(Arc::new(MockBuilder), Duration::from_secs(600));
        let mut params = Map::new();
        params.insert("mod_id".into(), json!("examplemod"));
        params.insert("mod_version".into(), json!("1.0.0"));

        let result = handler.invoke(&ctx, params).await.unwrap();
        assert_eq!(result["file_size"], json!(4096));
        assert_eq!(result["jar_path"], json!("build/libs/examplemod-1.0.0.jar"));
    }
}
