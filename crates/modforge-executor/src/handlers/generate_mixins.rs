//! Phase 5: the mixin configuration file loaded alongside the mod.
//!
//! Element-level mixin injection is out of scope for this spec's Compiler
//! (no mixin-worthy behavior is synthesized); this handler still writes
//! the empty-but-valid config every Fabric mod jar is expected to ship.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::{expect_str, write_text};
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};

/// Writes `<mod_id>.mixins.json`.
pub struct GenerateMixinsHandler;

#[async_trait]
impl ToolHandler for GenerateMixinsHandler {
    fn kind(&self) -> &str {
        "generate_mixins"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let mod_id = expect_str(&params, "mod_id");
        let base_package = expect_str(&params, "base_package");

        let mixins_json = json!({
            "required": true,
            "package": format!("{base_package}.mixin"),
            "compatibilityLevel": "JAVA_21",
            "mixins": [],
            "client": [],
            "server": [],
        });
        write_text(
            &ctx.workspace_dir,
            &format!("src/main/resources/{mod_id}.mixins.json"),
            &serde_json::to_string_pretty(&mixins_json)?,
        )
        .await?;

        Ok(json!({ "mixin_count": 0 }))
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
    async fn writes_an_empty_but_valid_mixin_config() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_mixins".to_string(),
            workspace_dir: dir.path().to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        };
        let mut params = Map::new();
        params.insert("mod_id".into(), json!("examplemod"));
        params.insert("base_package".into(), json!("com.example.examplemod"));

        GenerateMixinsHandler.invoke(&ctx, params).await.unwrap();
        assert!(dir.path().join("src/main/resources/examplemod.mixins.json").exists());
    }
}
