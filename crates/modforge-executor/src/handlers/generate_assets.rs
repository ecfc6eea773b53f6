//! Phase 4: materialize every JSON asset (models, blockstates, loot
//! tables, lang file) once all textures have been generated.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::write_text;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use modforge_core::ir::{AssetKind, IRAsset};
use serde_json::{json, Map, Value};

/// Writes every non-texture [`IRAsset`]'s JSON payload to its canonical path.
pub struct GenerateAssetsHandler;

#[async_trait]
impl ToolHandler for GenerateAssetsHandler {
    fn kind(&self) -> &str {
        "generate_assets"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let assets: Vec<IRAsset> = params
            .get("assets")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let mut written = 0usize;
        for asset in assets.iter().filter(|a| a.kind != AssetKind::Texture) {
            let Some(payload) = &asset.payload else { continue };
            let text = serde_json::to_string_pretty(payload)?;
            write_text(&ctx.workspace_dir, &asset.path, &text).await?;
            written += 1;
        }

        Ok(json!({ "assets_written": written }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::events::NoopEventSink;
    use std::sync::Arc;
    use uuid::Uuid;

    fn ctx(dir: &std::path::Path) -> TaskContext {
        TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_assets".to_string(),
            workspace_dir: dir.to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        }
    }

    #[tokio::test]
    async fn skips_texture_assets_and_writes_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let assets = vec![
            IRAsset {
                kind: AssetKind::Texture,
                path: "assets/examplemod/textures/item/ruby_sword.png".to_string(),
                payload: None,
                prompt: Some("Ruby Sword".to_string()),
                reference_texture_ids: vec![],
            },
            IRAsset {
                kind: AssetKind::Model,
                path: "assets/examplemod/models/item/ruby_sword.json".to_string(),
                payload: Some(json!({ "parent": "minecraft:item/generated" })),
                prompt: None,
                reference_texture_ids: vec![],
            },
        ];
        let mut params = Map::new();
        params.insert("assets".into(), serde_json::to_value(assets).unwrap());

        let result = GenerateAssetsHandler.invoke(&ctx(dir.path()), params).await.unwrap();
        assert_eq!(result["assets_written"], json!(1));
        assert!(dir.path().join("assets/examplemod/models/item/ruby_sword.json").exists());
        assert!(!dir.path().join("assets/examplemod/textures/item/ruby_sword.png").exists());
    }
}
