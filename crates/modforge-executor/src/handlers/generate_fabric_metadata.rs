//! Phase 5: loader-specific mod metadata (`fabric.mod.json` or the Forge/
//! NeoForge `mods.toml` equivalent).

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::{expect_str, write_text};
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};

/// Writes the loader's mod-metadata descriptor.
pub struct GenerateFabricMetadataHandler;

#[async_trait]
impl ToolHandler for GenerateFabricMetadataHandler {
    fn kind(&self) -> &str {
        "generate_fabric_metadata"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let mod_id = expect_str(&params, "mod_id");
        let main_class = expect_str(&params, "main_class");
        let mod_version = expect_str(&params, "mod_version");
        let minecraft_version = expect_str(&params, "minecraft_version");
        let loader = expect_str(&params, "loader");
        let base_package = expect_str(&params, "base_package");

        if loader.to_ascii_uppercase().contains("FORGE") {
            let mods_toml = format!(
                "modLoader=\"javafml\"\nloaderVersion=\"[1,)\"\nlicense=\"All rights reserved\"\n\n\
                 [[mods]]\nmodId=\"{mod_id}\"\nversion=\"{mod_version}\"\ndisplayName=\"{mod_id}\"\n\n\
                 [[dependencies.{mod_id}]]\nmodId=\"minecraft\"\nversionRange=\"[{minecraft_version},)\"\n"
            );
            write_text(&ctx.workspace_dir, "src/main/resources/META-INF/mods.toml", &mods_toml).await?;
        } else {
            let fabric_mod_json = json!({
                "schemaVersion": 1,
                "id": mod_id,
                "version": mod_version,
                "name": mod_id,
                "entrypoints": { "main": [format!("{base_package}.{main_class}")] },
                "depends": { "fabricloader": ">=0.15", "minecraft": minecraft_version },
            });
            write_text(
                &ctx.workspace_dir,
                "src/main/resources/fabric.mod.json",
                &serde_json::to_string_pretty(&fabric_mod_json)?,
            )
            .await?;
        }

        Ok(json!({ "loader": loader }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::events::NoopEventSink;
    use std::sync::Arc;
    use uuid::Uuid;

    fn params() -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("mod_id".into(), json!("examplemod"));
        params.insert("main_class".into(), json!("ExamplemodMod"));
        params.insert("base_package".into(), json!("com.example.examplemod"));
        params.insert("mod_version".into(), json!("1.0.0"));
        params.insert("minecraft_version".into(), json!("1.21.1"));
        params
    }

    fn ctx(dir: &std::path::Path) -> TaskContext {
        TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_fabric_metadata".to_string(),
            workspace_dir: dir.to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        }
    }

    #[tokio::test]
    async fn writes_fabric_mod_json_for_fabric_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params();
        p.insert("loader".into(), json!("FABRIC"));
        GenerateFabricMetadataHandler.invoke(&ctx(dir.path()), p).await.unwrap();
        assert!(dir.path().join("src/main/resources/fabric.mod.json").exists());
    }

    #[tokio::test]
    async fn writes_mods_toml_for_forge_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params();
        p.insert("loader".into(), json!("FORGE"));
        GenerateFabricMetadataHandler.invoke(&ctx(dir.path()), p).await.unwrap();
        assert!(dir.path().join("src/main/resources/META-INF/mods.toml").exists());
    }

    #[tokio::test]
    async fn writes_mods_toml_for_neoforge_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut p = params();
        p.insert("loader".into(), json!("NEO_FORGE"));
        GenerateFabricMetadataHandler.invoke(&ctx(dir.path()), p).await.unwrap();
        assert!(dir.path().join("src/main/resources/META-INF/mods.toml").exists());
    }
}
