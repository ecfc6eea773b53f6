//! Phase 5: Gradle build script, settings, and properties files.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::{expect_str, write_text};
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};

/// Writes `build.gradle`, `settings.gradle`, and `gradle.properties`.
pub struct GenerateBuildFilesHandler;

#[async_trait]
impl ToolHandler for GenerateBuildFilesHandler {
    fn kind(&self) -> &str {
        "generate_build_files"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let mod_id = expect_str(&params, "mod_id");
        let mod_version = expect_str(&params, "mod_version");
        let minecraft_version = expect_str(&params, "minecraft_version");
        let loader = expect_str(&params, "loader");

        let build_gradle = format!(
            "plugins {{\n    id 'fabric-loom' version '1.7-SNAPSHOT'\n}}\n\n\
             version = '{mod_version}'\ngroup = 'com.example.{mod_id}'\n\n\
             dependencies {{\n    minecraft \"com.mojang:minecraft:{minecraft_version}\"\n}}\n"
        );
        write_text(&ctx.workspace_dir, "build.gradle", &build_gradle).await?;

        let settings_gradle = format!("rootProject.name = '{mod_id}'\n");
        write_text(&ctx.workspace_dir, "settings.gradle", &settings_gradle).await?;

        let properties = format!(
            "mod_id={mod_id}\nmod_version={mod_version}\nminecraft_version={minecraft_version}\nloader={loader}\n"
        );
        write_text(&ctx.workspace_dir, "gradle.properties", &properties).await?;

        Ok(json!({ "files_written": 3 }))
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
    async fn writes_all_three_build_files() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_build_files".to_string(),
            workspace_dir: dir.path().to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        };
        let mut params = Map::new();
        params.insert("mod_id".into(), json!("examplemod"));
        params.insert("mod_version".into(), json!("1.0.0"));
        params.insert("minecraft_version".into(), json!("1.21.1"));
        params.insert("loader".into(), json!("FABRIC"));

        GenerateBuildFilesHandler.invoke(&ctx, params).await.unwrap();

        assert!(dir.path().join("build.gradle").exists());
        assert!(dir.path().join("settings.gradle").exists());
        assert!(dir.path().join("gradle.properties").exists());
    }
}
