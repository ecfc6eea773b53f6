//! Phase 6: the Gradle wrapper scripts and properties.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::write_text;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use serde_json::{json, Map, Value};

const WRAPPER_PROPERTIES: &str = "distributionUrl=https\\://services.gradle.org/distributions/gradle-8.8-bin.zip\n";
const GRADLEW: &str = "#!/bin/sh\nexec \"$(dirname \"$0\")/gradle/wrapper/gradle-wrapper.jar\" \"$@\"\n";
const GRADLEW_BAT: &str = "@rem Gradle startup script for Windows\r\n";

/// Writes `gradlew`, `gradlew.bat`, and `gradle/wrapper/gradle-wrapper.properties`.
pub struct SetupGradleWrapperHandler;

#[async_trait]
impl ToolHandler for SetupGradleWrapperHandler {
    fn kind(&self) -> &str {
        "setup_gradle_wrapper"
    }

    async fn invoke(&self, ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
        write_text(&ctx.workspace_dir, "gradlew", GRADLEW).await?;
        write_text(&ctx.workspace_dir, "gradlew.bat", GRADLEW_BAT).await?;
        write_text(&ctx.workspace_dir, "gradle/wrapper/gradle-wrapper.properties", WRAPPER_PROPERTIES).await?;
        Ok(json!({ "files_written": 3 }))
    }
}
