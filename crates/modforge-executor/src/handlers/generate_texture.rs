//! Phase 2: calls the injected `TextureGenerator` collaborator and writes
//! the selected variant to its canonical asset path.

use crate::collaborators::TextureGenerator;
use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::{expect_str, write_bytes};
use async_trait::async_trait;
use modforge_core::error::{ErrorCode, ForgeError};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Generates (via the injected collaborator) and writes one texture PNG.
pub struct GenerateTextureHandler {
    texture_generator: Arc<dyn TextureGenerator>,
}

impl GenerateTextureHandler {
    /// Bind a concrete texture generation collaborator.
    #[must_use]
    pub fn new(texture_generator: Arc<dyn TextureGenerator>) -> Self {
        Self { texture_generator }
    }
}

#[async_trait]
impl ToolHandler for GenerateTextureHandler {
    fn kind(&self) -> &str {
        "generate_texture"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let element_id = expect_str(&params, "element_id");
        let prompt = expect_str(&params, "prompt");
        let output_path = expect_str(&params, "output_path");
        let reference_ids: Vec<String> = params
            .get("reference_ids")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default();

        let variants = self.texture_generator.generate(prompt, &reference_ids, 1).await?;
        let selected = variants.into_iter().next().ok_or_else(|| ForgeError::ToolFailure {
            code: ErrorCode::ToolFailure,
            task_id: ctx.task_id.clone(),
            reason: format!("texture generator returned no variants for '{element_id}'"),
        })?;

        write_bytes(&ctx.workspace_dir, output_path, &selected).await?;

        Ok(json!({ "element_id": element_id, "path": output_path, "bytes_written": selected.len() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::events::NoopEventSink;
    use uuid::Uuid;

    struct MockGenerator;

    #[async_trait]
    impl TextureGenerator for MockGenerator {
        async fn generate(&self, _prompt: &str, _reference_ids: &[String], variant_count: u32) -> Result<Vec<Vec<u8>>, ForgeError> {
            Ok((0..variant_count).map(|_| vec![0x89, b'P', b'N', b'G']).collect())
        }
    }

    fn ctx(dir: &std::path::Path) -> TaskContext {
        TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_texture_ruby_sword".to_string(),
            workspace_dir: dir.to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        }
    }

    #[tokio::test]
    async fn writes_the_first_variant_to_the_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let handler = GenerateTextureHandler::new(Arc::new(MockGenerator));
        let mut params = Map::new();
        params.insert("element_id".into(), json!("ruby_sword"));
        params.insert("prompt".into(), json!("Ruby Sword"));
        params.insert("output_path".into(), json!("assets/examplemod/textures/item/ruby_sword.png"));

        handler.invoke(&ctx(dir.path()), params).await.unwrap();

        let written = dir.path().join("assets/examplemod/textures/item/ruby_sword.png");
        assert!(written.exists());
    }
}
