//! Phase 3: emit all Java source in a single task.

use crate::context::TaskContext;
use crate::handler::ToolHandler;
use crate::handlers::{expect_str, write_text};
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use modforge_core::ir::{IRBlock, IRItem, IRTool};
use serde_json::{json, Map, Value};

/// Writes one Java class per item/block/tool plus the mod's main class,
/// using the IR's derived package and class names.
pub struct GenerateCodeHandler;

#[async_trait]
impl ToolHandler for GenerateCodeHandler {
    fn kind(&self) -> &str {
        "generate_code"
    }

    async fn invoke(&self, ctx: &TaskContext, params: Map<String, Value>) -> Result<Value, ForgeError> {
        let mod_id = expect_str(&params, "mod_id");
        let base_package = expect_str(&params, "base_package");
        let main_class = expect_str(&params, "main_class");
        let package_path = base_package.replace('.', "/");

        let items: Vec<IRItem> = deserialize_or_empty(params.get("items"));
        let blocks: Vec<IRBlock> = deserialize_or_empty(params.get("blocks"));
        let tools: Vec<IRTool> = deserialize_or_empty(params.get("tools"));

        let mut files_written = 0usize;

        for item in &items {
            let source = item_source(base_package, &item.java_class_name, &item.registry_id);
            write_text(&ctx.workspace_dir, &format!("src/main/java/{package_path}/item/{}.java", item.java_class_name), &source).await?;
            files_written += 1;
        }
        for block in &blocks {
            let source = block_source(base_package, &block.java_class_name, &block.registry_id);
            write_text(&ctx.workspace_dir, &format!("src/main/java/{package_path}/block/{}.java", block.java_class_name), &source).await?;
            files_written += 1;
        }
        for tool in &tools {
            let source = item_source(base_package, &tool.java_class_name, &tool.registry_id);
            write_text(&ctx.workspace_dir, &format!("src/main/java/{package_path}/item/{}.java", tool.java_class_name), &source).await?;
            files_written += 1;
        }

        let main_source = main_class_source(base_package, main_class, mod_id, &items, &blocks, &tools);
        write_text(&ctx.workspace_dir, &format!("src/main/java/{package_path}/{main_class}.java"), &main_source).await?;
        files_written += 1;

        Ok(json!({ "files_written": files_written }))
    }
}

fn deserialize_or_empty<T: serde::de::DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok()).unwrap_or_default()
}

fn item_source(package: &str, class_name: &str, registry_id: &str) -> String {
    format!(
        "package {package}.item;\n\n\
         /** Registered as `{registry_id}`. */\n\
         public class {class_name} {{\n\
         }}\n"
    )
}

fn block_source(package: &str, class_name: &str, registry_id: &str) -> String {
    format!(
        "package {package}.block;\n\n\
         /** Registered as `{registry_id}`. */\n\
         public class {class_name} {{\n\
         }}\n"
    )
}

fn main_class_source(package: &str, main_class: &str, mod_id: &str, items: &[IRItem], blocks: &[IRBlock], tools: &[IRTool]) -> String {
    let mut body = String::new();
    for item in items {
        body.push_str(&format!("    public static final Object {} = register(\"{}\");\n", item.registration_constant, item.registry_id));
    }
    for block in blocks {
        body.push_str(&format!("    public static final Object {} = register(\"{}\");\n", block.registration_constant, block.registry_id));
    }
    for tool in tools {
        body.push_str(&format!("    public static final Object {} = register(\"{}\");\n", tool.registration_constant, tool.registry_id));
    }

    format!(
        "package {package};\n\n\
         public class {main_class} {{\n\
         \n    public static final String MOD_ID = \"{mod_id}\";\n\n\
         {body}\n\
         \n    private static Object register(String registryId) {{\n\
         \n        return null;\n\
         \n    }}\n\
         }}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::events::NoopEventSink;
    use modforge_core::spec::{CreativeTab, Rarity};
    use std::sync::Arc;
    use uuid::Uuid;

    fn ctx(dir: &std::path::Path) -> TaskContext {
        TaskContext {
            run_id: Uuid::new_v4(),
            task_id: "generate_code".to_string(),
            workspace_dir: dir.to_path_buf(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        }
    }

    #[tokio::test]
    async fn writes_one_class_per_item_plus_the_main_class() {
        let dir = tempfile::tempdir().unwrap();
        let item = IRItem {
            source_index: 0,
            registry_id: "examplemod:ruby_sword".to_string(),
            java_class_name: "RubySwordItem".to_string(),
            registration_constant: "RUBY_SWORD".to_string(),
            display_name: "Ruby Sword".to_string(),
            rarity: Rarity::Common,
            creative_tab: CreativeTab::Misc,
            max_stack_size: 64,
            fireproof: false,
        };

        let mut params = Map::new();
        params.insert("mod_id".into(), json!("examplemod"));
        params.insert("base_package".into(), json!("com.example.examplemod"));
        params.insert("main_class".into(), json!("ExamplemodMod"));
        params.insert("items".into(), serde_json::to_value(vec![item]).unwrap());
        params.insert("blocks".into(), json!([]));
        params.insert("tools".into(), json!([]));

        let result = GenerateCodeHandler.invoke(&ctx(dir.path()), params).await.unwrap();
        assert_eq!(result["files_written"], json!(2));
        assert!(dir.path().join("src/main/java/com/example/examplemod/item/RubySwordItem.java").exists());
        assert!(dir.path().join("src/main/java/com/example/examplemod/ExamplemodMod.java").exists());
    }
}
