//! Asset descriptor synthesis: canonical paths, texture prompts, and JSON
//! payloads for models/blockstates/loot tables.

use modforge_core::ir::{AssetKind, IRAsset};
use serde_json::json;

/// Build a texture-generation prompt from an element's name, free-text
/// description, and style hint.
#[must_use]
pub fn texture_prompt(name: &str, description: Option<&str>, style_hint: Option<&str>) -> String {
    let mut prompt = name.to_string();
    if let Some(description) = description {
        prompt.push_str(", ");
        prompt.push_str(description);
    }
    if let Some(style_hint) = style_hint {
        prompt.push_str(", style: ");
        prompt.push_str(style_hint);
    }
    prompt
}

/// Synthesize the texture asset for an item or tool.
#[must_use]
pub fn item_texture(mod_id: &str, element_id: &str, prompt: String) -> IRAsset {
    IRAsset {
        kind: AssetKind::Texture,
        path: format!("assets/{mod_id}/textures/item/{element_id}.png"),
        payload: None,
        prompt: Some(prompt),
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize the texture asset for a block.
#[must_use]
pub fn block_texture(mod_id: &str, element_id: &str, prompt: String) -> IRAsset {
    IRAsset {
        kind: AssetKind::Texture,
        path: format!("assets/{mod_id}/textures/block/{element_id}.png"),
        payload: None,
        prompt: Some(prompt),
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize a generated-item model pointing at its own texture.
#[must_use]
pub fn item_model(mod_id: &str, element_id: &str) -> IRAsset {
    IRAsset {
        kind: AssetKind::Model,
        path: format!("assets/{mod_id}/models/item/{element_id}.json"),
        payload: Some(json!({
            "parent": "minecraft:item/generated",
            "textures": { "layer0": format!("{mod_id}:item/{element_id}") },
        })),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize a cube-all block model pointing at its own texture.
#[must_use]
pub fn block_model(mod_id: &str, element_id: &str) -> IRAsset {
    IRAsset {
        kind: AssetKind::Model,
        path: format!("assets/{mod_id}/models/block/{element_id}.json"),
        payload: Some(json!({
            "parent": "minecraft:block/cube_all",
            "textures": { "all": format!("{mod_id}:block/{element_id}") },
        })),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize a block's item-form model, delegating to the block model.
#[must_use]
pub fn block_item_model(mod_id: &str, element_id: &str) -> IRAsset {
    IRAsset {
        kind: AssetKind::ItemModel,
        path: format!("assets/{mod_id}/models/item/{element_id}.json"),
        payload: Some(json!({ "parent": format!("{mod_id}:block/{element_id}") })),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize a simple single-variant blockstate.
#[must_use]
pub fn blockstate(mod_id: &str, element_id: &str) -> IRAsset {
    IRAsset {
        kind: AssetKind::Blockstate,
        path: format!("assets/{mod_id}/blockstates/{element_id}.json"),
        payload: Some(json!({
            "variants": { "": { "model": format!("{mod_id}:block/{element_id}") } },
        })),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

/// Synthesize a minimal drops-self, survives-explosion loot table.
#[must_use]
pub fn loot_table(mod_id: &str, element_id: &str) -> IRAsset {
    IRAsset {
        kind: AssetKind::LootTable,
        path: format!("data/{mod_id}/loot_table/blocks/{element_id}.json"),
        payload: Some(json!({
            "type": "minecraft:block",
            "pools": [{
                "rolls": 1,
                "entries": [{ "type": "minecraft:item", "name": format!("{mod_id}:{element_id}") }],
                "conditions": [{ "condition": "minecraft:survives_explosion" }],
            }],
        })),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

/// Build the single shared `en_us` language asset from accumulated
/// `(translation_key, display_name)` entries.
#[must_use]
pub fn lang_asset(mod_id: &str, entries: &[(String, String)]) -> IRAsset {
    let mut payload = serde_json::Map::new();
    for (key, value) in entries {
        payload.insert(key.clone(), json!(value));
    }
    IRAsset {
        kind: AssetKind::Lang,
        path: format!("assets/{mod_id}/lang/en_us.json"),
        payload: Some(serde_json::Value::Object(payload)),
        prompt: None,
        reference_texture_ids: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_prompt_joins_name_description_and_style() {
        let prompt = texture_prompt("Ruby Sword", Some("glows faintly"), Some("ornate"));
        assert_eq!(prompt, "Ruby Sword, glows faintly, style: ornate");
    }

    #[test]
    fn texture_prompt_falls_back_to_name_only() {
        assert_eq!(texture_prompt("Ruby Sword", None, None), "Ruby Sword");
    }

    #[test]
    fn item_texture_and_block_texture_use_distinct_directories() {
        let item = item_texture("examplemod", "ruby_sword", "p".to_string());
        let block = block_texture("examplemod", "ruby_ore", "p".to_string());
        assert!(item.path.contains("/textures/item/"));
        assert!(block.path.contains("/textures/block/"));
    }
}
