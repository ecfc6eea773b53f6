//! Shaped crafting recipe synthesis for tools.

use crate::tables::{recipe_pattern, tier_ingredient};
use modforge_core::ir::IRRecipe;
use modforge_core::ir::IRTool;
use std::collections::BTreeMap;

/// Synthesize `tool`'s shaped crafting recipe using its kind's pattern and
/// its material tier's ingredient (never hard-coded to iron).
#[must_use]
pub fn synthesize_recipe(mod_id: &str, tool: &IRTool) -> IRRecipe {
    let pattern = recipe_pattern(tool.tool_kind);
    let mut key = BTreeMap::new();
    key.insert('X', tier_ingredient(tool.material_tier).to_string());
    key.insert('S', "minecraft:stick".to_string());

    IRRecipe {
        registry_id: format!("{mod_id}:{}_recipe", tool.registry_id.trim_start_matches(&format!("{mod_id}:"))),
        output_registry_id: tool.registry_id.clone(),
        kind: "shaped".to_string(),
        pattern: [pattern[0].to_string(), pattern[1].to_string(), pattern[2].to_string()],
        key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::spec::{CreativeTab, MaterialTier, Rarity, ToolKind};

    fn sample_tool() -> IRTool {
        IRTool {
            source_index: 0,
            registry_id: "examplemod:ruby_sword".to_string(),
            java_class_name: "RubySwordItem".to_string(),
            registration_constant: "RUBY_SWORD".to_string(),
            display_name: "Ruby Sword".to_string(),
            tool_kind: ToolKind::Sword,
            material_tier: MaterialTier::Diamond,
            durability: 1561,
            mining_speed: 8.0,
            attack_damage: 7.0,
            rarity: Rarity::Common,
            creative_tab: CreativeTab::Combat,
        }
    }

    #[test]
    fn recipe_ingredient_matches_tool_tier_not_iron() {
        let recipe = synthesize_recipe("examplemod", &sample_tool());
        assert_eq!(recipe.key[&'X'], "minecraft:diamond");
    }

    #[test]
    fn recipe_output_references_the_tool() {
        let recipe = synthesize_recipe("examplemod", &sample_tool());
        assert_eq!(recipe.output_registry_id, "examplemod:ruby_sword");
    }
}
