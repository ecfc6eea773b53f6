//! The pure `ModSpec × CompatibilityConfig -> ModIR` compilation function.

use crate::assets::{
    block_item_model, block_model, block_texture, blockstate, item_model, item_texture, lang_asset, loot_table,
    texture_prompt,
};
use crate::naming::{pascal_case, screaming_snake_case, slugify};
use crate::recipes::synthesize_recipe;
use crate::tables::tier_stats;
use chrono::Utc;
use modforge_core::config::CompatibilityConfig;
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::ir::{IRAsset, IRBlock, IRItem, IRTool, ModIR};
use modforge_core::spec::{ModSpec, ToolKind};
use std::collections::HashSet;

/// Compile `spec` against `compat` into a fully-determined [`ModIR`].
/// Pure and deterministic: equal inputs yield a byte-equal IR modulo
/// `compiled_at`.
///
/// # Errors
///
/// Returns [`ForgeError::MissingRequiredField`] if a derived `mod_id` is
/// empty, or [`ForgeError::DuplicateRegistryId`] if two elements collide.
pub fn compile(spec: &ModSpec, compat: &CompatibilityConfig, source_spec_version: u64) -> Result<ModIR, ForgeError> {
    let mod_name = spec.mod_name.clone().unwrap_or_else(|| "My Mod".to_string());
    let mod_id = match &spec.mod_id {
        Some(explicit) if !explicit.trim().is_empty() => slugify(explicit),
        _ => slugify(&mod_name),
    };
    if mod_id.is_empty() {
        return Err(ForgeError::MissingRequiredField {
            code: ErrorCode::MissingRequiredField,
            field: "mod_id".to_string(),
            reason: format!("derived mod_id from mod_name '{mod_name}' was empty after normalization"),
        });
    }

    let base_package = format!("com.example.{mod_id}");
    let main_class = format!("{}Mod", pascal_case(&mod_id));
    let mod_version = spec.version.clone().unwrap_or_else(|| "1.0.0".to_string());

    let mut lang_entries = Vec::new();
    let mut assets = Vec::new();

    let items: Vec<IRItem> = spec
        .items
        .iter()
        .enumerate()
        .map(|(index, item)| compile_item(&mod_id, index, item, &mut assets, &mut lang_entries))
        .collect();

    let blocks: Vec<IRBlock> = spec
        .blocks
        .iter()
        .enumerate()
        .map(|(index, block)| compile_block(&mod_id, index, block, &mut assets, &mut lang_entries))
        .collect();

    let tools: Vec<IRTool> = spec
        .tools
        .iter()
        .enumerate()
        .map(|(index, tool)| compile_tool(&mod_id, index, tool, &mut assets, &mut lang_entries))
        .collect();

    let recipes = tools.iter().map(|tool| synthesize_recipe(&mod_id, tool)).collect();

    assets.push(lang_asset(&mod_id, &lang_entries));

    let ir = ModIR {
        mod_id,
        base_package,
        main_class,
        mod_version,
        minecraft_version: compat.minecraft_version.clone(),
        loader: compat.loader,
        mapping: compat.mapping,
        items,
        blocks,
        tools,
        recipes,
        assets,
        compiled_at: Utc::now(),
        source_spec_version,
    };

    validate(&ir)?;
    Ok(ir)
}

fn compile_item(
    mod_id: &str,
    index: usize,
    item: &modforge_core::spec::ItemSpec,
    assets: &mut Vec<IRAsset>,
    lang_entries: &mut Vec<(String, String)>,
) -> IRItem {
    let display_name = item.item_name.clone().unwrap_or_else(|| format!("Item {index}"));
    let element_id = slugify(&display_name);
    let registry_id = format!("{mod_id}:{element_id}");

    let prompt = texture_prompt(&display_name, item.description.as_deref(), item.texture_style_hint.as_deref());
    assets.push(item_texture(mod_id, &element_id, prompt));
    assets.push(item_model(mod_id, &element_id));
    lang_entries.push((format!("item.{mod_id}.{element_id}"), display_name.clone()));

    IRItem {
        source_index: index,
        java_class_name: format!("{}Item", pascal_case(&element_id)),
        registration_constant: screaming_snake_case(&element_id),
        rarity: item.rarity.unwrap_or_default(),
        creative_tab: item.creative_tab.unwrap_or_default(),
        max_stack_size: item.max_stack_size.unwrap_or(64),
        fireproof: item.fireproof.unwrap_or(false),
        display_name,
        registry_id,
    }
}

fn compile_block(
    mod_id: &str,
    index: usize,
    block: &modforge_core::spec::BlockSpec,
    assets: &mut Vec<IRAsset>,
    lang_entries: &mut Vec<(String, String)>,
) -> IRBlock {
    let display_name = block.block_name.clone().unwrap_or_else(|| format!("Block {index}"));
    let element_id = slugify(&display_name);
    let registry_id = format!("{mod_id}:{element_id}");

    let prompt = texture_prompt(&display_name, block.description.as_deref(), block.texture_style_hint.as_deref());
    assets.push(block_texture(mod_id, &element_id, prompt));
    assets.push(block_model(mod_id, &element_id));
    assets.push(block_item_model(mod_id, &element_id));
    assets.push(blockstate(mod_id, &element_id));
    assets.push(loot_table(mod_id, &element_id));
    lang_entries.push((format!("block.{mod_id}.{element_id}"), display_name.clone()));

    IRBlock {
        source_index: index,
        java_class_name: format!("{}Block", pascal_case(&element_id)),
        registration_constant: screaming_snake_case(&element_id),
        rarity: block.rarity.unwrap_or_default(),
        creative_tab: block.creative_tab.unwrap_or_default(),
        hardness: block.hardness.unwrap_or(3.0),
        resistance: block.resistance.unwrap_or(3.0),
        luminance: block.luminance.unwrap_or(0),
        requires_tool: block.requires_tool.unwrap_or(true),
        sound_group: block.sound_group.unwrap_or_default(),
        display_name,
        registry_id,
    }
}

fn compile_tool(
    mod_id: &str,
    index: usize,
    tool: &modforge_core::spec::ToolSpec,
    assets: &mut Vec<IRAsset>,
    lang_entries: &mut Vec<(String, String)>,
) -> IRTool {
    let display_name = tool.tool_name.clone().unwrap_or_else(|| format!("Tool {index}"));
    let element_id = slugify(&display_name);
    let registry_id = format!("{mod_id}:{element_id}");
    let tool_kind = tool.tool_kind.unwrap_or_default();
    let material_tier = tool.material_tier.unwrap_or_default();
    let (tier_durability, tier_speed, tier_damage) = tier_stats(material_tier);

    let prompt = texture_prompt(&display_name, tool.description.as_deref(), tool.texture_style_hint.as_deref());
    assets.push(item_texture(mod_id, &element_id, prompt));
    assets.push(item_model(mod_id, &element_id));
    lang_entries.push((format!("item.{mod_id}.{element_id}"), display_name.clone()));

    IRTool {
        source_index: index,
        java_class_name: format!("{}{}", pascal_case(&element_id), tool_class_suffix(tool_kind)),
        registration_constant: screaming_snake_case(&element_id),
        durability: tool.durability.unwrap_or(tier_durability),
        mining_speed: tool.mining_speed.unwrap_or(tier_speed),
        attack_damage: tool.attack_damage.unwrap_or(tier_damage),
        rarity: tool.rarity.unwrap_or_default(),
        creative_tab: tool.creative_tab.unwrap_or(modforge_core::spec::CreativeTab::Tools),
        display_name,
        registry_id,
        tool_kind,
        material_tier,
    }
}

fn tool_class_suffix(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Pickaxe => "PickaxeItem",
        ToolKind::Axe => "AxeItem",
        ToolKind::Sword => "SwordItem",
        ToolKind::Shovel => "ShovelItem",
        ToolKind::Hoe => "HoeItem",
    }
}

fn validate(ir: &ModIR) -> Result<(), ForgeError> {
    if ir.mod_id.is_empty() {
        return Err(ForgeError::MissingRequiredField {
            code: ErrorCode::MissingRequiredField,
            field: "mod_id".to_string(),
            reason: "empty after derivation".to_string(),
        });
    }
    if ir.base_package.is_empty() {
        return Err(ForgeError::MissingRequiredField {
            code: ErrorCode::MissingRequiredField,
            field: "base_package".to_string(),
            reason: "empty after derivation".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for registry_id in ir.all_registry_ids() {
        if !seen.insert(registry_id) {
            return Err(ForgeError::DuplicateRegistryId {
                code: ErrorCode::DuplicateRegistryId,
                registry_id: registry_id.to_string(),
            });
        }
    }

    for recipe in &ir.recipes {
        if !ir.all_registry_ids().contains(&recipe.output_registry_id.as_str()) {
            return Err(ForgeError::DanglingRecipeReference {
                code: ErrorCode::DanglingRecipeReference,
                recipe_id: recipe.registry_id.clone(),
                reference: recipe.output_registry_id.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::spec::{ItemSpec, MaterialTier, Rarity, ToolSpec};

    #[test]
    fn compile_applies_documented_defaults() {
        let mut spec = ModSpec::default();
        spec.mod_name = Some("Gemstone Tools".to_string());
        spec.items.push(ItemSpec { item_name: Some("Ruby Sword".to_string()), ..Default::default() });

        let ir = compile(&spec, &CompatibilityConfig::default(), 1).unwrap();
        assert_eq!(ir.mod_id, "gemstone_tools");
        assert_eq!(ir.base_package, "com.example.gemstone_tools");
        assert_eq!(ir.main_class, "GemstoneToolsMod");
        assert_eq!(ir.items[0].max_stack_size, 64);
        assert_eq!(ir.items[0].rarity, Rarity::Common);
        assert!(!ir.items[0].fireproof);
    }

    #[test]
    fn compile_is_deterministic_modulo_compiled_at() {
        let mut spec = ModSpec::default();
        spec.mod_name = Some("Gemstone Tools".to_string());
        spec.tools.push(ToolSpec { tool_name: Some("Ruby Pickaxe".to_string()), ..Default::default() });

        let a = compile(&spec, &CompatibilityConfig::default(), 1).unwrap();
        let b = compile(&spec, &CompatibilityConfig::default(), 1).unwrap();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
    }

    #[test]
    fn tool_recipe_ingredient_follows_material_tier_not_iron() {
        let mut spec = ModSpec::default();
        spec.mod_name = Some("Gemstone Tools".to_string());
        spec.tools.push(ToolSpec {
            tool_name: Some("Ruby Pickaxe".to_string()),
            material_tier: Some(MaterialTier::Diamond),
            ..Default::default()
        });

        let ir = compile(&spec, &CompatibilityConfig::default(), 1).unwrap();
        assert_eq!(ir.recipes[0].key[&'X'], "minecraft:diamond");
    }

    #[test]
    fn duplicate_names_yield_duplicate_registry_id_error() {
        let mut spec = ModSpec::default();
        spec.mod_name = Some("Gemstone Tools".to_string());
        spec.items.push(ItemSpec { item_name: Some("Ruby Sword".to_string()), ..Default::default() });
        spec.tools.push(ToolSpec { tool_name: Some("Ruby Sword".to_string()), ..Default::default() });

        let err = compile(&spec, &CompatibilityConfig::default(), 1).unwrap_err();
        assert_eq!(err.code(), ErrorCode::DuplicateRegistryId);
    }

    #[test]
    fn block_gets_blockstate_item_model_and_loot_table() {
        let mut spec = ModSpec::default();
        spec.mod_name = Some("Gemstone Tools".to_string());
        spec.blocks.push(modforge_core::spec::BlockSpec {
            block_name: Some("Ruby Ore".to_string()),
            ..Default::default()
        });

        let ir = compile(&spec, &CompatibilityConfig::default(), 1).unwrap();
        let kinds: Vec<_> = ir.assets.iter().map(|a| a.kind).collect();
        assert!(kinds.contains(&modforge_core::ir::AssetKind::Blockstate));
        assert!(kinds.contains(&modforge_core::ir::AssetKind::ItemModel));
        assert!(kinds.contains(&modforge_core::ir::AssetKind::LootTable));
    }
}
