//! The fully-determined intermediate representation produced by the
//! Compiler (`modforge-compiler`) and consumed by the Planner/Executor.

use crate::config::{Loader, Mapping};
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::spec::{CreativeTab, MaterialTier, Rarity, SoundGroup, ToolKind};

/// The kind of generated asset an [`IRAsset`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    /// A PNG texture, generated by the Texture Generator collaborator.
    Texture,
    /// A block/item model JSON document.
    Model,
    /// A blockstate JSON document.
    Blockstate,
    /// A block's item-form model JSON document.
    ItemModel,
    /// A loot table JSON document.
    LootTable,
    /// A language/translation JSON document.
    Lang,
}

/// A single asset the Executor must materialize on disk.
///
/// `kind` determines which of `prompt` or `payload` is populated: texture
/// assets carry a generation prompt, every other kind carries a complete
/// JSON payload. The two are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IRAsset {
    /// What kind of asset this is.
    pub kind: AssetKind,
    /// Path relative to the run's workspace directory, e.g.
    /// `assets/examplemod/textures/item/ruby_sword.png`.
    pub path: String,
    /// Complete JSON payload; populated for every kind except `texture`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Texture-generation prompt; populated only for `texture` assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Ids of prior textures to use as generation references.
    #[serde(default)]
    pub reference_texture_ids: Vec<String>,
}

/// A fully-resolved item, ready for code/asset generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IRItem {
    /// Source index into `ModSpec::items`.
    pub source_index: usize,
    /// `<mod_id>:<snake_case(name)>`.
    pub registry_id: String,
    /// PascalCase class name with an `Item` suffix.
    pub java_class_name: String,
    /// SCREAMING_SNAKE_CASE registration field name.
    pub registration_constant: String,
    /// Display name shown in-game.
    pub display_name: String,
    /// Resolved rarity.
    pub rarity: Rarity,
    /// Resolved creative tab.
    pub creative_tab: CreativeTab,
    /// Resolved max stack size.
    pub max_stack_size: u32,
    /// Resolved fireproof flag.
    pub fireproof: bool,
}

/// A fully-resolved block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IRBlock {
    /// Source index into `ModSpec::blocks`.
    pub source_index: usize,
    /// `<mod_id>:<snake_case(name)>`.
    pub registry_id: String,
    /// PascalCase class name with a `Block` suffix.
    pub java_class_name: String,
    /// SCREAMING_SNAKE_CASE registration field name.
    pub registration_constant: String,
    /// Display name shown in-game.
    pub display_name: String,
    /// Resolved rarity of the block's item form.
    pub rarity: Rarity,
    /// Resolved creative tab of the block's item form.
    pub creative_tab: CreativeTab,
    /// Resolved mining hardness.
    pub hardness: f32,
    /// Resolved explosion resistance.
    pub resistance: f32,
    /// Resolved light emission level.
    pub luminance: u8,
    /// Resolved tool-required-to-drop flag.
    pub requires_tool: bool,
    /// Resolved sound group.
    pub sound_group: SoundGroup,
}

/// A fully-resolved tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IRTool {
    /// Source index into `ModSpec::tools`.
    pub source_index: usize,
    /// `<mod_id>:<snake_case(name)>`.
    pub registry_id: String,
    /// PascalCase class name with a kind-specific suffix (`PickaxeItem`, …).
    pub java_class_name: String,
    /// SCREAMING_SNAKE_CASE registration field name.
    pub registration_constant: String,
    /// Display name shown in-game.
    pub display_name: String,
    /// Which family of tool this is.
    pub tool_kind: ToolKind,
    /// Material tier, keys the recipe ingredient table.
    pub material_tier: MaterialTier,
    /// Resolved durability.
    pub durability: u32,
    /// Resolved mining speed.
    pub mining_speed: f32,
    /// Resolved attack damage.
    pub attack_damage: f32,
    /// Resolved rarity.
    pub rarity: Rarity,
    /// Resolved creative tab.
    pub creative_tab: CreativeTab,
}

/// A synthesized shaped crafting recipe for an [`IRTool`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IRRecipe {
    /// `<mod_id>:<snake_case(name)>` of the recipe itself.
    pub registry_id: String,
    /// Registry id of the element this recipe produces.
    pub output_registry_id: String,
    /// Always `"shaped"` for the recipes this Compiler synthesizes.
    pub kind: String,
    /// Three rows of up to three characters each, matching vanilla's
    /// shaped-recipe pattern grid.
    pub pattern: [String; 3],
    /// Maps a pattern character to the ingredient's registry id.
    pub key: BTreeMap<char, String>,
}

/// The fully-determined mod blueprint produced by the Compiler for one
/// `(workspace, spec_version)` pair. Immutable once produced; lives for
/// the duration of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModIR {
    /// Derived or explicit mod id.
    pub mod_id: String,
    /// `com.example.<mod_id>`.
    pub base_package: String,
    /// PascalCase(mod_id) + `Mod`.
    pub main_class: String,
    /// Mod version string, defaults to `"1.0.0"` if the spec left it unset.
    pub mod_version: String,
    /// Target Minecraft version.
    pub minecraft_version: String,
    /// Target mod loader.
    pub loader: Loader,
    /// Target mapping set.
    pub mapping: Mapping,
    /// Fully-resolved items.
    pub items: Vec<IRItem>,
    /// Fully-resolved blocks.
    pub blocks: Vec<IRBlock>,
    /// Fully-resolved tools.
    pub tools: Vec<IRTool>,
    /// Synthesized crafting recipes, one per tool.
    pub recipes: Vec<IRRecipe>,
    /// Every asset the Executor must materialize.
    pub assets: Vec<IRAsset>,
    /// When this IR was compiled. Excluded from the fingerprint
    /// byte-equality comparison — callers compare `fingerprint()` instead,
    /// which hashes every field but this one.
    pub compiled_at: DateTime<Utc>,
    /// The `SpecVersion.version` this IR was compiled from.
    pub source_spec_version: u64,
}

impl ModIR {
    /// Canonical content hash over every field except `compiled_at`, so
    /// two compiles of the same spec are byte-equal modulo the provenance
    /// timestamp.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if the IR cannot be serialized.
    pub fn fingerprint(&self) -> Result<String, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Some(obj) = value.as_object_mut() {
            obj.remove("compiled_at");
        }
        crate::hash::canonical_hash(&value)
    }

    /// All registry ids declared by this IR, across items/blocks/tools/
    /// recipes, in declaration order.
    #[must_use]
    pub fn all_registry_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|i| i.registry_id.as_str())
            .chain(self.blocks.iter().map(|b| b.registry_id.as_str()))
            .chain(self.tools.iter().map(|t| t.registry_id.as_str()))
            .chain(self.recipes.iter().map(|r| r.registry_id.as_str()))
            .collect()
    }
}
