//! The user-facing mod specification: `ModSpec` and its leaf enums.
//!
//! Every leaf field is optional — the Compiler (`modforge-compiler`) fills
//! defaults. Enum leaves accept their canonical `SCREAMING_SNAKE_CASE`
//! string and a documented set of legacy aliases via `#[serde(alias = ..)]`;
//! because `Serialize` always emits the canonical variant name, deserializing
//! a spec and re-serializing it normalizes every enum leaf to its canonical
//! form, which is exactly the Spec Store's "normalize at write time" rule.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Rarity tier, mirrors vanilla Minecraft's item rarity enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rarity {
    /// Default rarity.
    #[serde(alias = "NORMAL")]
    Common,
    /// Slightly elevated rarity.
    #[serde(alias = "SPECIAL")]
    Uncommon,
    /// Notably elevated rarity.
    Rare,
    /// Highest rarity tier.
    #[serde(alias = "MYTHIC")]
    Epic,
}

impl Default for Rarity {
    fn default() -> Self {
        Self::Common
    }
}

/// Creative-mode inventory tab an element is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreativeTab {
    /// Catch-all tab.
    Misc,
    /// Building blocks tab.
    #[serde(alias = "BUILDING")]
    BuildingBlocks,
    /// Tools tab.
    Tools,
    /// Combat tab.
    #[serde(alias = "WEAPONS")]
    Combat,
    /// Food and drink tab.
    Food,
    /// Redstone tab.
    Redstone,
}

impl Default for CreativeTab {
    fn default() -> Self {
        Self::Misc
    }
}

/// Block sound group, drives footstep/break/place sound selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoundGroup {
    /// Stone-like sounds.
    #[serde(alias = "ROCK")]
    Stone,
    /// Wood-like sounds.
    Wood,
    /// Metal-like sounds.
    #[serde(alias = "ORE")]
    Metal,
    /// Cloth-like sounds.
    Cloth,
    /// Glass-like sounds.
    Glass,
    /// Gravel-like sounds.
    Gravel,
}

impl Default for SoundGroup {
    fn default() -> Self {
        Self::Stone
    }
}

/// Tool material tier, keys the Compiler's tool-tier and recipe-ingredient
/// tables (`modforge-compiler`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaterialTier {
    /// Weakest tier.
    Wood,
    /// Stone tier.
    Stone,
    /// Iron tier.
    Iron,
    /// Diamond tier.
    Diamond,
    /// Strongest tier.
    Netherite,
}

impl Default for MaterialTier {
    fn default() -> Self {
        Self::Wood
    }
}

/// The kind of tool an element describes, selects the Compiler's recipe
/// pattern and Java class suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToolKind {
    /// Mines stone-tier and above blocks.
    Pickaxe,
    /// Chops wood.
    Axe,
    /// Deals melee damage.
    Sword,
    /// Digs dirt-like blocks.
    Shovel,
    /// Tills farmland.
    Hoe,
}

impl Default for ToolKind {
    fn default() -> Self {
        Self::Sword
    }
}

/// A proposed or saved item. Every field but `item_name` is commonly left
/// unset for the Compiler to default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ItemSpec {
    /// Human-readable display name, e.g. `"Ruby Sword"`.
    pub item_name: Option<String>,
    /// Free-text flavor/description text.
    pub description: Option<String>,
    /// Rarity tier; defaults to `COMMON`.
    pub rarity: Option<Rarity>,
    /// Creative tab; defaults to `MISC`.
    pub creative_tab: Option<CreativeTab>,
    /// Max stack size; defaults to 64.
    pub max_stack_size: Option<u32>,
    /// Whether the item survives fire/lava; defaults to `false`.
    pub fireproof: Option<bool>,
    /// Optional texture-variant discriminator passed through to asset
    /// synthesis.
    pub custom_model_data: Option<u32>,
    /// Free-text hint steering texture generation (e.g. `"glowing, ornate"`).
    pub texture_style_hint: Option<String>,
}

/// A proposed or saved block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BlockSpec {
    /// Human-readable display name.
    pub block_name: Option<String>,
    /// Free-text flavor/description text.
    pub description: Option<String>,
    /// Rarity tier of the block's item form; defaults to `COMMON`.
    pub rarity: Option<Rarity>,
    /// Creative tab of the block's item form; defaults to `MISC`.
    pub creative_tab: Option<CreativeTab>,
    /// Mining hardness; defaults to `3.0`.
    pub hardness: Option<f32>,
    /// Explosion resistance; defaults to `3.0`.
    pub resistance: Option<f32>,
    /// Light emission level (0-15); defaults to `0`.
    pub luminance: Option<u8>,
    /// Whether a tool is required to drop loot; defaults to `true`.
    pub requires_tool: Option<bool>,
    /// Sound group; defaults to `STONE`.
    pub sound_group: Option<SoundGroup>,
    /// Free-text hint steering texture generation.
    pub texture_style_hint: Option<String>,
}

/// A proposed or saved tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolSpec {
    /// Human-readable display name.
    pub tool_name: Option<String>,
    /// Free-text flavor/description text.
    pub description: Option<String>,
    /// Which family of tool this is; defaults to `SWORD`.
    pub tool_kind: Option<ToolKind>,
    /// Material tier, keys the tool-tier default table; defaults to `WOOD`.
    pub material_tier: Option<MaterialTier>,
    /// Durability override; falls back to the tier table.
    pub durability: Option<u32>,
    /// Mining speed override; falls back to the tier table.
    pub mining_speed: Option<f32>,
    /// Attack damage override; falls back to the tier table.
    pub attack_damage: Option<f32>,
    /// Rarity tier; defaults to `COMMON`.
    pub rarity: Option<Rarity>,
    /// Creative tab; defaults to `MISC`.
    pub creative_tab: Option<CreativeTab>,
    /// Free-text hint steering texture generation.
    pub texture_style_hint: Option<String>,
}

/// The canonical mod specification for one workspace. At most one exists
/// per workspace at a time; mutated only through [`crate::delta::SpecDelta`]
/// application, never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ModSpec {
    /// Human-authored mod name, e.g. `"Gemstone Tools"`.
    pub mod_name: Option<String>,
    /// Explicit mod id override; derived from `mod_name` if absent.
    pub mod_id: Option<String>,
    /// Semantic mod version, e.g. `"1.0.0"`.
    pub version: Option<String>,
    /// Author display name.
    pub author: Option<String>,
    /// Items, addressed positionally as `items[i]`.
    pub items: Vec<ItemSpec>,
    /// Blocks, addressed positionally as `blocks[i]`.
    pub blocks: Vec<BlockSpec>,
    /// Tools, addressed positionally as `tools[i]`.
    pub tools: Vec<ToolSpec>,
}
