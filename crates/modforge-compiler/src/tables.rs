//! Fixed default tables: tool-tier stats and crafting ingredients, keyed
//! by material tier, plus recipe shapes keyed by tool kind.

use modforge_core::spec::{MaterialTier, ToolKind};

/// `(durability, mining_speed, attack_damage)` defaults for a material
/// tier; explicit `ToolSpec` fields override individual entries.
#[must_use]
pub fn tier_stats(tier: MaterialTier) -> (u32, f32, f32) {
    match tier {
        MaterialTier::Wood => (59, 2.0, 4.0),
        MaterialTier::Stone => (131, 4.0, 5.0),
        MaterialTier::Iron => (250, 6.0, 6.0),
        MaterialTier::Diamond => (1561, 8.0, 7.0),
        MaterialTier::Netherite => (2031, 9.0, 8.0),
    }
}

/// The vanilla-style crafting ingredient a material tier resolves to.
/// Per the tier table, never hard-coded to iron regardless of which tool
/// is being crafted.
#[must_use]
pub fn tier_ingredient(tier: MaterialTier) -> &'static str {
    match tier {
        MaterialTier::Wood => "minecraft:planks",
        MaterialTier::Stone => "minecraft:cobblestone",
        MaterialTier::Iron => "minecraft:iron_ingot",
        MaterialTier::Diamond => "minecraft:diamond",
        MaterialTier::Netherite => "minecraft:netherite_ingot",
    }
}

/// A shaped-recipe pattern for a tool kind: three rows of exactly three
/// characters, `' '` for an empty cell, `'X'` for the tier ingredient, and
/// `'S'` for a stick.
#[must_use]
pub fn recipe_pattern(kind: ToolKind) -> [&'static str; 3] {
    match kind {
        ToolKind::Pickaxe => ["XXX", " S ", " S "],
        ToolKind::Axe => ["XX ", " S ", " S "],
        ToolKind::Sword => [" X ", " X ", " S "],
        ToolKind::Shovel => [" X ", " S ", " S "],
        ToolKind::Hoe => ["XX ", " S ", " S "],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_stats_increase_with_tier() {
        let (wood_durability, ..) = tier_stats(MaterialTier::Wood);
        let (netherite_durability, ..) = tier_stats(MaterialTier::Netherite);
        assert!(netherite_durability > wood_durability);
    }

    #[test]
    fn every_tier_has_a_distinct_ingredient() {
        let tiers = [
            MaterialTier::Wood,
            MaterialTier::Stone,
            MaterialTier::Iron,
            MaterialTier::Diamond,
            MaterialTier::Netherite,
        ];
        let mut ingredients: Vec<_> = tiers.iter().map(|t| tier_ingredient(*t)).collect();
        ingredients.sort_unstable();
        ingredients.dedup();
        assert_eq!(ingredients.len(), tiers.len());
    }

    #[test]
    fn recipe_pattern_rows_are_three_characters() {
        for kind in [ToolKind::Pickaxe, ToolKind::Axe, ToolKind::Sword, ToolKind::Shovel, ToolKind::Hoe] {
            for row in recipe_pattern(kind) {
                assert_eq!(row.len(), 3);
            }
        }
    }
}
