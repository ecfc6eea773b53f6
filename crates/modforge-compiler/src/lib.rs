//! The Compiler: a pure, deterministic `ModSpec x CompatibilityConfig ->
//! ModIR` function. Fills defaults, derives identifiers, synthesizes
//! asset descriptors and crafting recipes, and validates the result.
//!
//! No I/O beyond reading the [`modforge_core::config::CompatibilityConfig`]
//! passed in.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod assets;
mod compiler;
mod naming;
mod recipes;
mod tables;

pub use compiler::compile;
pub use naming::{pascal_case, screaming_snake_case, slugify};
pub use tables::{recipe_pattern, tier_ingredient, tier_stats};
