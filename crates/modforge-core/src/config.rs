//! Configuration types shared across the pipeline.
//!
//! [`CompatibilityConfig`] parameterizes the Compiler against a specific
//! Minecraft toolchain. [`ForgeConfig`] is the ambient, operator-facing
//! configuration (fan-out limits, timeouts, retention) loaded once at
//! process startup and threaded into the runtime/executor/bus crates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Mod loader targeted by a compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Loader {
    /// Fabric loader.
    #[default]
    Fabric,
    /// Forge loader.
    Forge,
    /// NeoForge loader.
    NeoForge,
}

/// Mapping set used for deobfuscated names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mapping {
    /// Mojang's official mappings.
    #[default]
    Official,
    /// Yarn community mappings.
    Yarn,
}

/// Parameterizes the Compiler against a target Minecraft toolchain, so the
/// same `ModSpec` compiles deterministically against different targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CompatibilityConfig {
    /// Target Minecraft version, e.g. `"1.21.1"`.
    pub minecraft_version: String,
    /// Target mod loader.
    pub loader: Loader,
    /// Target mapping set.
    pub mapping: Mapping,
}

impl Default for CompatibilityConfig {
    fn default() -> Self {
        Self {
            minecraft_version: "1.21.1".to_string(),
            loader: Loader::default(),
            mapping: Mapping::default(),
        }
    }
}

/// Operator-facing configuration for the run engine, loaded from a TOML
/// file at process startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ForgeConfig {
    /// Maximum number of `parallelizable` tasks the Executor dispatches
    /// concurrently within one run.
    pub fan_out_limit: usize,
    /// Default timeout (seconds) for the `build` task kind.
    pub build_timeout_secs: u64,
    /// Default timeout (seconds) for the `generate_texture` task kind.
    pub texture_timeout_secs: u64,
    /// Default timeout (seconds) for every other task kind.
    pub default_task_timeout_secs: u64,
    /// Grace period (seconds) a completed run's event log is retained for
    /// late-joining subscribers.
    pub event_retention_grace_secs: u64,
    /// Grace period (seconds) between an interrupt and a kill signal when
    /// cancelling an in-flight subprocess-backed task.
    pub cancellation_grace_secs: u64,
    /// Default compatibility target used when a run does not override it.
    pub default_compatibility: CompatibilityConfig,
}

impl Default for ForgeConfig {
    fn default() -> Self {
        Self {
            fan_out_limit: 4,
            build_timeout_secs: 600,
            texture_timeout_secs: 90,
            default_task_timeout_secs: 30,
            event_retention_grace_secs: 3600,
            cancellation_grace_secs: 10,
            default_compatibility: CompatibilityConfig::default(),
        }
    }
}
