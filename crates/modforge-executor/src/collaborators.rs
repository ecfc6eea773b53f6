//! External collaborators invoked by concrete tool handlers. Both are
//! opaque side-effecting services; the Executor only depends on these
//! narrow trait boundaries, never on a concrete implementation.

use crate::cancel::CancellationToken;
use async_trait::async_trait;
use modforge_core::error::ForgeError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The LLM-backed texture generation service invoked by the
/// `generate_texture` tool handler.
#[async_trait]
pub trait TextureGenerator: Send + Sync {
    /// Generate `variant_count` PNG variants for `prompt`, optionally
    /// conditioned on `reference_ids`. Returns raw PNG bytes per variant;
    /// the caller selects the first one in non-interactive mode.
    async fn generate(&self, prompt: &str, reference_ids: &[String], variant_count: u32) -> Result<Vec<Vec<u8>>, ForgeError>;
}

/// The outcome of a successful build: the produced JAR's location and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    /// Path to the produced JAR, relative to the run's workspace directory.
    pub jar_path: PathBuf,
    /// Size of the JAR in bytes.
    pub file_size: u64,
}

/// The downstream build subprocess invoked by the `build` tool handler.
#[async_trait]
pub trait Builder: Send + Sync {
    /// Run the build command in `workspace_dir`, honoring `timeout` and
    /// `cancellation`. Succeeds iff the command exits `0` and a JAR is
    /// found under the conventional output directory.
    async fn build(&self, workspace_dir: &Path, timeout: Duration, cancellation: &CancellationToken) -> Result<BuildOutcome, ForgeError>;
}
