//! The Executor: DAG scheduling and tool-handler dispatch.
//!
//! Owns the READY-set/priority/fan-out scheduling loop and the typed
//! [`ToolRegistry`] of handlers bound to task kinds. Knows nothing about
//! run state machines or HTTP — those live in `modforge-runtime` and
//! `modforge-daemon`, which depend on this crate rather than the reverse.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod cancel;
pub mod collaborators;
pub mod context;
pub mod events;
mod executor;
pub mod handler;
pub mod handlers;
pub mod params;
pub mod registry;

pub use cancel::CancellationToken;
pub use collaborators::{BuildOutcome, Builder, TextureGenerator};
pub use context::{RunContext, TaskContext};
pub use events::{EventSink, NoopEventSink};
pub use executor::{ExecutionOutcome, Executor};
pub use handler::ToolHandler;
pub use params::ir_context;
pub use registry::{ParamSpec, ToolRegistry};

use std::sync::Arc;
use std::time::Duration;

/// Build a [`ToolRegistry`] with every tool handler named in the Planner's
/// phase table, wired against the given collaborators and build
/// timeout.
#[must_use]
pub fn default_registry(texture_generator: Arc<dyn TextureGenerator>, builder: Arc<dyn Builder>, build_timeout: Duration) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(handlers::SetupWorkspaceHandler, ParamSpec::default());

    registry.register(
        handlers::GenerateTextureHandler::new(texture_generator),
        ParamSpec {
            required: vec!["element_id", "prompt", "output_path"],
            declared: vec!["element_id", "prompt", "output_path", "reference_ids"],
        },
    );

    registry.register(
        handlers::GenerateCodeHandler,
        ParamSpec::all_required(&["mod_id", "base_package", "main_class", "items", "blocks", "tools"]),
    );

    registry.register(handlers::GenerateAssetsHandler, ParamSpec::all_required(&["assets"]));

    registry.register(
        handlers::GenerateBuildFilesHandler,
        ParamSpec::all_required(&["mod_id", "mod_version", "minecraft_version", "loader"]),
    );

    registry.register(
        handlers::GenerateFabricMetadataHandler,
        ParamSpec::all_required(&["mod_id", "main_class", "base_package", "mod_version", "minecraft_version", "loader"]),
    );

    registry.register(handlers::GenerateMixinsHandler, ParamSpec::all_required(&["mod_id", "base_package"]));

    registry.register(handlers::SetupGradleWrapperHandler, ParamSpec::default());

    registry.register(
        handlers::BuildHandler::new(builder, build_timeout),
        ParamSpec::all_required(&["mod_id", "mod_version"]),
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use modforge_core::error::ForgeError;
    use std::path::{Path, PathBuf};

    struct UnusedGenerator;
    #[async_trait]
    impl TextureGenerator for UnusedGenerator {
        async fn generate(&self, _prompt: &str, _reference_ids: &[String], _variant_count: u32) -> Result<Vec<Vec<u8>>, ForgeError> {
            Ok(vec![])
        }
    }

    struct UnusedBuilder;
    #[async_trait]
    impl Builder for UnusedBuilder {
        async fn build(&self, _workspace_dir: &Path, _timeout: Duration, _cancellation: &CancellationToken) -> Result<BuildOutcome, ForgeError> {
            Ok(BuildOutcome { jar_path: PathBuf::new(), file_size: 0 })
        }
    }

    #[test]
    fn default_registry_registers_every_phase_table_handler() {
        let registry = default_registry(Arc::new(UnusedGenerator), Arc::new(UnusedBuilder), Duration::from_secs(600));
        assert_eq!(
            registry.list(),
            vec![
                "build",
                "generate_assets",
                "generate_build_files",
                "generate_code",
                "generate_fabric_metadata",
                "generate_mixins",
                "generate_texture",
                "setup_gradle_wrapper",
                "setup_workspace",
            ]
        );
    }
}
