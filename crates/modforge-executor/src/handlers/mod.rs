//! The nine concrete tool handlers bound to the Planner's task kinds.
//! Every handler but `generate_texture` and `build` performs only local
//! file-writing against the run's workspace directory.

mod build;
mod generate_assets;
mod generate_build_files;
mod generate_code;
mod generate_fabric_metadata;
mod generate_mixins;
mod generate_texture;
mod setup_gradle_wrapper;
mod setup_workspace;

pub use build::BuildHandler;
pub use generate_assets::GenerateAssetsHandler;
pub use generate_build_files::GenerateBuildFilesHandler;
pub use generate_code::GenerateCodeHandler;
pub use generate_fabric_metadata::GenerateFabricMetadataHandler;
pub use generate_mixins::GenerateMixinsHandler;
pub use generate_texture::GenerateTextureHandler;
pub use setup_gradle_wrapper::SetupGradleWrapperHandler;
pub use setup_workspace::SetupWorkspaceHandler;

use modforge_core::error::ForgeError;
use std::path::Path;
use tokio::io::AsyncWriteExt;

/// Write `contents` to `relative_path` under `workspace_dir`, creating
/// intermediate directories as needed.
pub(crate) async fn write_text(workspace_dir: &Path, relative_path: &str, contents: &str) -> Result<(), ForgeError> {
    write_bytes(workspace_dir, relative_path, contents.as_bytes()).await
}

/// Write raw `bytes` to `relative_path` under `workspace_dir`, creating
/// intermediate directories as needed.
pub(crate) async fn write_bytes(workspace_dir: &Path, relative_path: &str, bytes: &[u8]) -> Result<(), ForgeError> {
    let full_path = workspace_dir.join(relative_path);
    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::File::create(&full_path).await?;
    file.write_all(bytes).await?;
    Ok(())
}

/// Extract a required string field from a resolved parameter map,
/// assuming the Executor already verified its presence via `ParamSpec`.
pub(crate) fn expect_str<'a>(params: &'a serde_json::Map<String, serde_json::Value>, key: &str) -> &'a str {
    params.get(key).and_then(serde_json::Value::as_str).unwrap_or_default()
}
