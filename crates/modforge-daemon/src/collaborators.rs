//! Process-backed implementations of the Executor's collaborator traits,
//! wired into the daemon binary. These are the only place in the
//! workspace that shells out.

use async_trait::async_trait;
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_executor::collaborators::{BuildOutcome, Builder, TextureGenerator};
use modforge_executor::CancellationToken;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::warn;
use walkdir::WalkDir;

/// Invokes the Gradle wrapper staged into the run's workspace directory
/// by the `setup_gradle_wrapper` task, honoring the task timeout and
/// cooperative cancellation.
///
/// On cancellation the child is sent an interrupt first; only a child
/// that ignores it for `cancellation_grace` is killed outright.
pub struct PlaceholderBuilder {
    cancellation_grace: Duration,
}

impl PlaceholderBuilder {
    /// Bind the grace period between an interrupt and a kill signal.
    #[must_use]
    pub fn new(cancellation_grace: Duration) -> Self {
        Self { cancellation_grace }
    }
}

/// Send a platform interrupt to `pid`; falls back to no-op where the
/// host has no `kill` utility (e.g. Windows), relying on the grace
/// timeout to escalate to [`Child::kill`] instead.
async fn interrupt(pid: u32) {
    #[cfg(unix)]
    {
        let _ = Command::new("kill").arg("-TERM").arg(pid.to_string()).status().await;
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}

/// Interrupt `child`, wait up to `grace` for it to exit on its own, and
/// kill it outright if it hasn't.
async fn terminate_gracefully(child: &mut Child, grace: Duration) {
    if let Some(pid) = child.id() {
        interrupt(pid).await;
    }
    if tokio::time::timeout(grace, child.wait()).await.is_err() {
        let _ = child.kill().await;
    }
}

#[async_trait]
impl Builder for PlaceholderBuilder {
    async fn build(&self, workspace_dir: &Path, timeout: Duration, cancellation: &CancellationToken) -> Result<BuildOutcome, ForgeError> {
        let wrapper = if cfg!(windows) { "gradlew.bat" } else { "./gradlew" };

        let mut cmd = Command::new(wrapper);
        cmd.arg("build")
            .current_dir(workspace_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|err| ForgeError::ToolFailure {
            code: ErrorCode::ToolFailure,
            task_id: "build".into(),
            reason: format!("failed to spawn gradle wrapper: {err}"),
        })?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr);
                let mut line = String::new();
                loop {
                    line.clear();
                    match reader.read_line(&mut line).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {
                            let trimmed = line.trim_end();
                            if !trimmed.is_empty() {
                                warn!(target: "modforge_daemon.gradle", "{trimmed}");
                            }
                        }
                    }
                }
            });
        }

        let start = std::time::Instant::now();
        let status = tokio::select! {
            result = tokio::time::timeout(timeout, child.wait()) => match result {
                Ok(Ok(status)) => status,
                Ok(Err(err)) => return Err(ForgeError::ToolFailure { code: ErrorCode::ToolFailure, task_id: "build".into(), reason: err.to_string() }),
                Err(_) => {
                    let _ = child.kill().await;
                    return Err(ForgeError::Timeout { code: ErrorCode::Timeout, task_id: "build".into(), elapsed_ms: start.elapsed().as_millis() as u64 });
                }
            },
            () = cancellation.cancelled() => {
                terminate_gracefully(&mut child, self.cancellation_grace).await;
                return Err(ForgeError::Internal { code: ErrorCode::InternalError, message: "build canceled".into() });
            }
        };

        if !status.success() {
            return Err(ForgeError::ToolFailure {
                code: ErrorCode::ToolFailure,
                task_id: "build".into(),
                reason: format!("gradle exited with status {status}"),
            });
        }

        let jar = WalkDir::new(workspace_dir.join("build/libs"))
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| entry.path().extension().is_some_and(|ext| ext == "jar"))
            .ok_or_else(|| ForgeError::ToolFailure {
                code: ErrorCode::ToolFailure,
                task_id: "build".into(),
                reason: "no jar produced under build/libs".into(),
            })?;

        let metadata = tokio::fs::metadata(jar.path()).await?;

        Ok(BuildOutcome {
            jar_path: jar.path().strip_prefix(workspace_dir).unwrap_or(jar.path()).to_path_buf(),
            file_size: metadata.len(),
        })
    }
}

/// Stands in for the LLM-backed texture service: emits deterministic
/// placeholder PNG bytes rather than calling out to an external model
/// provider, since no such dependency is part of this workspace.
pub struct PlaceholderTextureGenerator;

#[async_trait]
impl TextureGenerator for PlaceholderTextureGenerator {
    async fn generate(&self, prompt: &str, _reference_ids: &[String], variant_count: u32) -> Result<Vec<Vec<u8>>, ForgeError> {
        let seed = prompt.bytes().fold(0u8, |acc, b| acc.wrapping_add(b));
        Ok((0..variant_count.max(1)).map(|variant| vec![seed.wrapping_add(variant as u8); 16]).collect())
    }
}
