//! The per-workspace Spec Store: holds exactly one current `ModSpec` and
//! an immutable, append-only version history.

use chrono::Utc;
use modforge_core::delta::{SpecDelta, SpecVersion};
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::hash::canonical_hash;
use modforge_core::spec::ModSpec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One entry in a workspace's on-disk version history: the full spec
/// snapshot at that version, plus the metadata needed to reconstruct a
/// [`SpecVersion`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct HistoryEntry {
    version: u64,
    timestamp: chrono::DateTime<Utc>,
    content_hash: String,
    originating_delta: Option<SpecDelta>,
    notes: Option<String>,
    spec: ModSpec,
}

impl HistoryEntry {
    fn version_header(&self) -> SpecVersion {
        SpecVersion {
            version: self.version,
            timestamp: self.timestamp,
            content_hash: self.content_hash.clone(),
            originating_delta: self.originating_delta.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Holds exactly one current [`ModSpec`] per workspace and an immutable
/// history, persisted under `workspace/<id>/spec/` beneath `base_dir`.
///
/// Writes for a single workspace serialize under a per-workspace
/// [`tokio::sync::Mutex`]; different workspaces proceed fully concurrently.
pub struct SpecStore {
    base_dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl SpecStore {
    /// Create a store rooted at `base_dir`. Does not touch the filesystem
    /// until an operation is called.
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Establish version 1 for `workspace_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::SpecAlreadyExists`] if a spec already exists
    /// for this workspace.
    pub async fn initialize(&self, workspace_id: &str, seed_spec: ModSpec) -> Result<SpecVersion, ForgeError> {
        let guard = self.workspace_lock(workspace_id).await;
        let _hold = guard.lock().await;

        if self.current_path(workspace_id).exists() {
            return Err(ForgeError::SpecAlreadyExists {
                code: ErrorCode::SpecAlreadyExists,
                workspace_id: workspace_id.to_string(),
            });
        }

        let entry = self.build_entry(1, seed_spec, None, None)?;
        self.persist(workspace_id, &entry).await?;
        tracing::info!(workspace_id, version = 1, "spec store initialized");
        Ok(entry.version_header())
    }

    /// Apply one delta to the current spec, persist the result, and
    /// append a new version entry.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::NoCurrentSpec`] if the workspace has no spec
    /// yet, or any error the delta algebra / spec (re)validation raises.
    pub async fn apply_delta(
        &self,
        workspace_id: &str,
        delta: &SpecDelta,
    ) -> Result<(ModSpec, SpecVersion), ForgeError> {
        let guard = self.workspace_lock(workspace_id).await;
        let _hold = guard.lock().await;

        let current = self.read_current(workspace_id).await?;
        let mut value = serde_json::to_value(&current)?;
        modforge_delta::apply_delta(&mut value, delta)?;
        let new_spec = deserialize_spec(value, &delta.path)?;

        let next_version = self.latest_version_number(workspace_id).await? + 1;
        let entry = self.build_entry(next_version, new_spec.clone(), Some(delta.clone()), None)?;
        self.persist(workspace_id, &entry).await?;
        tracing::debug!(workspace_id, version = next_version, path = %delta.path, "delta applied");
        Ok((new_spec, entry.version_header()))
    }

    /// Expand `batch` against the current spec and apply each resulting
    /// path-based delta in order, producing one version per delta. Sugar
    /// only — see [`modforge_delta::expand_batch`].
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::apply_delta`]; on failure,
    /// whichever prefix of deltas already applied remains committed (this
    /// is not an atomic transaction across the whole batch).
    pub async fn apply_batch(
        &self,
        workspace_id: &str,
        batch: &modforge_core::delta::BatchDelta,
    ) -> Result<(ModSpec, SpecVersion), ForgeError> {
        let (current, _) = self.get_current(workspace_id).await?;
        let deltas = modforge_delta::expand_batch(batch, &current);
        let mut last = None;
        for delta in &deltas {
            last = Some(self.apply_delta(workspace_id, delta).await?);
        }
        last.ok_or_else(|| ForgeError::internal("batch delta expanded to zero operations"))
    }

    /// Fetch the current spec and its version number.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::NoCurrentSpec`] if the workspace has no spec.
    pub async fn get_current(&self, workspace_id: &str) -> Result<(ModSpec, u64), ForgeError> {
        let spec = self.read_current(workspace_id).await?;
        let version = self.latest_version_number(workspace_id).await?;
        Ok((spec, version))
    }

    /// Fetch the spec as it existed at version `n`.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::VersionNotFound`] if no such version exists.
    pub async fn get_version(&self, workspace_id: &str, n: u64) -> Result<ModSpec, ForgeError> {
        self.read_history_entry(workspace_id, n).await.map(|entry| entry.spec)
    }

    /// Load the spec at version `n` and write it as a new version;
    /// history is never deleted or rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`ForgeError::VersionNotFound`] if version `n` does not
    /// exist.
    pub async fn rollback(&self, workspace_id: &str, n: u64) -> Result<SpecVersion, ForgeError> {
        let guard = self.workspace_lock(workspace_id).await;
        let _hold = guard.lock().await;

        let target = self.read_history_entry(workspace_id, n).await?;
        let next_version = self.latest_version_number(workspace_id).await? + 1;
        let entry = self.build_entry(
            next_version,
            target.spec,
            None,
            Some(format!("rollback to version {n}")),
        )?;
        self.persist(workspace_id, &entry).await?;
        tracing::info!(workspace_id, version = next_version, rolled_back_to = n, "spec rolled back");
        Ok(entry.version_header())
    }

    // ── internals ────────────────────────────────────────────────────

    async fn workspace_lock(&self, workspace_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks
            .entry(workspace_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn spec_dir(&self, workspace_id: &str) -> PathBuf {
        self.base_dir.join("workspace").join(workspace_id).join("spec")
    }

    fn current_path(&self, workspace_id: &str) -> PathBuf {
        self.spec_dir(workspace_id).join("current.json")
    }

    fn history_dir(&self, workspace_id: &str) -> PathBuf {
        self.spec_dir(workspace_id).join("history")
    }

    fn history_path(&self, workspace_id: &str, version: u64) -> PathBuf {
        self.history_dir(workspace_id).join(format!("{version}.json"))
    }

    fn build_entry(
        &self,
        version: u64,
        spec: ModSpec,
        originating_delta: Option<SpecDelta>,
        notes: Option<String>,
    ) -> Result<HistoryEntry, ForgeError> {
        let content_hash = canonical_hash(&spec)?;
        Ok(HistoryEntry {
            version,
            timestamp: Utc::now(),
            content_hash,
            originating_delta,
            notes,
            spec,
        })
    }

    async fn persist(&self, workspace_id: &str, entry: &HistoryEntry) -> Result<(), ForgeError> {
        tokio::fs::create_dir_all(self.history_dir(workspace_id)).await?;
        write_json(&self.current_path(workspace_id), &entry.spec).await?;
        write_json(&self.history_path(workspace_id, entry.version), entry).await?;
        Ok(())
    }

    async fn read_current(&self, workspace_id: &str) -> Result<ModSpec, ForgeError> {
        read_json(&self.current_path(workspace_id))
            .await?
            .ok_or_else(|| ForgeError::NoCurrentSpec {
                code: ErrorCode::NoCurrentSpec,
                workspace_id: workspace_id.to_string(),
            })
    }

    async fn read_history_entry(&self, workspace_id: &str, version: u64) -> Result<HistoryEntry, ForgeError> {
        read_json(&self.history_path(workspace_id, version))
            .await?
            .ok_or_else(|| ForgeError::VersionNotFound {
                code: ErrorCode::VersionNotFound,
                workspace_id: workspace_id.to_string(),
                version,
            })
    }

    async fn latest_version_number(&self, workspace_id: &str) -> Result<u64, ForgeError> {
        let dir = self.history_dir(workspace_id);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(ForgeError::NoCurrentSpec {
                    code: ErrorCode::NoCurrentSpec,
                    workspace_id: workspace_id.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        };

        let mut max_version = 0u64;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(version) = parse_version_filename(&entry.path()) {
                max_version = max_version.max(version);
            }
        }
        if max_version == 0 {
            return Err(ForgeError::NoCurrentSpec {
                code: ErrorCode::NoCurrentSpec,
                workspace_id: workspace_id.to_string(),
            });
        }
        Ok(max_version)
    }
}

fn parse_version_filename(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse::<u64>().ok()
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ForgeError> {
    let bytes = serde_json::to_vec_pretty(value)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

async fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, ForgeError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Deserialize the post-delta JSON tree back into a typed [`ModSpec`],
/// which both validates its shape and normalizes enum leaves to their
/// canonical form (`ModSpec`'s enums accept legacy aliases on input but
/// always serialize canonically).
fn deserialize_spec(value: serde_json::Value, path: &str) -> Result<ModSpec, ForgeError> {
    serde_json::from_value(value).map_err(|source| {
        let message = source.to_string();
        if message.contains("unknown variant") {
            ForgeError::InvalidEnumValue {
                code: ErrorCode::InvalidEnumValue,
                enum_name: "spec enum".to_string(),
                value: message,
            }
        } else {
            ForgeError::PathTypeMismatch {
                code: ErrorCode::PathTypeMismatch,
                path: path.to_string(),
                expected: message,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_core::spec::ItemSpec;

    fn store() -> (SpecStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (SpecStore::new(dir.path()), dir)
    }

    #[tokio::test]
    async fn initialize_establishes_version_one() {
        let (store, _dir) = store();
        let version = store.initialize("ws-1", ModSpec::default()).await.unwrap();
        assert_eq!(version.version, 1);
        assert!(version.originating_delta.is_none());
    }

    #[tokio::test]
    async fn initialize_twice_fails() {
        let (store, _dir) = store();
        store.initialize("ws-1", ModSpec::default()).await.unwrap();
        let err = store.initialize("ws-1", ModSpec::default()).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::SpecAlreadyExists);
    }

    #[tokio::test]
    async fn apply_delta_without_current_spec_fails() {
        let (store, _dir) = store();
        let delta = SpecDelta::add("items[0]", serde_json::json!({"item_name": "x"}));
        let err = store.apply_delta("ws-1", &delta).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::NoCurrentSpec);
    }

    #[tokio::test]
    async fn apply_delta_increments_version_and_mutates_spec() {
        let (store, _dir) = store();
        store.initialize("ws-1", ModSpec::default()).await.unwrap();
        let delta = SpecDelta::add("items[0]", serde_json::json!({"item_name": "Ruby Sword"}));
        let (spec, version) = store.apply_delta("ws-1", &delta).await.unwrap();
        assert_eq!(version.version, 2);
        assert_eq!(spec.items.len(), 1);
        assert_eq!(spec.items[0].item_name.as_deref(), Some("Ruby Sword"));
    }

    #[tokio::test]
    async fn get_version_returns_historical_snapshot() {
        let (store, _dir) = store();
        store.initialize("ws-1", ModSpec::default()).await.unwrap();
        let delta = SpecDelta::add("items[0]", serde_json::json!({"item_name": "Ruby Sword"}));
        store.apply_delta("ws-1", &delta).await.unwrap();

        let v1 = store.get_version("ws-1", 1).await.unwrap();
        assert!(v1.items.is_empty());
    }

    #[tokio::test]
    async fn rollback_writes_a_new_version_without_deleting_history() {
        let (store, _dir) = store();
        store.initialize("ws-1", ModSpec::default()).await.unwrap();
        let delta = SpecDelta::add("items[0]", serde_json::json!({"item_name": "Ruby Sword"}));
        store.apply_delta("ws-1", &delta).await.unwrap();

        let rolled = store.rollback("ws-1", 1).await.unwrap();
        assert_eq!(rolled.version, 3);
        let (current, version) = store.get_current("ws-1").await.unwrap();
        assert_eq!(version, 3);
        assert!(current.items.is_empty());

        // version 2 (with the item) is still readable.
        let v2 = store.get_version("ws-1", 2).await.unwrap();
        assert_eq!(v2.items.len(), 1);
    }

    #[tokio::test]
    async fn enum_update_normalizes_legacy_alias_to_canonical_form() {
        let (store, _dir) = store();
        let mut seed = ModSpec::default();
        seed.items.push(ItemSpec::default());
        store.initialize("ws-1", seed).await.unwrap();

        let delta = SpecDelta::update("items[0].rarity", serde_json::json!("MYTHIC"));
        let (spec, _) = store.apply_delta("ws-1", &delta).await.unwrap();
        assert_eq!(spec.items[0].rarity, Some(modforge_core::spec::Rarity::Epic));

        let (_, version) = store.get_current("ws-1").await.unwrap();
        let raw = tokio::fs::read_to_string(store.current_path("ws-1")).await.unwrap();
        assert!(raw.contains("\"EPIC\""));
        assert!(!raw.contains("MYTHIC"));
        assert_eq!(version, 2);
    }
}
