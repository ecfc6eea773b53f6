//! Delta and version data types shared between `modforge-delta` (the path
//! algebra) and `modforge-store` (the version log).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The kind of edit a [`SpecDelta`] performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DeltaOperation {
    /// Insert a new value; at an array index equal to the array's current
    /// length this appends.
    Add,
    /// Overwrite an existing scalar; fails if the path does not exist.
    Update,
    /// Delete a key or array element; subsequent array indices shift.
    Remove,
}

/// A single, path-addressed edit to a [`crate::spec::ModSpec`].
///
/// Paths are dotted tokens with bracketed integers for array indices, e.g.
/// `items[0].rarity`. `value` is absent for `remove`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpecDelta {
    /// Which edit to perform.
    pub operation: DeltaOperation,
    /// Dotted/bracketed path identifying the target leaf or container.
    pub path: String,
    /// The value to write; absent (`None`) for `remove`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl SpecDelta {
    /// Build an `add` delta.
    #[must_use]
    pub fn add(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            operation: DeltaOperation::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    /// Build an `update` delta.
    #[must_use]
    pub fn update(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            operation: DeltaOperation::Update,
            path: path.into(),
            value: Some(value),
        }
    }

    /// Build a `remove` delta.
    #[must_use]
    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            operation: DeltaOperation::Remove,
            path: path.into(),
            value: None,
        }
    }
}

/// One entry in a workspace's append-only spec version log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpecVersion {
    /// Monotonically increasing integer, starting at 1.
    pub version: u64,
    /// When this version was recorded.
    pub timestamp: DateTime<Utc>,
    /// SHA-256 hex digest of the canonical serialization of the spec at
    /// this version (see [`crate::hash::canonical_hash`]).
    pub content_hash: String,
    /// The delta that produced this version; `None` for version 1
    /// (initialization).
    pub originating_delta: Option<SpecDelta>,
    /// Free-text annotation, e.g. set by `rollback`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Legacy batch-form delta: addresses elements by `(kind, index)` instead
/// of an explicit path. Accepted as sugar and translated into a sequence
/// of path-based [`SpecDelta`]s before application — the semantic contract
/// stays the path-based one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchDelta {
    /// Elements to append, grouped by spec sequence.
    pub adds: Vec<BatchAdd>,
    /// Elements to overwrite in place.
    pub updates: Vec<BatchUpdate>,
    /// Elements to delete.
    pub removes: Vec<BatchRemove>,
}

/// Which top-level sequence of [`crate::spec::ModSpec`] a batch operation
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SpecSequence {
    /// `ModSpec::items`.
    Items,
    /// `ModSpec::blocks`.
    Blocks,
    /// `ModSpec::tools`.
    Tools,
}

impl SpecSequence {
    /// The top-level field name this sequence maps to.
    #[must_use]
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Items => "items",
            Self::Blocks => "blocks",
            Self::Tools => "tools",
        }
    }
}

/// One element to append via [`BatchDelta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchAdd {
    /// Which sequence to append to.
    pub kind: SpecSequence,
    /// The element payload.
    pub value: serde_json::Value,
}

/// One element to overwrite via [`BatchDelta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchUpdate {
    /// Which sequence the element lives in.
    pub kind: SpecSequence,
    /// Its positional index.
    pub index: usize,
    /// The replacement payload.
    pub value: serde_json::Value,
}

/// One element to delete via [`BatchDelta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BatchRemove {
    /// Which sequence the element lives in.
    pub kind: SpecSequence,
    /// Its positional index.
    pub index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remove_delta_has_no_value() {
        let delta = SpecDelta::remove("items[0]");
        let json = serde_json::to_value(&delta).unwrap();
        assert!(json.get("value").is_none());
    }

    #[test]
    fn add_delta_round_trips() {
        let delta = SpecDelta::add("items[0]", json!({"item_name": "Ruby Sword"}));
        let s = serde_json::to_string(&delta).unwrap();
        let back: SpecDelta = serde_json::from_str(&s).unwrap();
        assert_eq!(delta, back);
    }

    #[test]
    fn spec_sequence_field_names() {
        assert_eq!(SpecSequence::Items.field_name(), "items");
        assert_eq!(SpecSequence::Blocks.field_name(), "blocks");
        assert_eq!(SpecSequence::Tools.field_name(), "tools");
    }
}
