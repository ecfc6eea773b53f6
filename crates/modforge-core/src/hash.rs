//! Canonical SHA-256 content hashing.
//!
//! [`SpecVersion::content_hash`](crate::spec::SpecVersion) and
//! [`ModIR::fingerprint`](crate::ir::ModIR::fingerprint) both need a hash that
//! is stable across serialization order, since `serde_json::Value` object
//! keys otherwise preserve insertion order. We re-serialize through a
//! `BTreeMap` at every object level before hashing so two structurally equal
//! values always hash identically regardless of field order.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Serialize `value` and return the lowercase hex SHA-256 digest of its
/// canonical (key-sorted) JSON form.
///
/// # Errors
///
/// Returns a `serde_json::Error` if `value` cannot be serialized.
pub fn canonical_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let raw = serde_json::to_value(value)?;
    let canonical = canonicalize(&raw);
    let bytes = serde_json::to_vec(&canonical)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Recursively rebuild `value` with every object's keys sorted, so the
/// resulting JSON serializes deterministically.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), canonicalize(v)))
                .collect();
            let mut out = serde_json::Map::with_capacity(sorted.len());
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}
