//! Applies a [`SpecDelta`] to a `serde_json::Value` tree using the
//! [`JsonCursor`] path algebra.

use crate::path::{tokenize, JsonCursor, PathToken};
use modforge_core::delta::{DeltaOperation, SpecDelta};
use modforge_core::error::{ErrorCode, ForgeError};
use serde_json::Value;

/// Apply one delta to `root` in place.
///
/// # Errors
///
/// Returns `PathNotFound`/`PathTypeMismatch`/`IndexOutOfBounds` per the
/// path algebra's operation semantics. `root` is left unmodified on error:
/// every descent is validated before any mutation is made to the final
/// container.
pub fn apply_delta(root: &mut Value, delta: &SpecDelta) -> Result<(), ForgeError> {
    let tokens = tokenize(&delta.path);
    let Some((last, prefix)) = tokens.split_last() else {
        return Err(ForgeError::PathNotFound {
            code: ErrorCode::PathNotFound,
            path: delta.path.clone(),
        });
    };

    match delta.operation {
        DeltaOperation::Add => {
            let value = delta.value.clone().unwrap_or(Value::Null);
            // Validate the full descent (including the final step) before
            // mutating, so a failure partway through never leaves `root`
            // half-updated.
            precheck_add(root, prefix, last, &delta.path)?;
            let mut cursor = descend_prefix(root, prefix, true, last, &delta.path)?;
            add_leaf(&mut cursor, last, value, &delta.path)
        }
        DeltaOperation::Update => {
            let value = delta.value.clone().ok_or_else(|| ForgeError::PathNotFound {
                code: ErrorCode::PathNotFound,
                path: delta.path.clone(),
            })?;
            let mut cursor = descend_prefix(root, prefix, false, last, &delta.path)?;
            update_leaf(&mut cursor, last, value, &delta.path)
        }
        DeltaOperation::Remove => {
            let mut cursor = descend_prefix(root, prefix, false, last, &delta.path)?;
            remove_leaf(&mut cursor, last, &delta.path)
        }
    }
}

/// Descend through every token except the last, creating intermediate
/// containers only for `Add`.
fn descend_prefix<'a>(
    root: &'a mut Value,
    prefix: &[PathToken],
    create: bool,
    last: &PathToken,
    full_path: &str,
) -> Result<JsonCursor<'a>, ForgeError> {
    let mut cursor = JsonCursor::new(root);
    for (i, token) in prefix.iter().enumerate() {
        let next = prefix.get(i + 1).unwrap_or(last);
        cursor = cursor.descend(token, create, Some(next), full_path)?;
    }
    Ok(cursor)
}

/// Dry-run the whole path (prefix + final token) against a clone of the
/// tree so an `add` that would fail at the last step never mutates the
/// real tree first.
fn precheck_add(root: &Value, prefix: &[PathToken], last: &PathToken, full_path: &str) -> Result<(), ForgeError> {
    let mut scratch = root.clone();
    let mut cursor = descend_prefix(&mut scratch, prefix, true, last, full_path)?;
    add_leaf(&mut cursor, last, Value::Null, full_path)
}

fn add_leaf(cursor: &mut JsonCursor<'_>, last: &PathToken, value: Value, full_path: &str) -> Result<(), ForgeError> {
    // `descend` with `create = true` already performs the append/insert
    // bookkeeping for the final token; re-running it here with the real
    // value lands it in place.
    let mut leaf = cursor.descend(last, true, None, full_path)?;
    leaf.set_leaf(value);
    Ok(())
}

fn update_leaf(cursor: &mut JsonCursor<'_>, last: &PathToken, value: Value, full_path: &str) -> Result<(), ForgeError> {
    let mut leaf = cursor.descend(last, false, None, full_path)?;
    leaf.set_leaf(value);
    Ok(())
}

fn remove_leaf(cursor: &mut JsonCursor<'_>, last: &PathToken, full_path: &str) -> Result<(), ForgeError> {
    match last {
        PathToken::Key(key) => {
            let obj = cursor_as_object_mut(cursor, full_path)?;
            obj.remove(key).ok_or_else(|| ForgeError::PathNotFound {
                code: ErrorCode::PathNotFound,
                path: full_path.to_string(),
            })?;
            Ok(())
        }
        PathToken::Index(index) => {
            let arr = cursor_as_array_mut(cursor, full_path)?;
            if *index >= arr.len() {
                return Err(ForgeError::PathNotFound {
                    code: ErrorCode::PathNotFound,
                    path: full_path.to_string(),
                });
            }
            arr.remove(*index);
            Ok(())
        }
    }
}

fn cursor_as_object_mut<'a>(
    cursor: &'a mut JsonCursor<'_>,
    full_path: &str,
) -> Result<&'a mut serde_json::Map<String, Value>, ForgeError> {
    cursor
        .value_mut()
        .as_object_mut()
        .ok_or_else(|| ForgeError::PathTypeMismatch {
            code: ErrorCode::PathTypeMismatch,
            path: full_path.to_string(),
            expected: "object".to_string(),
        })
}

fn cursor_as_array_mut<'a>(cursor: &'a mut JsonCursor<'_>, full_path: &str) -> Result<&'a mut Vec<Value>, ForgeError> {
    cursor
        .value_mut()
        .as_array_mut()
        .ok_or_else(|| ForgeError::PathTypeMismatch {
            code: ErrorCode::PathTypeMismatch,
            path: full_path.to_string(),
            expected: "array".to_string(),
        })
}
