//! Path tokenization and the `JsonCursor` tagged-union cursor over
//! `serde_json::Value`.
//!
//! Per the design note this implementation follows, dynamic JSON-path
//! traversal is done through a tagged-union cursor with explicit
//! `descend`/`set_leaf` methods rather than reflection or `dyn Any`.

use modforge_core::error::{ErrorCode, ForgeError};
use serde_json::{Map, Value};

/// One component of a tokenized delta path: either an object key or an
/// array index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathToken {
    /// A string object key.
    Key(String),
    /// An integer array index, from a bracketed `[n]` component.
    Index(usize),
}

/// Tokenize a dotted path with bracketed indices, e.g. `"items[0].rarity"`,
/// by substituting `[k]` with `.k` and splitting on `.`. A token that
/// parses entirely as an unsigned integer becomes an [`PathToken::Index`];
/// everything else becomes a [`PathToken::Key`].
#[must_use]
pub fn tokenize(path: &str) -> Vec<PathToken> {
    let substituted = path.replace('[', ".").replace(']', "");
    substituted
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.parse::<usize>() {
            Ok(i) => PathToken::Index(i),
            Err(_) => PathToken::Key(segment.to_string()),
        })
        .collect()
}

/// A mutable tagged-union cursor over one node of a `serde_json::Value`
/// tree.
pub struct JsonCursor<'a> {
    value: &'a mut Value,
}

impl<'a> JsonCursor<'a> {
    /// Wrap a mutable reference to a JSON value as a cursor rooted there.
    pub fn new(value: &'a mut Value) -> Self {
        Self { value }
    }

    /// Borrow the value this cursor currently points at.
    #[must_use]
    pub fn get(&self) -> &Value {
        self.value
    }

    /// Overwrite the value this cursor points at.
    pub fn set_leaf(&mut self, new_value: Value) {
        *self.value = new_value;
    }

    /// Mutably borrow the value this cursor points at, for callers that
    /// need direct container access (e.g. `remove`, which must distinguish
    /// "key absent" from "wrong container type").
    pub fn value_mut(&mut self) -> &mut Value {
        self.value
    }

    /// Move one token deeper.
    ///
    /// When `create` is `false`, the child addressed by `token` must
    /// already exist (as the right container type) or this returns
    /// `PathNotFound`/`PathTypeMismatch`.
    ///
    /// When `create` is `true` and the child is absent, a container is
    /// created by looking one token ahead (`next`): an upcoming
    /// [`PathToken::Index`] selects an array, an upcoming
    /// [`PathToken::Key`] selects an object, and no lookahead (`token`
    /// itself is the terminal path component) creates a `null` leaf
    /// placeholder, since the caller immediately overwrites it with
    /// `set_leaf`. Index tokens additionally append/insert per the `add`
    /// semantics: `index == len` appends, `index < len` inserts (shifting
    /// later elements), `index > len` fails with `IndexOutOfBounds`.
    pub fn descend(
        &mut self,
        token: &PathToken,
        create: bool,
        next: Option<&PathToken>,
        full_path: &str,
    ) -> Result<JsonCursor<'_>, ForgeError> {
        match token {
            PathToken::Key(key) => self.descend_key(key, create, next, full_path),
            PathToken::Index(index) => self.descend_index(*index, create, next, full_path),
        }
    }

    fn descend_key(
        &mut self,
        key: &str,
        create: bool,
        next: Option<&PathToken>,
        full_path: &str,
    ) -> Result<JsonCursor<'_>, ForgeError> {
        if self.value.is_null() && create {
            *self.value = Value::Object(Map::new());
        }
        let Some(obj) = self.value.as_object_mut() else {
            return Err(type_mismatch(full_path, "object"));
        };
        if !obj.contains_key(key) {
            if !create {
                return Err(not_found(full_path));
            }
            let container = new_container_for(next);
            obj.insert(key.to_string(), container);
        }
        Ok(JsonCursor::new(
            obj.get_mut(key).expect("key inserted or already present"),
        ))
    }

    fn descend_index(
        &mut self,
        index: usize,
        create: bool,
        next: Option<&PathToken>,
        full_path: &str,
    ) -> Result<JsonCursor<'_>, ForgeError> {
        if self.value.is_null() && create {
            *self.value = Value::Array(Vec::new());
        }
        let Some(arr) = self.value.as_array_mut() else {
            return Err(type_mismatch(full_path, "array"));
        };
        if index >= arr.len() {
            if !create {
                return Err(not_found(full_path));
            }
            if index > arr.len() {
                return Err(ForgeError::IndexOutOfBounds {
                    code: ErrorCode::IndexOutOfBounds,
                    path: full_path.to_string(),
                    index,
                    len: arr.len(),
                });
            }
            arr.push(new_container_for(next));
        }
        Ok(JsonCursor::new(&mut arr[index]))
    }
}

fn new_container_for(next: Option<&PathToken>) -> Value {
    match next {
        Some(PathToken::Index(_)) => Value::Array(Vec::new()),
        Some(PathToken::Key(_)) => Value::Object(Map::new()),
        // No lookahead means this is the terminal token itself; the
        // placeholder is overwritten immediately by `set_leaf`.
        None => Value::Null,
    }
}

fn not_found(path: &str) -> ForgeError {
    ForgeError::PathNotFound {
        code: ErrorCode::PathNotFound,
        path: path.to_string(),
    }
}

fn type_mismatch(path: &str, expected: &str) -> ForgeError {
    ForgeError::PathTypeMismatch {
        code: ErrorCode::PathTypeMismatch,
        path: path.to_string(),
        expected: expected.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_dotted_and_bracketed_path() {
        let tokens = tokenize("items[0].rarity");
        assert_eq!(
            tokens,
            vec![
                PathToken::Key("items".to_string()),
                PathToken::Index(0),
                PathToken::Key("rarity".to_string()),
            ]
        );
    }

    #[test]
    fn descend_without_create_fails_on_missing_key() {
        let mut value = serde_json::json!({});
        let mut cursor = JsonCursor::new(&mut value);
        let err = cursor
            .descend(&PathToken::Key("items".to_string()), false, None, "items")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::PathNotFound);
    }

    #[test]
    fn descend_with_create_builds_array_on_index_lookahead() {
        let mut value = serde_json::json!({});
        let mut cursor = JsonCursor::new(&mut value);
        let next = PathToken::Index(0);
        cursor
            .descend(&PathToken::Key("items".to_string()), true, Some(&next), "items[0]")
            .unwrap();
        assert!(value["items"].is_array());
    }

    #[test]
    fn descend_index_one_past_end_with_create_appends() {
        let mut value = serde_json::json!({"items": [1]});
        let mut cursor = JsonCursor::new(&mut value);
        cursor
            .descend(&PathToken::Key("items".to_string()), false, None, "items")
            .unwrap()
            .descend(&PathToken::Index(1), true, None, "items[1]")
            .unwrap();
        assert_eq!(value["items"], serde_json::json!([1, null]));
    }

    #[test]
    fn descend_index_two_past_end_fails() {
        let mut value = serde_json::json!({"items": [1]});
        let mut cursor = JsonCursor::new(&mut value);
        let err = cursor
            .descend(&PathToken::Key("items".to_string()), false, None, "items")
            .unwrap()
            .descend(&PathToken::Index(2), true, None, "items[2]")
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::IndexOutOfBounds);
    }
}
