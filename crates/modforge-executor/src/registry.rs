//! Typed registry mapping task `kind` strings to tool handlers.

use crate::handler::ToolHandler;
use std::collections::HashMap;
use std::sync::Arc;

/// The declared parameter names for one registered tool: `required` must
/// be present in the resolved parameter map or the task fails with
/// `MissingParameter`; `declared` is the full set the handler reads
/// (required ∪ optional) — anything outside it is filtered out of the
/// map the Executor builds before invoking the handler.
#[derive(Debug, Clone, Default)]
pub struct ParamSpec {
    /// Parameters that must be present.
    pub required: Vec<&'static str>,
    /// Every parameter the handler may read, including `required`.
    pub declared: Vec<&'static str>,
}

impl ParamSpec {
    /// Construct a spec where every declared parameter is required.
    #[must_use]
    pub fn all_required(names: &[&'static str]) -> Self {
        Self {
            required: names.to_vec(),
            declared: names.to_vec(),
        }
    }
}

struct Entry {
    handler: Arc<dyn ToolHandler>,
    params: ParamSpec,
}

/// A typed registry of named [`ToolHandler`] implementations.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Entry>,
}

impl ToolRegistry {
    /// Construct an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under its own `kind()`, replacing any previous
    /// entry for that kind.
    pub fn register(&mut self, handler: impl ToolHandler + 'static, params: ParamSpec) {
        let kind = handler.kind().to_string();
        self.handlers.insert(
            kind,
            Entry {
                handler: Arc::new(handler),
                params,
            },
        );
    }

    /// Look up a handler by task kind.
    #[must_use]
    pub fn get(&self, kind: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(kind).map(|e| Arc::clone(&e.handler))
    }

    /// Look up a registered handler's parameter spec.
    #[must_use]
    pub fn params_for(&self, kind: &str) -> Option<&ParamSpec> {
        self.handlers.get(kind).map(|e| &e.params)
    }

    /// Whether a handler is registered for `kind`.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    /// Sorted list of every registered task kind.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TaskContext;
    use async_trait::async_trait;
    use modforge_core::error::ForgeError;
    use serde_json::{Map, Value};

    struct Dummy;

    #[async_trait]
    impl ToolHandler for Dummy {
        fn kind(&self) -> &str {
            "dummy"
        }
        async fn invoke(&self, _ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
            Ok(Value::Null)
        }
    }

    #[test]
    fn register_and_lookup_round_trips() {
        let mut registry = ToolRegistry::new();
        registry.register(Dummy, ParamSpec::all_required(&["a"]));
        assert!(registry.contains("dummy"));
        assert!(registry.get("dummy").is_some());
        assert_eq!(registry.params_for("dummy").unwrap().required, vec!["a"]);
    }

    #[test]
    fn unknown_kind_is_absent() {
        let registry = ToolRegistry::new();
        assert!(!registry.contains("missing"));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn list_is_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(Dummy, ParamSpec::default());
        assert_eq!(registry.list(), vec!["dummy"]);
    }
}
