//! Parameter resolution: tool-declared parameters
//! intersected with (task inputs ∪ dispatched IR context).

use crate::registry::ParamSpec;
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::ir::ModIR;
use modforge_core::task::Task;
use serde_json::{Map, Value};

/// Flatten a [`ModIR`] into a JSON object so its fields (`mod_id`,
/// `items`, `assets`, …) are addressable by name alongside a task's own
/// params. Computed once per run and reused for every task.
#[must_use]
pub fn ir_context(ir: &ModIR) -> Map<String, Value> {
    match serde_json::to_value(ir) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Build the parameter map handed to a handler: the union of the task's
/// own bound params and the IR context, filtered down to the handler's
/// declared parameter names, failing if a required one is absent.
pub fn resolve_params(task: &Task, ir_ctx: &Map<String, Value>, spec: &ParamSpec) -> Result<Map<String, Value>, ForgeError> {
    let mut union = ir_ctx.clone();
    for (key, value) in &task.params {
        union.insert(key.clone(), value.clone());
    }

    let mut resolved = Map::new();
    for &name in &spec.declared {
        if let Some(value) = union.get(name) {
            resolved.insert(name.to_string(), value.clone());
        }
    }

    for &name in &spec.required {
        if !resolved.contains_key(name) {
            return Err(ForgeError::MissingParameter {
                code: ErrorCode::MissingParameter,
                task_id: task.id.clone(),
                parameter: name.to_string(),
            });
        }
    }

    Ok(resolved)
}
