//! The task DAG shared between the Planner (producer) and Executor
//! (consumer).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Lifecycle state of a single [`Task`] within one run. Never restarts
/// within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting on one or more dependencies.
    Pending,
    /// Every dependency has succeeded; eligible for dispatch.
    Ready,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Succeeded,
    /// Completed with a failure.
    Failed,
}

/// A single node in a [`TaskDAG`], bound to a tool handler by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Task {
    /// Stable identifier, unique within the DAG.
    pub id: String,
    /// Names the tool handler this task dispatches to, e.g.
    /// `"generate_texture"`.
    pub kind: String,
    /// Ids of tasks that must reach `Succeeded` before this task becomes
    /// `Ready`.
    pub depends_on: Vec<String>,
    /// Whether this task may run concurrently with sibling tasks in the
    /// same READY batch.
    pub parallelizable: bool,
    /// Higher values are dispatched first within the READY set.
    pub priority: i32,
    /// Parameters bound by the Planner; resolved against tool-declared
    /// parameters at dispatch time.
    pub params: serde_json::Map<String, serde_json::Value>,
    /// Current lifecycle state.
    pub status: TaskStatus,
}

impl Task {
    /// Construct a new task in the `Pending` state.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        depends_on: Vec<String>,
        parallelizable: bool,
        priority: i32,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            depends_on,
            parallelizable,
            priority,
            params: serde_json::Map::new(),
            status: TaskStatus::Pending,
        }
    }

    /// Builder-style setter for `params`.
    #[must_use]
    pub fn with_params(mut self, params: serde_json::Map<String, serde_json::Value>) -> Self {
        self.params = params;
        self
    }
}

/// The full set of tasks produced by the Planner for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaskDAG {
    /// Every task, in Planner emission order.
    pub tasks: Vec<Task>,
}

impl TaskDAG {
    /// Construct a DAG from a flat task list.
    #[must_use]
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Tasks with no dependencies (the entry set). The Planner's phase
    /// table produces exactly one: `setup_workspace`.
    #[must_use]
    pub fn entry_tasks(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.depends_on.is_empty()).collect()
    }

    /// Tasks no other task depends on (the terminal set). The Planner's
    /// phase table produces exactly one: `build`.
    #[must_use]
    pub fn terminal_tasks(&self) -> Vec<&Task> {
        let depended_on: HashSet<&str> = self
            .tasks
            .iter()
            .flat_map(|t| t.depends_on.iter().map(String::as_str))
            .collect();
        self.tasks
            .iter()
            .filter(|t| !depended_on.contains(t.id.as_str()))
            .collect()
    }

    /// Look up a task by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Mutable look up a task by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// The set of tasks whose dependencies have all reached `Succeeded`
    /// and which are not themselves already dispatched or terminal.
    #[must_use]
    pub fn ready_set(&self) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Pending || t.status == TaskStatus::Ready)
            .filter(|t| {
                t.depends_on.iter().all(|dep_id| {
                    self.get(dep_id)
                        .map(|dep| dep.status == TaskStatus::Succeeded)
                        .unwrap_or(false)
                })
            })
            .collect()
    }

    /// Count of tasks that reached `Succeeded`.
    #[must_use]
    pub fn succeeded_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status == TaskStatus::Succeeded).count()
    }

    /// Count of tasks that reached `Failed`.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.status == TaskStatus::Failed).count()
    }

    /// Whether every task is reachable from some entry task by following
    /// `depends_on` edges in reverse, and the dependency graph is acyclic.
    /// Used by the Planner's own self-check and by deadlock diagnostics.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        let ids: HashSet<&str> = self.tasks.iter().map(|t| t.id.as_str()).collect();
        for task in &self.tasks {
            for dep in &task.depends_on {
                if !ids.contains(dep.as_str()) {
                    return false;
                }
            }
        }
        self.acyclic() && self.all_reachable_from_entries()
    }

    fn acyclic(&self) -> bool {
        // Kahn's algorithm: a DAG admits a full topological ordering.
        let mut indegree: std::collections::HashMap<&str, usize> = self
            .tasks
            .iter()
            .map(|t| (t.id.as_str(), t.depends_on.len()))
            .collect();
        let mut dependents: std::collections::HashMap<&str, Vec<&str>> = std::collections::HashMap::new();
        for task in &self.tasks {
            for dep in &task.depends_on {
                dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
            }
        }
        let mut queue: VecDeque<&str> = indegree
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut visited = 0usize;
        while let Some(id) = queue.pop_front() {
            visited += 1;
            if let Some(children) = dependents.get(id) {
                for child in children {
                    if let Some(deg) = indegree.get_mut(child) {
                        *deg -= 1;
                        if *deg == 0 {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }
        visited == self.tasks.len()
    }

    fn all_reachable_from_entries(&self) -> bool {
        let mut dependents: std::collections::HashMap<&str, Vec<&str>> = std::collections::HashMap::new();
        for task in &self.tasks {
            for dep in &task.depends_on {
                dependents.entry(dep.as_str()).or_default().push(task.id.as_str());
            }
        }
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = self.entry_tasks().iter().map(|t| t.id.as_str()).collect();
        while let Some(id) = queue.pop_front() {
            if !visited.insert(id) {
                continue;
            }
            if let Some(children) = dependents.get(id) {
                for child in children {
                    queue.push_back(child);
                }
            }
        }
        visited.len() == self.tasks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_dag() -> TaskDAG {
        TaskDAG::new(vec![
            Task::new("a", "setup_workspace", vec![], false, 100),
            Task::new("b", "generate_code", vec!["a".to_string()], false, 60),
            Task::new("c", "build", vec!["b".to_string()], false, 10),
        ])
    }

    #[test]
    fn entry_and_terminal_sets_are_singletons() {
        let dag = linear_dag();
        assert_eq!(dag.entry_tasks().len(), 1);
        assert_eq!(dag.entry_tasks()[0].id, "a");
        assert_eq!(dag.terminal_tasks().len(), 1);
        assert_eq!(dag.terminal_tasks()[0].id, "c");
    }

    #[test]
    fn well_formed_dag_passes_check() {
        assert!(linear_dag().is_well_formed());
    }

    #[test]
    fn cycle_is_detected_as_not_well_formed() {
        let mut dag = linear_dag();
        dag.get_mut("a").unwrap().depends_on.push("c".to_string());
        assert!(!dag.is_well_formed());
    }

    #[test]
    fn ready_set_advances_as_dependencies_succeed() {
        let mut dag = linear_dag();
        assert_eq!(dag.ready_set().iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
        dag.get_mut("a").unwrap().status = TaskStatus::Succeeded;
        assert_eq!(dag.ready_set().iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
    }
}
