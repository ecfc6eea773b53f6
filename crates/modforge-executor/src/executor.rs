//! The DAG scheduling loop: a five-step scheduling algorithm plus the
//! fail-fast/deadlock/cancellation policy.

use crate::context::RunContext;
use crate::params::{ir_context, resolve_params};
use crate::registry::ToolRegistry;
use modforge_core::config::ForgeConfig;
use modforge_core::error::{ErrorCode, ForgeError};
use modforge_core::ir::ModIR;
use modforge_core::run::RunEventType;
use modforge_core::task::{TaskDAG, TaskStatus};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The terminal outcome of driving one DAG to completion (or not).
pub enum ExecutionOutcome {
    /// Every task succeeded; carries each task's output keyed by task id.
    Completed(HashMap<String, Value>),
    /// A task failed, the DAG deadlocked, or an unknown task kind was
    /// dispatched. Carries the first failure's cause.
    Failed(ForgeError),
    /// The run was cancelled before the DAG finished.
    Canceled,
}

/// Drives a [`TaskDAG`] to completion against a registered [`ToolRegistry`].
pub struct Executor {
    registry: ToolRegistry,
    config: ForgeConfig,
}

impl Executor {
    /// Construct an executor bound to a tool registry and the operator
    /// configuration governing fan-out and timeouts.
    #[must_use]
    pub fn new(registry: ToolRegistry, config: ForgeConfig) -> Self {
        Self { registry, config }
    }

    /// Run `dag` to completion (or failure/cancellation) for the given IR
    /// and run context. Mutates `dag`'s task statuses in place.
    pub async fn execute(&self, ir: &ModIR, dag: &mut TaskDAG, run: RunContext) -> ExecutionOutcome {
        let ir_ctx = ir_context(ir);
        let mut outputs: HashMap<String, Value> = HashMap::new();
        let fan_out_limit = self.config.fan_out_limit.max(1);

        loop {
            if dag.tasks.iter().all(|t| t.status == TaskStatus::Succeeded) {
                return ExecutionOutcome::Completed(outputs);
            }
            if run.cancellation.is_cancelled() {
                info!(run_id = %run.run_id, "execution cancelled before next dispatch");
                return ExecutionOutcome::Canceled;
            }

            let ready_ids: Vec<String> = {
                let mut ready = dag.ready_set();
                ready.sort_by(|a, b| b.priority.cmp(&a.priority));
                ready.into_iter().map(|t| t.id.clone()).collect()
            };

            if ready_ids.is_empty() {
                let pending = dag
                    .tasks
                    .iter()
                    .filter(|t| !matches!(t.status, TaskStatus::Succeeded | TaskStatus::Failed))
                    .count();
                if pending > 0 {
                    warn!(run_id = %run.run_id, pending, "execution deadlocked: no ready tasks with pending work remaining");
                    return ExecutionOutcome::Failed(ForgeError::ExecutionDeadlock {
                        code: ErrorCode::ExecutionDeadlock,
                        pending,
                    });
                }
                return ExecutionOutcome::Completed(outputs);
            }

            let batch_ids = self.next_batch(&ready_ids, dag, fan_out_limit);
            for id in &batch_ids {
                dag.get_mut(id).expect("batch id exists").status = TaskStatus::Running;
            }

            debug!(run_id = %run.run_id, batch = ?batch_ids, "dispatching batch");

            let mut handles = Vec::with_capacity(batch_ids.len());
            for id in &batch_ids {
                let task = dag.get(id).expect("batch id exists").clone();
                let handler = match self.registry.get(&task.kind) {
                    Some(handler) => handler,
                    None => {
                        return ExecutionOutcome::Failed(ForgeError::UnknownTaskKind {
                            code: ErrorCode::UnknownTaskKind,
                            kind: task.kind.clone(),
                        })
                    }
                };
                let spec = self.registry.params_for(&task.kind).cloned().unwrap_or_default();
                let params = match resolve_params(&task, &ir_ctx, &spec) {
                    Ok(params) => params,
                    Err(err) => return ExecutionOutcome::Failed(err),
                };

                let task_ctx = run.for_task(task.id.clone());
                let sink = run.sink.clone();
                let timeout = timeout_for(&task.kind, &self.config);
                let task_id = task.id.clone();
                let kind = task.kind.clone();

                handles.push(tokio::spawn(async move {
                    sink.publish(RunEventType::TaskStarted, json!({ "task_id": task_id, "kind": kind })).await;
                    let started = Instant::now();
                    let outcome = tokio::time::timeout(timeout, handler.invoke(&task_ctx, params)).await;
                    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                    let result = match outcome {
                        Ok(invoke_result) => invoke_result,
                        Err(_) => Err(ForgeError::Timeout {
                            code: ErrorCode::Timeout,
                            task_id: task_id.clone(),
                            elapsed_ms: duration_ms,
                        }),
                    };
                    sink.publish(
                        RunEventType::TaskFinished,
                        json!({ "task_id": task_id, "kind": kind, "duration_ms": duration_ms }),
                    )
                    .await;
                    (task_id, result)
                }));
            }

            let mut first_failure = None;
            for handle in handles {
                let (task_id, result) = match handle.await {
                    Ok(pair) => pair,
                    Err(join_err) => return ExecutionOutcome::Failed(ForgeError::internal(format!("task panicked: {join_err}"))),
                };
                match result {
                    Ok(value) => {
                        dag.get_mut(&task_id).expect("dispatched task exists").status = TaskStatus::Succeeded;
                        outputs.insert(task_id, value);
                    }
                    Err(err) => {
                        dag.get_mut(&task_id).expect("dispatched task exists").status = TaskStatus::Failed;
                        if first_failure.is_none() {
                            first_failure = Some(err);
                        }
                    }
                }
            }

            if let Some(err) = first_failure {
                warn!(run_id = %run.run_id, "task failure, no further tasks will be dispatched");
                return ExecutionOutcome::Failed(err);
            }
        }
    }

    /// Select the next batch from the (already priority-sorted) READY
    /// list: either a single non-parallelizable task, or a leading run of
    /// parallelizable tasks up to `fan_out_limit`.
    fn next_batch(&self, ready_ids: &[String], dag: &TaskDAG, fan_out_limit: usize) -> Vec<String> {
        let mut batch = Vec::new();
        for id in ready_ids {
            let task = dag.get(id).expect("ready id exists");
            if batch.is_empty() {
                batch.push(id.clone());
                if !task.parallelizable {
                    break;
                }
                continue;
            }
            if task.parallelizable && batch.len() < fan_out_limit {
                batch.push(id.clone());
            } else {
                break;
            }
        }
        batch
    }
}

fn timeout_for(kind: &str, config: &ForgeConfig) -> Duration {
    let secs = match kind {
        "build" => config.build_timeout_secs,
        "generate_texture" => config.texture_timeout_secs,
        _ => config.default_task_timeout_secs,
    };
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::context::TaskContext;
    use crate::events::NoopEventSink;
    use crate::handler::ToolHandler;
    use crate::registry::ParamSpec;
    use async_trait::async_trait;
    use chrono::Utc;
    use modforge_core::config::{Loader, Mapping};
    use modforge_core::task::Task;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use uuid::Uuid;

    fn sample_ir() -> ModIR {
        ModIR {
            mod_id: "examplemod".to_string(),
            base_package: "com.example.examplemod".to_string(),
            main_class: "ExamplemodMod".to_string(),
            mod_version: "1.0.0".to_string(),
            minecraft_version: "1.21.1".to_string(),
            loader: Loader::Fabric,
            mapping: Mapping::Official,
            items: vec![],
            blocks: vec![],
            tools: vec![],
            recipes: vec![],
            assets: vec![],
            compiled_at: Utc::now(),
            source_spec_version: 1,
        }
    }

    fn run_context() -> RunContext {
        RunContext {
            run_id: Uuid::new_v4(),
            workspace_dir: std::env::temp_dir(),
            cancellation: CancellationToken::new(),
            sink: Arc::new(NoopEventSink),
        }
    }

    struct AlwaysSucceeds;
    #[async_trait]
    impl ToolHandler for AlwaysSucceeds {
        fn kind(&self) -> &str {
            "noop"
        }
        async fn invoke(&self, _ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
            Ok(json!("ok"))
        }
    }

    struct AlwaysFails;
    #[async_trait]
    impl ToolHandler for AlwaysFails {
        fn kind(&self) -> &str {
            "noop_fail"
        }
        async fn invoke(&self, ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
            Err(ForgeError::ToolFailure {
                code: ErrorCode::ToolFailure,
                task_id: ctx.task_id.clone(),
                reason: "boom".to_string(),
            })
        }
    }

    struct CountingHandler {
        calls: Arc<AtomicUsize>,
    }
    #[async_trait]
    impl ToolHandler for CountingHandler {
        fn kind(&self) -> &str {
            "noop"
        }
        async fn invoke(&self, _ctx: &TaskContext, _params: Map<String, Value>) -> Result<Value, ForgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!("ok"))
        }
    }

    fn single_task_dag(kind: &str) -> TaskDAG {
        TaskDAG::new(vec![Task::new("only", kind, vec![], false, 100)])
    }

    #[tokio::test]
    async fn completes_a_single_task_dag() {
        let mut registry = ToolRegistry::new();
        registry.register(AlwaysSucceeds, ParamSpec::default());
        let executor = Executor::new(registry, ForgeConfig::default());
        let mut dag = single_task_dag("noop");

        match executor.execute(&sample_ir(), &mut dag, run_context()).await {
            ExecutionOutcome::Completed(outputs) => assert_eq!(outputs["only"], json!("ok")),
            _ => panic!("expected completion"),
        }
        assert_eq!(dag.succeeded_count(), 1);
    }

    #[tokio::test]
    async fn unknown_task_kind_fails_with_unknown_task_kind() {
        let executor = Executor::new(ToolRegistry::new(), ForgeConfig::default());
        let mut dag = single_task_dag("nonexistent");

        match executor.execute(&sample_ir(), &mut dag, run_context()).await {
            ExecutionOutcome::Failed(err) => assert_eq!(err.code(), ErrorCode::UnknownTaskKind),
            _ => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn task_failure_fails_the_whole_run() {
        let mut registry = ToolRegistry::new();
        registry.register(AlwaysFails, ParamSpec::default());
        let executor = Executor::new(registry, ForgeConfig::default());
        let mut dag = single_task_dag("noop_fail");

        match executor.execute(&sample_ir(), &mut dag, run_context()).await {
            ExecutionOutcome::Failed(err) => assert_eq!(err.code(), ErrorCode::ToolFailure),
            _ => panic!("expected failure"),
        }
        assert_eq!(dag.failed_count(), 1);
    }

    #[tokio::test]
    async fn already_cancelled_run_returns_canceled_without_dispatch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(CountingHandler { calls: Arc::clone(&calls) }, ParamSpec::default());
        let executor = Executor::new(registry, ForgeConfig::default());
        let mut dag = single_task_dag("noop");

        let mut run = run_context();
        run.cancellation.cancel();

        match executor.execute(&sample_ir(), &mut dag, run).await {
            ExecutionOutcome::Canceled => {}
            _ => panic!("expected cancellation"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn deadlocked_dag_fails_with_execution_deadlock() {
        let executor = Executor::new(ToolRegistry::new(), ForgeConfig::default());
        // Two tasks that depend on each other: never enters the READY set.
        let mut dag = TaskDAG::new(vec![
            Task::new("a", "noop", vec!["b".to_string()], false, 100),
            Task::new("b", "noop", vec!["a".to_string()], false, 100),
        ]);

        match executor.execute(&sample_ir(), &mut dag, run_context()).await {
            ExecutionOutcome::Failed(err) => assert_eq!(err.code(), ErrorCode::ExecutionDeadlock),
            _ => panic!("expected deadlock"),
        }
    }

    #[tokio::test]
    async fn parallelizable_batch_respects_fan_out_limit() {
        let mut registry = ToolRegistry::new();
        registry.register(AlwaysSucceeds, ParamSpec::default());
        let mut config = ForgeConfig::default();
        config.fan_out_limit = 2;
        let executor = Executor::new(registry, config);

        let mut dag = TaskDAG::new(vec![
            Task::new("t1", "noop", vec![], true, 10),
            Task::new("t2", "noop", vec![], true, 10),
            Task::new("t3", "noop", vec![], true, 10),
        ]);
        let ready: Vec<String> = dag.ready_set().iter().map(|t| t.id.clone()).collect();
        let batch = executor.next_batch(&ready, &dag, 2);
        assert_eq!(batch.len(), 2);
    }
}
