//! Decorates an [`EventSink`] so every `task.finished` event the Executor
//! publishes also advances the run's `run.progress`, interpolated over
//! tasks completed so far scaled into `[30, 95]` per the build-run
//! algorithm step 4.

use async_trait::async_trait;
use modforge_core::run::RunEventType;
use modforge_executor::EventSink;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PROGRESS_FLOOR: f64 = 30.0;
const PROGRESS_CEILING: f64 = 95.0;

/// Wraps an inner sink (normally [`modforge_bus::BusEventSink`]) and emits
/// an extra `run.progress` event after every `task.finished` it forwards.
pub struct ProgressTrackingSink {
    inner: Arc<dyn EventSink>,
    completed: AtomicUsize,
    total_tasks: usize,
}

impl ProgressTrackingSink {
    /// Wrap `inner`, tracking progress against `total_tasks` in the DAG.
    #[must_use]
    pub fn new(inner: Arc<dyn EventSink>, total_tasks: usize) -> Self {
        Self {
            inner,
            completed: AtomicUsize::new(0),
            total_tasks: total_tasks.max(1),
        }
    }
}

#[async_trait]
impl EventSink for ProgressTrackingSink {
    async fn publish(&self, event_type: RunEventType, payload: Value) {
        self.inner.publish(event_type, payload).await;
        if event_type == RunEventType::TaskFinished {
            let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
            let fraction = (done as f64 / self.total_tasks as f64).min(1.0);
            let progress = PROGRESS_FLOOR + fraction * (PROGRESS_CEILING - PROGRESS_FLOOR);
            self.inner
                .publish(RunEventType::RunProgress, json!({ "progress": progress.round() as u8 }))
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modforge_executor::NoopEventSink;
    use std::sync::Mutex;

    struct RecordingSink {
        events: Mutex<Vec<(RunEventType, Value)>>,
    }

    #[async_trait]
    impl EventSink for RecordingSink {
        async fn publish(&self, event_type: RunEventType, payload: Value) {
            self.events.lock().unwrap().push((event_type, payload));
        }
    }

    #[tokio::test]
    async fn progress_caps_at_ceiling_after_every_task_finishes() {
        let recorder = Arc::new(RecordingSink { events: Mutex::new(Vec::new()) });
        let sink = ProgressTrackingSink::new(recorder.clone(), 2);
        sink.publish(RunEventType::TaskFinished, json!({})).await;
        sink.publish(RunEventType::TaskFinished, json!({})).await;

        let events = recorder.events.lock().unwrap();
        let progress_events: Vec<_> = events.iter().filter(|(t, _)| *t == RunEventType::RunProgress).collect();
        assert_eq!(progress_events.len(), 2);
        assert_eq!(progress_events[1].1["progress"], json!(95));
    }

    #[tokio::test]
    async fn non_task_finished_events_do_not_emit_progress() {
        let noop: Arc<dyn EventSink> = Arc::new(NoopEventSink);
        let sink = ProgressTrackingSink::new(noop, 5);
        sink.publish(RunEventType::TaskStarted, json!({})).await;
    }
}
