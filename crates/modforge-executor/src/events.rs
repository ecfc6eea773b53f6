//! The Executor's event-publishing boundary.
//!
//! The Executor only knows it needs to emit `task.started`/`task.finished`
//! records somewhere; it never constructs a `seq` or owns a subscriber
//! list. `modforge-bus`'s `EventBus` implements this trait in
//! `modforge-runtime`, where the two crates are wired together.

use async_trait::async_trait;
use modforge_core::run::RunEventType;
use serde_json::Value;

/// A sink the Executor publishes per-task lifecycle events through.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish one event for the run this sink is bound to.
    async fn publish(&self, event_type: RunEventType, payload: Value);
}

/// An [`EventSink`] that discards every event. Used by tests and by
/// callers that only care about the Executor's return value.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

#[async_trait]
impl EventSink for NoopEventSink {
    async fn publish(&self, _event_type: RunEventType, _payload: Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_sink_accepts_any_event() {
        let sink = NoopEventSink;
        sink.publish(RunEventType::TaskStarted, Value::Null).await;
    }
}
