//! Adapts [`EventBus`] to the Executor's [`modforge_executor::EventSink`]
//! boundary, binding a bus handle to one run for the Executor's lifetime.

use crate::log::EventBus;
use async_trait::async_trait;
use modforge_core::run::RunEventType;
use modforge_executor::EventSink;
use std::sync::Arc;
use uuid::Uuid;

/// Publishes every `task.started`/`task.finished` event the Executor
/// emits onto the bus under a fixed `run_id`.
pub struct BusEventSink {
    bus: Arc<EventBus>,
    run_id: Uuid,
}

impl BusEventSink {
    /// Bind `bus` to `run_id` for the duration of one run's execution.
    #[must_use]
    pub fn new(bus: Arc<EventBus>, run_id: Uuid) -> Self {
        Self { bus, run_id }
    }
}

#[async_trait]
impl EventSink for BusEventSink {
    async fn publish(&self, event_type: RunEventType, payload: serde_json::Value) {
        self.bus.publish(self.run_id, event_type, payload);
    }
}
