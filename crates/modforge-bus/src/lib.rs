//! The per-run SSE event bus: an append-only event log with live
//! fan-out and late-join replay by sequence number.
//!
//! [`log::EventBus`] owns the log itself; [`sink::BusEventSink`] adapts it
//! to the narrow [`modforge_executor::EventSink`] boundary the Executor
//! publishes `task.started`/`task.finished` through, so the Executor never
//! depends on this crate directly.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod log;
pub mod sink;

pub use log::{EventBus, EventBusStats, RunSubscription};
pub use sink::BusEventSink;
