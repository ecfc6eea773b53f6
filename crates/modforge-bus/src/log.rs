//! The per-run event log: an append-only `Vec<RunEvent>` behind a per-run
//! `seq` mutex, paired with a `broadcast::Sender` for live tail delivery.
//!
//! A pure `tokio::sync::broadcast` channel cannot satisfy replay-by-`since`
//! once early events have been evicted from the ring buffer, so every run
//! additionally keeps its full history in `RunLog::events` until the run
//! is retired and its retention grace period elapses.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use modforge_core::run::{RunEvent, RunEventType};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

const DEFAULT_CHANNEL_CAPACITY: usize = 256;

struct RunLog {
    events: Vec<RunEvent>,
    next_seq: u64,
    retired_at: Option<DateTime<Utc>>,
}

struct RunLogHandle {
    state: Mutex<RunLog>,
    tx: broadcast::Sender<RunEvent>,
}

/// Snapshot of one run's event-log statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventBusStats {
    /// Total events retained for this run.
    pub event_count: usize,
    /// Live subscribers currently attached.
    pub active_subscribers: usize,
}

/// Owns every active run's event log, keyed by `run_id`.
pub struct EventBus {
    runs: Mutex<HashMap<Uuid, Arc<RunLogHandle>>>,
    retention_grace_secs: u64,
}

impl EventBus {
    /// Construct a bus whose retired runs are purged `retention_grace_secs`
    /// after [`EventBus::retire`] is called for them.
    #[must_use]
    pub fn new(retention_grace_secs: u64) -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
            retention_grace_secs,
        }
    }

    fn handle_for(&self, run_id: Uuid) -> Arc<RunLogHandle> {
        let mut runs = self.runs.lock().expect("event bus mutex poisoned");
        Arc::clone(runs.entry(run_id).or_insert_with(|| {
            Arc::new(RunLogHandle {
                state: Mutex::new(RunLog {
                    events: Vec::new(),
                    next_seq: 1,
                    retired_at: None,
                }),
                tx: broadcast::channel(DEFAULT_CHANNEL_CAPACITY).0,
            })
        }))
    }

    /// Assign the next `seq` for `run_id`, append the event to its log,
    /// and fan it out to live subscribers. Returns the sequenced event.
    pub fn publish(&self, run_id: Uuid, event_type: RunEventType, payload: serde_json::Value) -> RunEvent {
        let handle = self.handle_for(run_id);
        let event = {
            let mut state = handle.state.lock().expect("run log mutex poisoned");
            let seq = state.next_seq;
            state.next_seq += 1;
            let event = RunEvent {
                run_id,
                seq,
                event_type,
                payload,
                timestamp: Utc::now(),
            };
            state.events.push(event.clone());
            event
        };
        // No live subscribers is not an error; the event is still durable
        // in `state.events` for anyone who subscribes later with `since`.
        let _ = handle.tx.send(event.clone());
        event
    }

    /// Mark `run_id` as finished; its log is purged after the configured
    /// retention grace period elapses and [`EventBus::purge_expired`] is
    /// next called.
    pub fn retire(&self, run_id: Uuid) {
        if let Some(handle) = self.runs.lock().expect("event bus mutex poisoned").get(&run_id) {
            handle.state.lock().expect("run log mutex poisoned").retired_at = Some(Utc::now());
        }
    }

    /// Drop every retired run whose grace period has elapsed as of `now`.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        let grace = ChronoDuration::seconds(i64::try_from(self.retention_grace_secs).unwrap_or(i64::MAX));
        self.runs.lock().expect("event bus mutex poisoned").retain(|_, handle| {
            match handle.state.lock().expect("run log mutex poisoned").retired_at {
                Some(retired_at) => now - retired_at < grace,
                None => true,
            }
        });
    }

    /// Subscribe to `run_id`'s event stream starting after `since`: the
    /// backlog of already-published events with `seq > since` replays
    /// first, followed by live events as they're published.
    #[must_use]
    pub fn subscribe(&self, run_id: Uuid, since: u64) -> RunSubscription {
        let handle = self.handle_for(run_id);
        let (backlog, rx) = {
            let state = handle.state.lock().expect("run log mutex poisoned");
            let backlog: Vec<RunEvent> = state.events.iter().filter(|e| e.seq > since).cloned().collect();
            (backlog, handle.tx.subscribe())
        };
        RunSubscription {
            backlog: backlog.into_iter(),
            rx,
            last_seq: since,
        }
    }

    /// Snapshot statistics for `run_id`, if it has ever published an event.
    #[must_use]
    pub fn stats(&self, run_id: Uuid) -> Option<EventBusStats> {
        let runs = self.runs.lock().expect("event bus mutex poisoned");
        let handle = runs.get(&run_id)?;
        let state = handle.state.lock().expect("run log mutex poisoned");
        Some(EventBusStats {
            event_count: state.events.len(),
            active_subscribers: handle.tx.receiver_count(),
        })
    }
}

/// A live handle on one run's event stream: replays the backlog since
/// `since`, then yields newly-published events in `seq` order.
pub struct RunSubscription {
    backlog: std::vec::IntoIter<RunEvent>,
    rx: broadcast::Receiver<RunEvent>,
    last_seq: u64,
}

impl RunSubscription {
    /// Receive the next event, waiting asynchronously.
    ///
    /// Returns `None` once the run's sender is dropped, or if this
    /// subscriber lagged behind the live broadcast ring buffer — a slow
    /// subscriber is disconnected, not the run.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        if let Some(event) = self.backlog.next() {
            self.last_seq = event.seq;
            return Some(event);
        }
        loop {
            match self.rx.recv().await {
                Ok(event) if event.seq > self.last_seq => {
                    self.last_seq = event.seq;
                    return Some(event);
                }
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_) | broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn publish_assigns_strictly_increasing_seq_starting_at_one() {
        let bus = EventBus::new(3600);
        let run_id = Uuid::new_v4();
        let first = bus.publish(run_id, RunEventType::RunStatus, json!({}));
        let second = bus.publish(run_id, RunEventType::RunProgress, json!({}));
        assert_eq!(first.seq, 1);
        assert_eq!(second.seq, 2);
    }

    #[tokio::test]
    async fn subscriber_attached_before_publish_sees_live_events() {
        let bus = EventBus::new(3600);
        let run_id = Uuid::new_v4();
        let mut sub = bus.subscribe(run_id, 0);
        bus.publish(run_id, RunEventType::RunStatus, json!({ "state": "running" }));
        let event = sub.recv().await.unwrap();
        assert_eq!(event.seq, 1);
    }

    #[tokio::test]
    async fn late_subscriber_replays_backlog_since_given_seq() {
        let bus = EventBus::new(3600);
        let run_id = Uuid::new_v4();
        bus.publish(run_id, RunEventType::RunStatus, json!({}));
        bus.publish(run_id, RunEventType::RunProgress, json!({}));
        bus.publish(run_id, RunEventType::LogAppend, json!({}));

        let mut sub = bus.subscribe(run_id, 1);
        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();
        assert_eq!(first.seq, 2);
        assert_eq!(second.seq, 3);
    }

    #[tokio::test]
    async fn backlog_and_live_events_deliver_without_gaps_or_duplicates() {
        let bus = EventBus::new(3600);
        let run_id = Uuid::new_v4();
        bus.publish(run_id, RunEventType::RunStatus, json!({}));

        let mut sub = bus.subscribe(run_id, 0);
        bus.publish(run_id, RunEventType::RunProgress, json!({}));

        let mut seqs = Vec::new();
        for _ in 0..2 {
            seqs.push(sub.recv().await.unwrap().seq);
        }
        assert_eq!(seqs, vec![1, 2]);
    }

    #[test]
    fn retired_run_is_purged_after_grace_period_elapses() {
        let bus = EventBus::new(60);
        let run_id = Uuid::new_v4();
        bus.publish(run_id, RunEventType::RunStatus, json!({}));
        bus.retire(run_id);

        bus.purge_expired(Utc::now());
        assert!(bus.stats(run_id).is_some(), "should survive before grace period elapses");

        bus.purge_expired(Utc::now() + ChronoDuration::seconds(61));
        assert!(bus.stats(run_id).is_none(), "should be purged after grace period elapses");
    }

    #[test]
    fn non_retired_run_is_never_purged() {
        let bus = EventBus::new(1);
        let run_id = Uuid::new_v4();
        bus.publish(run_id, RunEventType::RunStatus, json!({}));
        bus.purge_expired(Utc::now() + ChronoDuration::seconds(1000));
        assert!(bus.stats(run_id).is_some());
    }

    #[test]
    fn stats_reports_event_count_and_subscriber_count() {
        let bus = EventBus::new(3600);
        let run_id = Uuid::new_v4();
        bus.publish(run_id, RunEventType::RunStatus, json!({}));
        let _sub = bus.subscribe(run_id, 0);
        let stats = bus.stats(run_id).unwrap();
        assert_eq!(stats.event_count, 1);
        assert_eq!(stats.active_subscribers, 1);
    }
}
