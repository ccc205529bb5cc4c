//! Last-value telemetry cell plus change broadcast.
//!
//! The engine thread is the only writer. Readers either poll the shared
//! snapshot (what the UI does every frame) or subscribe to change events.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::types::TransportState;

/// Current session telemetry as seen by renderers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TelemetrySnapshot {
    pub state: TransportState,
    /// Index of the selected track in the playlist.
    pub index: usize,
    pub title: String,
    pub position: Duration,
    pub duration: Duration,
}

/// A single changed telemetry value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TelemetryEvent {
    /// Transport state changed; renderers pick their play/pause affordance from this.
    State(TransportState),
    Index(usize),
    Title(String),
    Position(Duration),
    Duration(Duration),
}

type TelemetryHandle = Arc<Mutex<TelemetrySnapshot>>;

#[derive(Clone)]
pub(super) struct Telemetry {
    snapshot: TelemetryHandle,
    subscribers: Arc<Mutex<Vec<Sender<TelemetryEvent>>>>,
}

impl Telemetry {
    pub(super) fn new(initial: TelemetrySnapshot) -> Self {
        Self {
            snapshot: Arc::new(Mutex::new(initial)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(super) fn snapshot(&self) -> TelemetrySnapshot {
        self.snapshot
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub(super) fn subscribe(&self) -> Receiver<TelemetryEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    pub(super) fn set_state(&self, state: TransportState) {
        self.update(|s| {
            (s.state != state).then(|| {
                s.state = state;
                TelemetryEvent::State(state)
            })
        });
    }

    pub(super) fn set_index(&self, index: usize) {
        self.update(|s| {
            (s.index != index).then(|| {
                s.index = index;
                TelemetryEvent::Index(index)
            })
        });
    }

    pub(super) fn set_title(&self, title: &str) {
        self.update(|s| {
            (s.title != title).then(|| {
                s.title = title.to_string();
                TelemetryEvent::Title(title.to_string())
            })
        });
    }

    pub(super) fn set_position(&self, position: Duration) {
        self.update(|s| {
            (s.position != position).then(|| {
                s.position = position;
                TelemetryEvent::Position(position)
            })
        });
    }

    pub(super) fn set_duration(&self, duration: Duration) {
        self.update(|s| {
            (s.duration != duration).then(|| {
                s.duration = duration;
                TelemetryEvent::Duration(duration)
            })
        });
    }

    fn update(&self, apply: impl FnOnce(&mut TelemetrySnapshot) -> Option<TelemetryEvent>) {
        let event = match self.snapshot.lock() {
            Ok(mut s) => apply(&mut s),
            Err(poisoned) => apply(&mut poisoned.into_inner()),
        };
        if let Some(event) = event {
            self.broadcast(event);
        }
    }

    fn broadcast(&self, event: TelemetryEvent) {
        if let Ok(mut subs) = self.subscribers.lock() {
            // Drop subscribers whose receiver is gone.
            subs.retain(|tx| tx.send(event.clone()).is_ok());
        }
    }
}
