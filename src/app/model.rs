//! Application model: what the TUI shows.
//!
//! `App` mirrors the engine's telemetry and carries the one-line status
//! message shown under the now-playing block. It never drives playback
//! itself; the runtime forwards commands to the engine.

use std::sync::Arc;
use std::time::Duration;

use crate::audio::{TelemetryEvent, TelemetrySnapshot, TransportState};
use crate::error::EngineError;
use crate::playlist::Playlist;

/// The main application model.
pub struct App {
    pub playlist: Arc<Playlist>,
    pub telemetry: TelemetrySnapshot,
    pub status: Option<String>,
    pub source: Option<String>,
}

impl App {
    /// Create a new `App` showing `playlist`, starting from `telemetry`.
    pub fn new(playlist: Arc<Playlist>, telemetry: TelemetrySnapshot) -> Self {
        Self {
            playlist,
            telemetry,
            status: None,
            source: None,
        }
    }

    /// Fold one telemetry event into the mirrored snapshot.
    pub fn apply(&mut self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::State(state) => {
                self.telemetry.state = state;
                // A successful transport change supersedes an old error.
                if state == TransportState::Playing {
                    self.status = None;
                }
            }
            TelemetryEvent::Index(index) => self.telemetry.index = index,
            TelemetryEvent::Title(title) => self.telemetry.title = title,
            TelemetryEvent::Position(position) => self.telemetry.position = position,
            TelemetryEvent::Duration(duration) => self.telemetry.duration = duration,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = Some(msg.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Show a command's error, or clear the last one once a command succeeds.
    pub fn record_outcome(&mut self, result: &Result<(), EngineError>) {
        match result {
            Ok(()) => self.clear_status(),
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Record where the playlist came from (directory or config).
    pub fn set_source(&mut self, source: String) {
        self.source = Some(source);
    }

    pub fn state(&self) -> TransportState {
        self.telemetry.state
    }

    /// Whether `index` is the selected track.
    pub fn is_current(&self, index: usize) -> bool {
        self.telemetry.index == index
    }

    /// Single-character transport indicator.
    pub fn transport_glyph(&self) -> &'static str {
        match self.telemetry.state {
            TransportState::Playing => "▶",
            TransportState::Paused => "⏸",
            TransportState::Idle | TransportState::Stopped => "■",
        }
    }

    /// Fraction of the track elapsed, in `0.0..=1.0`. Zero when the
    /// duration is unknown.
    pub fn progress_ratio(&self) -> f64 {
        let total = self.telemetry.duration.as_secs_f64();
        if total <= 0.0 {
            return 0.0;
        }
        (self.telemetry.position.as_secs_f64() / total).clamp(0.0, 1.0)
    }

    /// `mm:ss / mm:ss`, or just the elapsed time when the length is unknown.
    pub fn time_label(&self) -> String {
        let elapsed = format_time(self.telemetry.position);
        if self.telemetry.duration.is_zero() {
            elapsed
        } else {
            format!("{elapsed} / {}", format_time(self.telemetry.duration))
        }
    }
}

/// Format a duration as `m:ss`, or `h:mm:ss` past an hour.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    }
}
