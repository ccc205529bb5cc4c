use super::*;
use crate::audio::{TelemetryEvent, TelemetrySnapshot, TransportState};
use crate::error::EngineError;
use crate::playlist::{Playlist, Track};
use std::sync::Arc;
use std::time::Duration;

fn app() -> App {
    let tracks = ["Alpha", "Beta", "Gamma"]
        .iter()
        .map(|t| Track::new(*t, format!("{t}.mp3")))
        .collect();
    let playlist = Arc::new(Playlist::new(tracks).unwrap());
    App::new(
        playlist,
        TelemetrySnapshot {
            title: "Alpha".into(),
            ..TelemetrySnapshot::default()
        },
    )
}

#[test]
fn telemetry_events_update_the_mirror() {
    let mut app = app();
    app.apply(TelemetryEvent::State(TransportState::Playing));
    app.apply(TelemetryEvent::Index(2));
    app.apply(TelemetryEvent::Title("Gamma".into()));
    app.apply(TelemetryEvent::Duration(Duration::from_secs(90)));
    app.apply(TelemetryEvent::Position(Duration::from_secs(30)));

    assert_eq!(app.state(), TransportState::Playing);
    assert!(app.is_current(2));
    assert!(!app.is_current(0));
    assert_eq!(app.telemetry.title, "Gamma");
    assert_eq!(app.time_label(), "0:30 / 1:30");
}

#[test]
fn playing_clears_a_stale_error() {
    let mut app = app();
    app.set_status("could not open Beta");
    app.apply(TelemetryEvent::State(TransportState::Paused));
    assert!(app.status.is_some());
    app.apply(TelemetryEvent::State(TransportState::Playing));
    assert!(app.status.is_none());
}

#[test]
fn progress_is_zero_without_duration_and_clamped_otherwise() {
    let mut app = app();
    app.apply(TelemetryEvent::Position(Duration::from_secs(10)));
    assert_eq!(app.progress_ratio(), 0.0);
    assert_eq!(app.time_label(), "0:10");

    app.apply(TelemetryEvent::Duration(Duration::from_secs(40)));
    assert!((app.progress_ratio() - 0.25).abs() < 1e-9);

    app.apply(TelemetryEvent::Position(Duration::from_secs(50)));
    assert_eq!(app.progress_ratio(), 1.0);
}

#[test]
fn glyph_follows_transport_state() {
    let mut app = app();
    assert_eq!(app.transport_glyph(), "■");
    app.apply(TelemetryEvent::State(TransportState::Playing));
    assert_eq!(app.transport_glyph(), "▶");
    app.apply(TelemetryEvent::State(TransportState::Paused));
    assert_eq!(app.transport_glyph(), "⏸");
    app.apply(TelemetryEvent::State(TransportState::Stopped));
    assert_eq!(app.transport_glyph(), "■");
}

#[test]
fn format_time_handles_hours() {
    assert_eq!(format_time(Duration::ZERO), "0:00");
    assert_eq!(format_time(Duration::from_secs(65)), "1:05");
    assert_eq!(format_time(Duration::from_secs(3725)), "1:02:05");
}

#[test]
fn command_outcome_sets_then_clears_the_status() {
    let mut app = app();
    app.record_outcome(&Err(EngineError::ResourceUnavailable {
        title: "Beta".into(),
        reason: "missing".into(),
    }));
    let status = app.status.clone().unwrap();
    assert!(status.contains("Beta"), "{status}");

    // A successful command that does not reach Playing (e.g. Stop) still clears it.
    app.record_outcome(&Ok(()));
    assert!(app.status.is_none());
}
