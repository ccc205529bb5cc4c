//! Playback engine: the transport state machine, the audio resource
//! capability it drives, and the telemetry it publishes.
//!
//! The engine runs on its own thread and owns the session exclusively.
//! Everything else talks to it through [`PlaybackEngine`], either with
//! fire-and-forget [`Command`]s or with request/reply calls that report
//! [`EngineError`](crate::error::EngineError)s.

mod command;
mod engine;
mod player;
mod poller;
mod resource;
mod sink;
mod telemetry;
mod thread;
mod types;

pub use command::Command;
pub use player::PlaybackEngine;
pub use telemetry::{TelemetryEvent, TelemetrySnapshot};
pub use types::TransportState;

#[cfg(test)]
mod testing;
