//! Small shared types for the audio subsystem.

use std::fmt;
use std::sync::mpsc::Sender;

use crate::error::EngineError;

use super::command::Command;

/// Coarse playback mode of the session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum TransportState {
    /// No `Play` has been issued yet.
    #[default]
    Idle,
    Playing,
    Paused,
    Stopped,
}

impl TransportState {
    /// Whether the session owns a live audio resource in this state.
    pub fn holds_resource(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for TransportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "Idle",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
        };
        f.write_str(s)
    }
}

pub(super) type Reply<T> = Sender<T>;

/// Messages processed by the engine thread, one at a time.
#[derive(Debug)]
pub(super) enum EngineMsg {
    /// A transport command, optionally with a reply channel for the outcome.
    Command {
        command: Command,
        reply: Option<Reply<Result<(), EngineError>>>,
    },
    /// The resource installed as `generation` finished on its own.
    Completed { generation: u64 },
    /// Poller wake-up: sample the position.
    Tick,
    /// Tear down the session and exit the thread.
    Shutdown { reply: Reply<()> },
}
