//! Error types shared by the playback engine, the command ingress and the
//! catalog loader.

use thiserror::Error;

/// Failures reported by the playback engine.
///
/// None of these are fatal to the process: a failed command leaves the
/// session exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The audio resource for a track could not be created (missing file,
    /// undecodable data, ...).
    #[error("audio resource unavailable for {title:?}: {reason}")]
    ResourceUnavailable { title: String, reason: String },

    /// A playlist lookup fell outside `[0, len)`. Cyclic navigation never
    /// produces such an index.
    #[error("playlist index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },

    /// The audio output device could not be opened when the engine started.
    #[error("audio output unavailable: {0}")]
    OutputUnavailable(String),

    /// The engine has been torn down and no longer accepts commands.
    #[error("playback engine is shut down")]
    Shutdown,
}

/// Failures converting an untyped external value into a [`Command`](crate::audio::Command).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
}

/// Failures building the playlist at startup.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("no playable tracks found in {0}")]
    Empty(String),
}
