use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Transport commands accepted by the engine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start from Idle/Stopped, pause when Playing, resume when Paused.
    Play,
    /// Stop and release the current resource.
    Stop,
    /// Skip to the next track (wraps).
    Next,
    /// Go to the previous track (wraps).
    Previous,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "play" | "play-pause" | "toggle" => Ok(Self::Play),
            "stop" => Ok(Self::Stop),
            "next" => Ok(Self::Next),
            "previous" | "prev" => Ok(Self::Previous),
            _ => Err(CommandError::UnknownCommand(s.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Play => "play",
            Self::Stop => "stop",
            Self::Next => "next",
            Self::Previous => "previous",
        };
        f.write_str(s)
    }
}
