use std::path::PathBuf;

use crate::error::{CatalogError, EngineError};

/// One entry of the catalog: what to show and where the audio lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub title: String,
    pub audio_ref: PathBuf,
}

impl Track {
    pub fn new(title: impl Into<String>, audio_ref: impl Into<PathBuf>) -> Self {
        Self {
            title: title.into(),
            audio_ref: audio_ref.into(),
        }
    }
}

/// An ordered, non-empty, read-only list of tracks.
///
/// Navigation wraps at both ends, so every index produced by [`Playlist::next`]
/// or [`Playlist::previous`] is valid for [`Playlist::get`].
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist, rejecting an empty track list.
    pub fn new(tracks: Vec<Track>) -> Result<Self, CatalogError> {
        if tracks.is_empty() {
            return Err(CatalogError::Empty("catalog".to_string()));
        }
        Ok(Self { tracks })
    }

    pub fn get(&self, index: usize) -> Result<&Track, EngineError> {
        self.tracks.get(index).ok_or(EngineError::OutOfRange {
            index,
            len: self.tracks.len(),
        })
    }

    /// Index after `index`, wrapping to 0 past the end.
    pub fn next(&self, index: usize) -> usize {
        (index + 1) % self.tracks.len()
    }

    /// Index before `index`, wrapping to the last track before 0.
    pub fn previous(&self, index: usize) -> usize {
        let len = self.tracks.len();
        (index % len + len - 1) % len
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter()
    }
}
