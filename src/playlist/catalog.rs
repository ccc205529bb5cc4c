use std::path::{Path, PathBuf};

use lofty::prelude::{Accessor, TaggedFileExt};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{CatalogEntry, CatalogSettings};
use crate::error::CatalogError;

use super::model::{Playlist, Track};

/// Build the playlist for this run.
///
/// A directory given on the command line always wins and is scanned.
/// Otherwise `catalog.scan` selects between scanning `catalog.dir` and
/// resolving the explicit `catalog.tracks` entries against it.
pub fn load_playlist(
    settings: &CatalogSettings,
    dir_override: Option<&Path>,
) -> Result<Playlist, CatalogError> {
    let (tracks, origin) = match dir_override {
        Some(dir) => (scan(dir, settings), dir.display().to_string()),
        None if settings.scan => (
            scan(&settings.dir, settings),
            settings.dir.display().to_string(),
        ),
        None => (
            from_entries(&settings.tracks, &settings.dir),
            "catalog.tracks".to_string(),
        ),
    };

    info!(count = tracks.len(), %origin, "catalog loaded");
    Playlist::new(tracks).map_err(|_| CatalogError::Empty(origin))
}

/// Resolve configured entries. Relative paths are taken from `base`; a
/// missing title falls back to the file stem.
pub fn from_entries(entries: &[CatalogEntry], base: &Path) -> Vec<Track> {
    entries
        .iter()
        .map(|entry| {
            let audio_ref = if entry.path.is_absolute() {
                entry.path.clone()
            } else {
                base.join(&entry.path)
            };
            let title = entry
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| file_stem_title(&audio_ref));
            Track::new(title, audio_ref)
        })
        .collect()
}

fn file_stem_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn is_audio_file(path: &Path, settings: &CatalogSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Title from the file's tags when present, otherwise the file stem.
fn tagged_title(path: &Path) -> String {
    let tagged = match lofty::read_from_path(path) {
        Ok(t) => t,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no readable tags");
            return file_stem_title(path);
        }
    };

    tagged
        .primary_tag()
        .or_else(|| tagged.first_tag())
        .and_then(|tag| tag.title().map(|t| t.trim().to_string()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| file_stem_title(path))
}

/// Walk `dir` for audio files and sort them by title, case-insensitively.
pub fn scan(dir: &Path, settings: &CatalogSettings) -> Vec<Track> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut tracks: Vec<Track> = walker
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && is_audio_file(path, settings))
        .map(|path: PathBuf| Track::new(tagged_title(&path), path))
        .collect();

    tracks.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
    tracks
}
