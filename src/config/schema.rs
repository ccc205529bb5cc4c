use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub catalog: CatalogSettings,
    pub controls: ControlsSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// How often the position poller samples the playing track (milliseconds).
    pub poll_interval_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

/// One explicitly configured track.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEntry {
    /// Shown title. Falls back to the file stem when absent or blank.
    #[serde(default)]
    pub title: Option<String>,
    /// Audio file, relative to `catalog.dir` unless absolute.
    pub path: PathBuf,
}

impl CatalogEntry {
    fn reference(title: &str, path: &str) -> Self {
        Self {
            title: Some(title.to_string()),
            path: PathBuf::from(path),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Base directory for relative `tracks` paths, and the directory scanned
    /// when `scan` is set.
    pub dir: PathBuf,
    /// Scan `dir` for audio files instead of using `tracks`.
    pub scan: bool,
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Explicit playlist, in play order.
    pub tracks: Vec<CatalogEntry>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets"),
            scan: false,
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            recursive: true,
            tracks: vec![
                CatalogEntry::reference("Metal Race", "metal_race.mp3"),
                CatalogEntry::reference("Ditch Diggin", "ditch_diggin.mp3"),
                CatalogEntry::reference("Marvin's Dance", "marvin_dance.mp3"),
                CatalogEntry::reference("Next Funk", "next_funk.mp3"),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Key to command bindings. Keys are single characters or `"space"`;
    /// commands are `play`, `stop`, `next` or `previous`.
    pub keys: BTreeMap<String, String>,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        let keys = [
            ("p", "play"),
            ("space", "play"),
            ("s", "stop"),
            ("l", "next"),
            ("n", "next"),
            ("h", "previous"),
            ("b", "previous"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Self { keys }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub level: String,
    /// Log file. Defaults to `$XDG_STATE_HOME/cadenza/cadenza.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "cadenza=info".to_string(),
            file: None,
        }
    }
}
