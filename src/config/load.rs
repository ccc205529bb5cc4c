use std::collections::BTreeMap;
use std::{env, path::PathBuf};

use crate::audio::Command;

use super::schema::{ControlsSettings, Settings};

/// Configuration loading helpers.
///
/// `Settings::load` tries environment variables first (prefix `CADENZA__`), then an
/// optional config file and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENZA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.engine.poll_interval_ms == 0 {
            return Err("engine.poll_interval_ms must be >= 1".to_string());
        }
        if !self.catalog.scan && self.catalog.tracks.is_empty() {
            return Err("catalog.tracks is empty and catalog.scan is off".to_string());
        }
        self.controls.key_bindings()?;
        Ok(())
    }
}

impl ControlsSettings {
    /// Parse the configured bindings into typed commands.
    pub fn key_bindings(&self) -> Result<BTreeMap<char, Command>, String> {
        let mut bindings = BTreeMap::new();
        for (key, command) in &self.keys {
            let ch = parse_key(key).ok_or_else(|| format!("controls.keys: invalid key {key:?}"))?;
            let cmd: Command = command
                .parse()
                .map_err(|e| format!("controls.keys.{key}: {e}"))?;
            bindings.insert(ch, cmd);
        }
        Ok(bindings)
    }
}

fn parse_key(key: &str) -> Option<char> {
    if key.eq_ignore_ascii_case("space") {
        return Some(' ');
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Resolve the config path from `CADENZA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENZA_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadenza/config.toml`
/// or `~/.config/cadenza/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config").map(|d| d.join("cadenza").join("config.toml"))
}

/// Compute the default log file under `$XDG_STATE_HOME/cadenza/cadenza.log`
/// or `~/.local/state/cadenza/cadenza.log`.
pub fn default_log_path() -> Option<PathBuf> {
    xdg_dir("XDG_STATE_HOME", ".local/state").map(|d| d.join("cadenza").join("cadenza.log"))
}

fn xdg_dir(var: &str, home_fallback: &str) -> Option<PathBuf> {
    if let Some(xdg) = env::var_os(var) {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(home_fallback))
    }
}
