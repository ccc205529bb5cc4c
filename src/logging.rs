//! `tracing` subscriber setup.
//!
//! The terminal belongs to the TUI, so events go to a log file instead of
//! stderr. `RUST_LOG` wins over `logging.level` when set.

use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{self, LoggingSettings};

/// Where log output for `settings` ends up.
pub fn log_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings.file.clone().or_else(config::default_log_path)
}

/// Build the env filter: `RUST_LOG` first, then the configured directive.
pub fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("cadenza=info"))
}

/// Install the global subscriber. Returns the log file in use, or `None`
/// when no location could be determined and logging stays disabled.
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>, Box<dyn std::error::Error>> {
    let Some(path) = log_path(settings) else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::registry()
        .with(env_filter(settings))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    Ok(Some(path))
}

/// Like [`init`], but a logging failure only costs the log: it is reported
/// once on stderr (the TUI has not taken the terminal yet) and the app
/// keeps running without a subscriber.
pub fn init_or_disable(settings: &LoggingSettings) -> Option<PathBuf> {
    match init(settings) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("cadenza: logging disabled: {e}");
            None
        }
    }
}
