use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::info;

use crate::config::EngineSettings;
use crate::error::EngineError;
use crate::playlist::Playlist;

use super::command::Command;
use super::resource::AudioBackend;
use super::sink::RodioBackend;
use super::telemetry::{Telemetry, TelemetryEvent, TelemetrySnapshot};
use super::thread::spawn_engine_thread;
use super::types::EngineMsg;

/// Handle to a running playback engine.
///
/// Cheap to share by reference; all session state lives on the engine
/// thread. Dropping the handle tears the engine down.
pub struct PlaybackEngine {
    tx: Sender<EngineMsg>,
    telemetry: Telemetry,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackEngine {
    /// Start an engine on the default audio output.
    pub fn new(playlist: Arc<Playlist>, settings: &EngineSettings) -> Result<Self, EngineError> {
        Self::with_backend(playlist, settings, RodioBackend::open_default)
    }

    /// Start an engine whose backend is built by `make_backend` on the engine thread.
    pub fn with_backend<B, F>(
        playlist: Arc<Playlist>,
        settings: &EngineSettings,
        make_backend: F,
    ) -> Result<Self, EngineError>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> Result<B, EngineError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<EngineMsg>();
        let first_title = playlist
            .get(0)
            .map(|t| t.title.clone())
            .unwrap_or_default();
        let telemetry = Telemetry::new(TelemetrySnapshot {
            title: first_title,
            ..TelemetrySnapshot::default()
        });

        let join = spawn_engine_thread(
            playlist.clone(),
            make_backend,
            telemetry.clone(),
            tx.clone(),
            rx,
            Duration::from_millis(settings.poll_interval_ms.max(1)),
        )?;
        info!(tracks = playlist.len(), "playback engine started");

        Ok(Self {
            tx,
            telemetry,
            join: Mutex::new(Some(join)),
        })
    }

    /// Queue a command without waiting for its outcome.
    pub fn send(&self, command: Command) -> Result<(), EngineError> {
        self.tx
            .send(EngineMsg::Command {
                command,
                reply: None,
            })
            .map_err(|_| EngineError::Shutdown)
    }

    /// Run a command and wait until the engine has applied it.
    pub fn execute(&self, command: Command) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(EngineMsg::Command {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| EngineError::Shutdown)?;
        reply_rx.recv().map_err(|_| EngineError::Shutdown)?
    }

    pub fn play(&self) -> Result<(), EngineError> {
        self.execute(Command::Play)
    }

    pub fn stop(&self) -> Result<(), EngineError> {
        self.execute(Command::Stop)
    }

    pub fn next(&self) -> Result<(), EngineError> {
        self.execute(Command::Next)
    }

    pub fn previous(&self) -> Result<(), EngineError> {
        self.execute(Command::Previous)
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        self.telemetry.snapshot()
    }

    /// Receive every telemetry change from now on.
    pub fn subscribe(&self) -> Receiver<TelemetryEvent> {
        self.telemetry.subscribe()
    }

    /// Whether the engine is still running (not yet torn down).
    pub fn is_alive(&self) -> bool {
        self.join.lock().map(|j| j.is_some()).unwrap_or(false)
    }

    /// Release the audio resource, cancel the poller and stop the engine
    /// thread. Calling it again is a no-op.
    pub fn teardown(&self) {
        let Ok(mut join) = self.join.lock() else {
            return;
        };
        let Some(handle) = join.take() else {
            return;
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        if self.tx.send(EngineMsg::Shutdown { reply: reply_tx }).is_ok() {
            let _ = reply_rx.recv();
        }
        let _ = handle.join();
        info!("playback engine shut down");
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.teardown();
    }
}
