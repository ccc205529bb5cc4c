//! `rodio`-backed audio resources.
//!
//! Each resource is one paused `Sink` holding one decoded track. Natural
//! completion is detected by a watcher thread blocked in
//! `Sink::sleep_until_end`, which fires the registered callback unless the
//! resource was stopped first.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::playlist::Track;

use super::resource::{AudioBackend, AudioResource, CompletionCallback};

pub struct RodioBackend {
    stream: OutputStream,
}

impl RodioBackend {
    /// Open the default output device.
    pub fn open_default() -> Result<Self, EngineError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| EngineError::OutputUnavailable(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl AudioBackend for RodioBackend {
    type Resource = RodioResource;

    fn create(&mut self, track: &Track) -> Result<RodioResource, EngineError> {
        let unavailable = |reason: String| EngineError::ResourceUnavailable {
            title: track.title.clone(),
            reason,
        };

        let file = File::open(&track.audio_ref)
            .map_err(|e| unavailable(format!("{}: {e}", track.audio_ref.display())))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| unavailable(format!("{}: {e}", track.audio_ref.display())))?;

        let duration = source
            .total_duration()
            .or_else(|| probe_duration(&track.audio_ref))
            .unwrap_or(Duration::ZERO);

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(source);
        sink.pause();

        RodioResource::new(sink, duration).map_err(|e| unavailable(e.to_string()))
    }
}

/// Container-level duration for formats whose decoder cannot report one
/// (VBR mp3 and friends).
fn probe_duration(path: &Path) -> Option<Duration> {
    match lofty::read_from_path(path) {
        Ok(tagged) => Some(tagged.properties().duration()),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "duration probe failed");
            None
        }
    }
}

pub struct RodioResource {
    sink: Arc<Sink>,
    duration: Duration,
    completion: Arc<Mutex<Option<CompletionCallback>>>,
    detached: Arc<AtomicBool>,
}

impl RodioResource {
    fn new(sink: Sink, duration: Duration) -> std::io::Result<Self> {
        let sink = Arc::new(sink);
        let completion: Arc<Mutex<Option<CompletionCallback>>> = Arc::new(Mutex::new(None));
        let detached = Arc::new(AtomicBool::new(false));

        let watcher_sink = Arc::clone(&sink);
        let watcher_completion = Arc::clone(&completion);
        let watcher_detached = Arc::clone(&detached);
        thread::Builder::new()
            .name("cadenza-completion".to_string())
            .spawn(move || {
                watcher_sink.sleep_until_end();
                if watcher_detached.load(Ordering::SeqCst) {
                    return;
                }
                let callback = watcher_completion.lock().ok().and_then(|mut c| c.take());
                match callback {
                    Some(cb) => cb(),
                    None => warn!("track finished with no completion callback registered"),
                }
            })?;

        Ok(Self {
            sink,
            duration,
            completion,
            detached,
        })
    }
}

impl AudioResource for RodioResource {
    fn start(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn stop(&mut self) {
        // Detach first so the watcher sees it once the stopped source drains.
        self.detached.store(true, Ordering::SeqCst);
        self.sink.stop();
    }

    fn release(self) {
        drop(self);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn on_completion(&mut self, callback: CompletionCallback) {
        if let Ok(mut slot) = self.completion.lock() {
            *slot = Some(callback);
        }
    }
}

impl Drop for RodioResource {
    fn drop(&mut self) {
        self.detached.store(true, Ordering::SeqCst);
        self.sink.stop();
    }
}
