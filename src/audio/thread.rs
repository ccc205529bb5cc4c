use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::EngineError;
use crate::playlist::Playlist;

use super::engine::Engine;
use super::resource::AudioBackend;
use super::telemetry::Telemetry;
use super::types::EngineMsg;

/// Spawn the engine thread and wait until its backend is open.
///
/// The backend is built on the engine thread itself, since audio output
/// streams are generally not `Send`.
pub(super) fn spawn_engine_thread<B, F>(
    playlist: Arc<Playlist>,
    make_backend: F,
    telemetry: Telemetry,
    mailbox: Sender<EngineMsg>,
    rx: Receiver<EngineMsg>,
    poll_interval: Duration,
) -> Result<JoinHandle<()>, EngineError>
where
    B: AudioBackend + 'static,
    F: FnOnce() -> Result<B, EngineError> + Send + 'static,
{
    let (ready_tx, ready_rx) = mpsc::channel::<Result<(), EngineError>>();

    let join = thread::Builder::new()
        .name("cadenza-engine".to_string())
        .spawn(move || {
            let backend = match make_backend() {
                Ok(b) => {
                    let _ = ready_tx.send(Ok(()));
                    b
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let mut engine = Engine::new(playlist, backend, telemetry, mailbox, poll_interval);
            run(&mut engine, rx);
        })
        .map_err(|e| EngineError::OutputUnavailable(e.to_string()))?;

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(join),
        Ok(Err(e)) => {
            let _ = join.join();
            Err(e)
        }
        Err(_) => {
            let _ = join.join();
            Err(EngineError::OutputUnavailable(
                "engine thread exited during startup".to_string(),
            ))
        }
    }
}

/// Process messages until shutdown. Everything touching the session happens here.
pub(super) fn run<B: AudioBackend>(engine: &mut Engine<B>, rx: Receiver<EngineMsg>) {
    for msg in rx.iter() {
        match msg {
            EngineMsg::Command { command, reply } => {
                let result = engine.apply(command);
                if let Err(e) = &result {
                    warn!(%command, error = %e, "command failed");
                }
                if let Some(reply) = reply {
                    let _ = reply.send(result);
                }
            }
            EngineMsg::Completed { generation } => engine.on_completed(generation),
            EngineMsg::Tick => engine.on_tick(),
            EngineMsg::Shutdown { reply } => {
                engine.teardown();
                let _ = reply.send(());
                debug!("engine thread exiting");
                return;
            }
        }
    }
    engine.teardown();
}
