use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{trace, warn};

use super::types::EngineMsg;

/// Periodic position sampler.
///
/// Posts [`EngineMsg::Tick`] into the engine mailbox every `interval` until
/// cancelled. Dropping a `Poller` cancels it and waits for its thread, so a
/// replaced poller is gone before its successor starts.
pub(super) struct Poller {
    stop_tx: Sender<()>,
    join: Option<JoinHandle<()>>,
}

impl Poller {
    pub(super) fn spawn(interval: Duration, mailbox: Sender<EngineMsg>) -> Option<Self> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let spawned = thread::Builder::new()
            .name("cadenza-poller".to_string())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            trace!("poll tick");
                            if mailbox.send(EngineMsg::Tick).is_err() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            });

        match spawned {
            Ok(join) => Some(Self {
                stop_tx,
                join: Some(join),
            }),
            Err(e) => {
                warn!(error = %e, "failed to spawn position poller");
                None
            }
        }
    }

    pub(super) fn cancel(self) {
        drop(self);
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
