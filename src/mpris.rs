//! MPRIS2 D-Bus service so desktop media keys and `playerctl` can drive
//! the engine.
//!
//! The service runs on its own thread and never touches the engine
//! directly: method calls become `ControlCmd`s for the runtime loop, and
//! properties are answered from a copy of the latest telemetry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use tracing::{debug, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedObjectPath, OwnedValue, Value};

use crate::audio::{Command, TelemetrySnapshot, TransportState};

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.cadenza";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Transport(Command),
}

#[derive(Debug, Default)]
struct SharedState {
    state: TransportState,
    title: String,
    length_micros: i64,
    position_micros: i64,
    track_id: Option<OwnedObjectPath>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// Mirror the engine's latest telemetry.
    pub fn set_telemetry(&self, snapshot: &TelemetrySnapshot) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        s.state = snapshot.state;
        s.title = snapshot.title.clone();
        s.length_micros = micros(snapshot.duration);
        s.position_micros = micros(snapshot.position);
        s.track_id = track_path(snapshot.index);
    }
}

fn micros(d: std::time::Duration) -> i64 {
    i64::try_from(d.as_micros()).unwrap_or(i64::MAX)
}

fn track_path(index: usize) -> Option<OwnedObjectPath> {
    ObjectPath::try_from(format!("{OBJECT_PATH}/track/{index}"))
        .ok()
        .map(OwnedObjectPath::from)
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "cadenza"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec![]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        vec![]
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

impl PlayerIface {
    fn transport(&self) -> TransportState {
        self.state.lock().map(|s| s.state).unwrap_or_default()
    }

    fn send(&self, command: Command) {
        debug!(%command, "mpris request");
        let _ = self.tx.send(ControlCmd::Transport(command));
    }
}

// `Play` toggles in the engine, so the explicit Play/Pause methods only
// forward it when it moves in the requested direction.
#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        self.send(Command::Next);
    }

    fn previous(&self) {
        self.send(Command::Previous);
    }

    fn play(&self) {
        if self.transport() != TransportState::Playing {
            self.send(Command::Play);
        }
    }

    fn pause(&self) {
        if self.transport() == TransportState::Playing {
            self.send(Command::Play);
        }
    }

    fn play_pause(&self) {
        self.send(Command::Play);
    }

    fn stop(&self) {
        self.send(Command::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        match self.transport() {
            TransportState::Playing => "Playing",
            TransportState::Paused => "Paused",
            TransportState::Idle | TransportState::Stopped => "Stopped",
        }
    }

    #[zbus(property)]
    fn position(&self) -> i64 {
        self.state.lock().map(|s| s.position_micros).unwrap_or(0)
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(v) = s
            .track_id
            .as_ref()
            .and_then(|id| owned(Value::from(id.clone().into_inner())))
        {
            map.insert("mpris:trackid".to_string(), v);
        }
        if let Some(v) = owned(Value::from(s.title.clone())) {
            map.insert("xesam:title".to_string(), v);
        }
        if s.length_micros > 0 {
            if let Some(v) = owned(Value::from(s.length_micros)) {
                map.insert("mpris:length".to_string(), v);
            }
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("cadenza-mpris".to_string())
        .spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!(error = %e, "MPRIS: failed to connect to session bus");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    warn!(error = %e, "MPRIS: failed to acquire name");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server
                    .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                    .await
                {
                    warn!(error = %e, "MPRIS: failed to register root iface");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        OBJECT_PATH,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!(error = %e, "MPRIS: failed to register player iface");
                    return;
                }
                debug!(name = BUS_NAME, "MPRIS service registered");

                // Keep the service alive.
                loop {
                    Timer::after(std::time::Duration::from_secs(3600)).await;
                }
            });
        });
    if let Err(e) = spawned {
        warn!(error = %e, "MPRIS: failed to spawn service thread");
    }

    MprisHandle { state }
}

#[cfg(test)]
mod tests;
