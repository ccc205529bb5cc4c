use super::*;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

fn player(state: TransportState) -> (PlayerIface, Receiver<ControlCmd>) {
    let (tx, rx) = mpsc::channel();
    let shared = Arc::new(Mutex::new(SharedState {
        state,
        ..SharedState::default()
    }));
    (PlayerIface { tx, state: shared }, rx)
}

#[test]
fn set_telemetry_fills_shared_state() {
    let state = Arc::new(Mutex::new(SharedState::default()));
    let handle = MprisHandle {
        state: state.clone(),
    };

    handle.set_telemetry(&TelemetrySnapshot {
        state: TransportState::Paused,
        index: 7,
        title: "Test Title".to_string(),
        position: Duration::from_millis(1500),
        duration: Duration::from_micros(1_234_567),
    });

    let s = state.lock().unwrap();
    assert_eq!(s.state, TransportState::Paused);
    assert_eq!(s.title, "Test Title");
    assert_eq!(s.length_micros, 1_234_567);
    assert_eq!(s.position_micros, 1_500_000);
    assert_eq!(
        s.track_id.as_ref().map(|p| p.as_str()),
        Some("/org/mpris/MediaPlayer2/track/7")
    );
}

#[test]
fn play_is_forwarded_only_when_not_playing() {
    let (iface, rx) = player(TransportState::Playing);
    iface.play();
    assert!(rx.try_recv().is_err());

    let (iface, rx) = player(TransportState::Stopped);
    iface.play();
    assert_eq!(rx.try_recv(), Ok(ControlCmd::Transport(Command::Play)));
}

#[test]
fn pause_is_forwarded_only_while_playing() {
    let (iface, rx) = player(TransportState::Paused);
    iface.pause();
    assert!(rx.try_recv().is_err());

    let (iface, rx) = player(TransportState::Playing);
    iface.pause();
    assert_eq!(rx.try_recv(), Ok(ControlCmd::Transport(Command::Play)));
}

#[test]
fn other_methods_map_straight_to_commands() {
    let (iface, rx) = player(TransportState::Idle);
    iface.play_pause();
    iface.stop();
    iface.next();
    iface.previous();

    let got: Vec<ControlCmd> = rx.try_iter().collect();
    assert_eq!(
        got,
        vec![
            ControlCmd::Transport(Command::Play),
            ControlCmd::Transport(Command::Stop),
            ControlCmd::Transport(Command::Next),
            ControlCmd::Transport(Command::Previous),
        ]
    );
}

#[test]
fn idle_and_stopped_report_stopped() {
    assert_eq!(player(TransportState::Idle).0.playback_status(), "Stopped");
    assert_eq!(player(TransportState::Stopped).0.playback_status(), "Stopped");
    assert_eq!(player(TransportState::Playing).0.playback_status(), "Playing");
    assert_eq!(player(TransportState::Paused).0.playback_status(), "Paused");
}

#[test]
fn metadata_includes_title_and_length() {
    let (iface, _rx) = player(TransportState::Playing);
    {
        let mut s = iface.state.lock().unwrap();
        s.title = "Next Funk".to_string();
        s.length_micros = 90_000_000;
        s.track_id = track_path(3);
    }

    let meta = iface.metadata();
    assert!(meta.contains_key("mpris:trackid"));
    assert!(meta.contains_key("mpris:length"));
    let title: String = meta["xesam:title"].try_clone().unwrap().try_into().unwrap();
    assert_eq!(title, "Next Funk");
}

#[test]
fn metadata_omits_unknown_length() {
    let (iface, _rx) = player(TransportState::Stopped);
    let meta = iface.metadata();
    assert!(!meta.contains_key("mpris:length"));
    assert!(meta.contains_key("xesam:title"));
}
