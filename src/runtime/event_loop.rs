use std::collections::BTreeMap;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::App;
use crate::audio::{Command, PlaybackEngine, TelemetryEvent};
use crate::mpris::{ControlCmd, MprisHandle};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// Everything the loop reads but never changes.
pub struct EventLoopContext<'a> {
    pub engine: &'a PlaybackEngine,
    pub mpris: &'a MprisHandle,
    pub bindings: &'a BTreeMap<char, Command>,
    pub controls: &'a str,
    pub telemetry: &'a mpsc::Receiver<TelemetryEvent>,
    pub control_rx: &'a mpsc::Receiver<ControlCmd>,
}

/// Main terminal event loop: folds telemetry into `app`, draws, and turns
/// key presses and MPRIS requests into engine commands. Returns `Ok(())`
/// when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &EventLoopContext<'_>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let mut changed = false;
        for ev in ctx.telemetry.try_iter() {
            app.apply(ev);
            changed = true;
        }
        // Keep MPRIS in sync even when changes come from media keys or auto-advance.
        if changed {
            update_mpris(ctx.mpris, app);
        }

        terminal.draw(|f| ui::draw(f, app, ctx.controls))?;

        while let Ok(cmd) = ctx.control_rx.try_recv() {
            match cmd {
                ControlCmd::Quit => return Ok(()),
                // Media keys do not wait; failures are logged by the engine.
                ControlCmd::Transport(command) => {
                    if let Err(e) = ctx.engine.send(command) {
                        app.set_status(e.to_string());
                    }
                }
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let Some(cmd) = key_to_control(key, ctx.bindings) {
                    if handle_control_cmd(cmd, ctx.engine, app) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

/// Apply one control request. Returns `true` when the loop should exit.
///
/// Engine errors do not end the session; they are shown in the status line.
fn handle_control_cmd(cmd: ControlCmd, engine: &PlaybackEngine, app: &mut App) -> bool {
    match cmd {
        ControlCmd::Quit => true,
        ControlCmd::Transport(command) => {
            let result = match command {
                Command::Play => engine.play(),
                Command::Stop => engine.stop(),
                Command::Next => engine.next(),
                Command::Previous => engine.previous(),
            };
            if let Err(e) = &result {
                debug!(%command, error = %e, "command rejected");
            }
            app.record_outcome(&result);
            false
        }
    }
}

/// Map a key press to a control request using the configured bindings.
/// `q`, `Esc` and `Ctrl-C` always quit.
pub fn key_to_control(key: KeyEvent, bindings: &BTreeMap<char, Command>) -> Option<ControlCmd> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(ControlCmd::Quit)
        }
        KeyCode::Char('q') | KeyCode::Esc => Some(ControlCmd::Quit),
        KeyCode::Char(c) => bindings.get(&c).copied().map(ControlCmd::Transport),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ControlsSettings;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_bindings_map_to_commands() {
        let bindings = ControlsSettings::default().key_bindings().unwrap();
        assert_eq!(
            key_to_control(press(KeyCode::Char(' ')), &bindings),
            Some(ControlCmd::Transport(Command::Play))
        );
        assert_eq!(
            key_to_control(press(KeyCode::Char('s')), &bindings),
            Some(ControlCmd::Transport(Command::Stop))
        );
        assert_eq!(
            key_to_control(press(KeyCode::Char('n')), &bindings),
            Some(ControlCmd::Transport(Command::Next))
        );
        assert_eq!(
            key_to_control(press(KeyCode::Char('h')), &bindings),
            Some(ControlCmd::Transport(Command::Previous))
        );
        assert_eq!(key_to_control(press(KeyCode::Char('z')), &bindings), None);
        assert_eq!(key_to_control(press(KeyCode::Enter), &bindings), None);
    }

    #[test]
    fn quit_keys_win_over_bindings() {
        let mut bindings = BTreeMap::new();
        bindings.insert('q', Command::Play);
        assert_eq!(
            key_to_control(press(KeyCode::Char('q')), &bindings),
            Some(ControlCmd::Quit)
        );
        assert_eq!(key_to_control(press(KeyCode::Esc), &bindings), Some(ControlCmd::Quit));
        assert_eq!(
            key_to_control(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                &bindings
            ),
            Some(ControlCmd::Quit)
        );
    }
}
