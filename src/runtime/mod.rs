use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::PlaybackEngine;
use crate::logging;
use crate::mpris::ControlCmd;
use crate::playlist::load_playlist;
use crate::ui;

mod event_loop;
mod mpris_sync;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_warning) = settings::load_settings();
    let log_file = logging::init_or_disable(&settings.logging);
    if let Some(msg) = config_warning {
        warn!("{msg}");
    }
    info!(log = ?log_file, "cadenza starting");

    let dir_override = env::args().nth(1).map(PathBuf::from);
    let playlist = Arc::new(load_playlist(&settings.catalog, dir_override.as_deref())?);
    let bindings = settings.controls.key_bindings()?;
    let controls = ui::controls_text(&bindings);

    let engine = PlaybackEngine::new(playlist.clone(), &settings.engine)?;
    let telemetry = engine.subscribe();
    let mut app = App::new(playlist, engine.snapshot());
    app.set_source(match &dir_override {
        Some(dir) => dir.display().to_string(),
        None if settings.catalog.scan => settings.catalog.dir.display().to_string(),
        None => "playlist".to_string(),
    });

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let ctx = event_loop::EventLoopContext {
        engine: &engine,
        mpris: &mpris,
        bindings: &bindings,
        controls: &controls,
        telemetry: &telemetry,
        control_rx: &control_rx,
    };
    let run_result = event_loop::run(&mut terminal, &ctx, &mut app);

    engine.teardown();
    debug_assert!(!engine.is_alive());

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("cadenza exiting");
    run_result
}
