//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use std::collections::BTreeMap;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style, Stylize},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::Command;

/// Render the controls help text from the active key bindings.
///
/// Keys bound to the same command are grouped (`[p/space] play`).
pub fn controls_text(bindings: &BTreeMap<char, Command>) -> String {
    let order = [Command::Play, Command::Stop, Command::Previous, Command::Next];
    let mut parts: Vec<String> = order
        .iter()
        .filter_map(|cmd| {
            let keys: Vec<String> = bindings
                .iter()
                .filter(|(_, c)| *c == cmd)
                .map(|(k, _)| key_label(*k))
                .collect();
            if keys.is_empty() {
                None
            } else {
                Some(format!("[{}] {}", keys.join("/"), cmd))
            }
        })
        .collect();
    parts.push("[q] quit".to_string());
    parts.join(" | ")
}

fn key_label(key: char) -> String {
    if key == ' ' {
        "space".to_string()
    } else {
        key.to_string()
    }
}

/// Render the entire UI into the provided `frame`.
pub fn draw(frame: &mut Frame, app: &App, controls: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header_text = app.source.as_deref().unwrap_or("playlist");
    let header = Paragraph::new(header_text).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" cadenza ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Now playing
    let mut lines = vec![format!(
        "{} {} • {} [{}]",
        app.transport_glyph(),
        app.telemetry.title,
        app.state(),
        app.time_label()
    )];
    if let Some(status) = &app.status {
        lines.push(format!("! {status}"));
    }
    let now_playing = Paragraph::new(lines.join("\n"))
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" now playing "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[1]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().bold())
        .ratio(app.progress_ratio())
        .label(app.time_label());
    frame.render_widget(gauge, chunks[2]);

    // Track list
    let items: Vec<ListItem> = app
        .playlist
        .tracks()
        .enumerate()
        .map(|(i, track)| {
            let marker = if app.is_current(i) { app.transport_glyph() } else { " " };
            ListItem::new(format!("{marker} {}", track.title))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" tracks "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut state = ListState::default();
    state.select(Some(app.telemetry.index));
    frame.render_stateful_widget(list, chunks[3], &mut state);

    let footer = Paragraph::new(controls)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[4]);
}
