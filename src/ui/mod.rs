//! UI rendering module for cachegrid
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod help_overlay;
pub mod item_grid;
pub mod skeleton;

pub use help_overlay::render as render_help_overlay;
pub use item_grid::render_grid;
pub use skeleton::render_skeleton;

use chrono::Local;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

/// Renders the whole screen for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header
            Constraint::Min(3),    // Grid or skeleton
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    match app.state {
        AppState::Loading => render_skeleton(frame, app, chunks[1]),
        AppState::Ready => render_grid(frame, app, chunks[1]),
    }

    render_help(frame, chunks[2]);

    if app.show_help {
        render_help_overlay(frame);
    }
}

/// Title, description, and fetch status
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let label = app.source.label();
    let muted = Style::default().fg(Color::Gray);

    let mut lines = vec![
        Line::from(Span::styled(
            "Cache Test",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("Fetches all {} from ", label.to_lowercase()),
                muted,
            ),
            Span::styled(
                app.source.api_name(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
            Span::styled(format!(" ({})", app.source.homepage()), muted),
        ]),
        Line::from(Span::styled(
            format!("Cached for {} seconds", app.ttl_secs),
            muted,
        )),
        Line::from(Span::styled(
            "Shows loading state during revalidation",
            muted,
        )),
    ];

    match (&app.state, &app.result) {
        (AppState::Ready, Some(result)) => {
            let fetched_at = result.fetched_at.with_timezone(&Local).format("%H:%M:%S");
            lines.push(Line::from(vec![
                Span::raw(format!("Fetched at: {}", fetched_at)),
                Span::raw("    "),
                Span::styled(
                    format!("Total {}: {}", label, result.items.len()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                format!("Loading {}...", label.to_lowercase()),
                Style::default().fg(Color::Cyan),
            )));
        }
    }

    if let Some(ref error) = app.last_error {
        lines.push(Line::from(Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

/// Single-line key hints at the bottom of the screen
fn render_help(frame: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let text = Style::default().fg(Color::DarkGray);

    let line = Line::from(vec![
        Span::styled("r", key),
        Span::styled(" refresh  ", text),
        Span::styled("R", key),
        Span::styled(" force  ", text),
        Span::styled("↑/↓", key),
        Span::styled(" scroll  ", text),
        Span::styled("?", key),
        Span::styled(" help  ", text),
        Span::styled("q", key),
        Span::styled(" quit", text),
    ]);

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
