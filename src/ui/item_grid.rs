//! Item grid rendering
//!
//! Lays fetched items out as bordered cards in a grid whose column count
//! follows the terminal width, like a responsive web grid.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::Item;

/// Height of one card: four text lines plus borders
pub const CARD_HEIGHT: u16 = 6;

/// Number of grid columns for a given width
///
/// Breakpoints: 1 column below 60 cells, 2 below 100, 3 below 140, else 4.
pub fn columns_for_width(width: u16) -> u16 {
    match width {
        0..=59 => 1,
        60..=99 => 2,
        100..=139 => 3,
        _ => 4,
    }
}

/// Splits `area` into grid rows of `columns` equal cells, as many rows as fit
pub fn grid_cells(area: Rect, columns: u16) -> Vec<Vec<Rect>> {
    let visible_rows = (area.height / CARD_HEIGHT).max(1);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows as usize])
        .split(area);

    rows.iter()
        .map(|row| {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, columns as u32); columns as usize])
                .split(*row)
                .to_vec()
        })
        .collect()
}

/// Renders the items of the current result as a grid
pub fn render_grid(frame: &mut Frame, app: &App, area: Rect) {
    let Some(result) = app.result.as_ref() else {
        return;
    };

    if result.items.is_empty() {
        let message = format!("No {} returned", app.source.label().to_lowercase());
        let paragraph = Paragraph::new(message).style(Style::default().fg(Color::Gray));
        frame.render_widget(paragraph, area);
        return;
    }

    let columns = columns_for_width(area.width);
    let rows: Vec<&[Item]> = result.items.chunks(columns as usize).collect();
    let first_row = app.scroll_offset.min(rows.len().saturating_sub(1));

    for (cells, items) in grid_cells(area, columns).iter().zip(rows.iter().skip(first_row)) {
        for (cell, item) in cells.iter().zip(items.iter()) {
            frame.render_widget(card(item, cell.width), *cell);
        }
    }
}

/// Builds the card widget for one item
fn card(item: &Item, width: u16) -> Paragraph<'static> {
    let inner_width = width.saturating_sub(2) as usize;

    let lines = vec![
        Line::from(Span::styled(
            truncate(&item.name, inner_width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("ID: {}", item.id)),
        Line::from(truncate(&item.detail_line(), inner_width)),
        Line::from(Span::styled(
            truncate(&item.category, inner_width),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    Paragraph::new(lines).block(block)
}

/// Shortens `text` to `max` characters, ending with an ellipsis when cut
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('…');
    cut
}
