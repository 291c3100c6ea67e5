//! Skeleton placeholder shown while items load
//!
//! Four placeholder cards laid out on the same grid as real items, with bars
//! that pulse between two shades as the frame counter advances.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::item_grid::{columns_for_width, grid_cells};
use crate::app::App;

/// Number of placeholder cards
const SKELETON_CARDS: usize = 4;

/// Frames per pulse phase
const PULSE_FRAMES: u64 = 5;

/// Bar widths as fractions of the card's inner width (numerator, denominator)
const BAR_WIDTHS: [(usize, usize); 4] = [(1, 1), (1, 2), (1, 3), (2, 3)];

/// Renders the loading skeleton
pub fn render_skeleton(frame: &mut Frame, app: &App, area: Rect) {
    let color = pulse_color(app.tick);
    let columns = columns_for_width(area.width);

    let cells = grid_cells(area, columns).into_iter().flatten();
    for cell in cells.take(SKELETON_CARDS) {
        frame.render_widget(placeholder_card(cell.width, color), cell);
    }
}

/// Shade for the current frame
fn pulse_color(tick: u64) -> Color {
    if (tick / PULSE_FRAMES) % 2 == 0 {
        Color::DarkGray
    } else {
        Color::Gray
    }
}

fn placeholder_card(width: u16, color: Color) -> Paragraph<'static> {
    let inner_width = width.saturating_sub(2) as usize;

    let lines: Vec<Line> = BAR_WIDTHS
        .iter()
        .map(|(num, den)| {
            let bar = "█".repeat(inner_width * num / den);
            Line::from(Span::styled(bar, Style::default().fg(color)))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    Paragraph::new(lines).block(block)
}
