//! Application state management for cachegrid
//!
//! This module contains the main application state: which view is shown,
//! the most recent fetch result, keyboard handling and scrolling.

use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::StartupConfig;
use crate::data::{ItemFetchResult, Source};
use crate::refresh::{RefreshCommand, RefreshMessage};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Skeleton placeholder while a fetch that missed the cache is running
    Loading,
    /// Grid of fetched items
    Ready,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// API the items come from
    pub source: Source,
    /// Cache TTL in seconds, shown in the header
    pub ttl_secs: i64,
    /// Most recent successful fetch
    pub result: Option<ItemFetchResult>,
    /// Message from the most recent failed fetch, cleared on success
    pub last_error: Option<String>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// First grid row shown
    pub scroll_offset: usize,
    /// Columns in the most recently laid out grid
    pub grid_columns: u16,
    /// Frame counter driving the skeleton animation
    pub tick: u64,
    /// Refresh the main loop should forward to the background task
    pub refresh_requested: Option<RefreshCommand>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(&StartupConfig::default())
    }
}

impl App {
    /// Creates a new App instance in the loading state
    pub fn new(config: &StartupConfig) -> Self {
        Self {
            state: AppState::Loading,
            source: config.source,
            ttl_secs: config.ttl_secs(),
            result: None,
            last_error: None,
            should_quit: false,
            show_help: false,
            scroll_offset: 0,
            grid_columns: 1,
            tick: 0,
            refresh_requested: None,
        }
    }

    /// Number of items in the current result
    pub fn item_count(&self) -> usize {
        self.result.as_ref().map_or(0, |r| r.items.len())
    }

    /// Number of grid rows the current result fills
    pub fn row_count(&self) -> usize {
        self.item_count().div_ceil(self.grid_columns.max(1) as usize)
    }

    /// Records the grid's column count and keeps the scroll position on a
    /// real row
    pub fn set_grid_columns(&mut self, columns: u16) {
        self.grid_columns = columns.max(1);
        self.clamp_scroll();
    }

    fn clamp_scroll(&mut self) {
        self.scroll_offset = self.scroll_offset.min(self.row_count().saturating_sub(1));
    }

    /// Applies a message from the background refresh task
    ///
    /// A failure keeps whatever grid is already shown; with nothing to show
    /// the skeleton stays up and the error appears in the header.
    pub fn apply_refresh(&mut self, message: RefreshMessage) {
        match message {
            RefreshMessage::Loading => {
                self.state = AppState::Loading;
            }
            RefreshMessage::Loaded(result) => {
                self.result = Some(result);
                self.clamp_scroll();
                self.last_error = None;
                self.state = AppState::Ready;
            }
            RefreshMessage::Failed(error) => {
                self.last_error = Some(error);
                if self.result.is_some() {
                    self.state = AppState::Ready;
                }
            }
        }
    }

    /// Advances the animation frame counter
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q` or `Esc`: Quit the application
    /// - `r`: Revalidate (served from cache while fresh)
    /// - `R`: Force refresh, bypassing the cache
    /// - `Up`/`k`, `Down`/`j`: Scroll the grid
    /// - `?`: Toggle help overlay
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // Handle help overlay - intercepts all keys when shown
        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {} // Ignore other keys when help is shown
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            KeyCode::Char('r') => {
                self.refresh_requested = Some(RefreshCommand::Revalidate);
            }
            KeyCode::Char('R') => {
                self.refresh_requested = Some(RefreshCommand::Force);
            }
            KeyCode::Up | KeyCode::Char('k') if self.state == AppState::Ready => {
                self.scroll_up();
            }
            KeyCode::Down | KeyCode::Char('j') if self.state == AppState::Ready => {
                self.scroll_down();
            }
            _ => {}
        }
    }

    /// Scrolls the grid up by one row
    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    /// Scrolls the grid down by one row, stopping at the last row
    pub fn scroll_down(&mut self) {
        if self.scroll_offset + 1 < self.row_count() {
            self.scroll_offset += 1;
        }
    }
}
