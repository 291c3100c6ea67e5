//! cachegrid - Fetch, memoize and display items from a public API
//!
//! A terminal UI application that fetches characters or products, caches them
//! in memory for a fixed TTL, and shows a skeleton placeholder whenever a
//! fetch has to go to the network.

use std::io;
use std::panic;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use cachegrid::app::App;
use cachegrid::cache::SystemClock;
use cachegrid::cli::{Cli, StartupConfig};
use cachegrid::data::{item_fetcher, ItemFetcher};
use cachegrid::logging::{self, LogTarget};
use cachegrid::plain;
use cachegrid::refresh::{self, RefreshConfig, RefreshHandle};
use cachegrid::ui::{self, item_grid};

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Fetches once and prints the result
async fn run_plain(
    config: &StartupConfig,
    fetcher: &ItemFetcher,
) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(LogTarget::Stderr)?;

    let result = fetcher.get_data().await?;
    print!(
        "{}",
        plain::format_result(config.source, config.ttl_secs(), &result)
    );

    Ok(())
}

/// Main event loop: apply refresh messages, draw, handle keys
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handle: &mut RefreshHandle,
) -> io::Result<()> {
    loop {
        while let Some(message) = refresh::try_recv(handle) {
            app.apply_refresh(message);
        }

        app.set_grid_columns(item_grid::columns_for_width(terminal.size()?.width));
        terminal.draw(|f| ui::render(f, app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if let Some(command) = app.refresh_requested.take() {
            handle.request(command);
        }

        app.on_tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    let fetcher = item_fetcher(config.source, config.delay, config.ttl, Arc::new(SystemClock));

    if config.plain {
        return run_plain(&config, &fetcher).await;
    }

    // The terminal owns stdout, so logs go to a file
    let log_path = config.log_file.clone().or_else(logging::default_log_path);
    if let Some(path) = log_path {
        logging::init(LogTarget::File(path))?;
    }
    info!(source = ?config.source, ttl_secs = config.ttl_secs(), "starting");

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    let refresh_config = RefreshConfig {
        interval: config
            .refresh_interval
            .unwrap_or(RefreshConfig::default().interval),
        enabled: config.refresh_interval.is_some(),
    };
    // Kicks off the initial load in the background
    let mut handle = RefreshHandle::spawn(fetcher, refresh_config);

    let outcome = run_loop(&mut terminal, &mut app, &mut handle);

    handle.shutdown().await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    info!("exiting");
    outcome.map_err(Into::into)
}
