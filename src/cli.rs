//! Command-line interface parsing for cachegrid
//!
//! This module handles parsing of CLI arguments using clap and validates them
//! into a `StartupConfig` the rest of the application consumes.

use chrono::Duration;
use clap::Parser;
use std::path::PathBuf;
use thiserror::Error;

use crate::data::Source;

/// Default time-to-live for fetched items, in seconds
pub const DEFAULT_TTL_SECS: u64 = 10;

/// Default artificial delay after each response, in milliseconds
pub const DEFAULT_DELAY_MS: u64 = 3000;

/// Longest TTL accepted (one year)
const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The specified source name is not recognized
    #[error("Invalid source: '{0}'. Valid sources: characters, products")]
    InvalidSource(String),

    /// A TTL of zero would make every call a cache miss
    #[error("Invalid ttl: must be at least 1 second")]
    ZeroTtl,

    /// TTL too large to compute an expiry from
    #[error("Invalid ttl: {0} seconds exceeds the maximum of {max}", max = MAX_TTL_SECS)]
    TtlOutOfRange(u64),

    /// Auto-refresh interval of zero
    #[error("Invalid refresh interval: must be at least 1 second")]
    ZeroRefresh,
}

/// cachegrid - Fetch, memoize and display items from a public API
#[derive(Parser, Debug)]
#[command(name = "cachegrid")]
#[command(about = "Fetches items from a public API, caches them for a TTL, and shows them in a grid")]
#[command(version)]
pub struct Cli {
    /// Which API to fetch from
    ///
    /// Valid sources: characters (Rick and Morty API), products (Fake Store API)
    #[arg(long, value_name = "SOURCE", default_value = "characters")]
    pub source: String,

    /// How long fetched items are served from the cache, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = DEFAULT_TTL_SECS)]
    pub ttl: u64,

    /// Artificial delay after each API response, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = DEFAULT_DELAY_MS)]
    pub delay_ms: u64,

    /// Revalidate automatically every SECONDS (off by default)
    #[arg(long, value_name = "SECONDS")]
    pub refresh_secs: Option<u64>,

    /// Fetch once and print the items instead of opening the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Where to write logs in terminal UI mode
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// API to fetch from
    pub source: Source,
    /// Cache time-to-live
    pub ttl: Duration,
    /// Artificial delay after each response
    pub delay: std::time::Duration,
    /// Auto-refresh interval, if enabled
    pub refresh_interval: Option<std::time::Duration>,
    /// Print once instead of running the terminal UI
    pub plain: bool,
    /// Log file override
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            source: Source::default(),
            ttl: Duration::seconds(DEFAULT_TTL_SECS as i64),
            delay: std::time::Duration::from_millis(DEFAULT_DELAY_MS),
            refresh_interval: None,
            plain: false,
            log_file: None,
        }
    }
}

/// Parses a source string argument into a Source.
///
/// # Returns
/// * `Ok(Source)` if the string matches a known source
/// * `Err(CliError::InvalidSource)` otherwise
pub fn parse_source_arg(s: &str) -> Result<Source, CliError> {
    Source::from_name(s).ok_or_else(|| CliError::InvalidSource(s.to_string()))
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the source is unknown or a duration is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let source = parse_source_arg(&cli.source)?;

        let ttl = match cli.ttl {
            0 => return Err(CliError::ZeroTtl),
            secs if secs > MAX_TTL_SECS => return Err(CliError::TtlOutOfRange(secs)),
            secs => Duration::seconds(secs as i64),
        };

        let refresh_interval = match cli.refresh_secs {
            None => None,
            Some(0) => return Err(CliError::ZeroRefresh),
            Some(secs) => Some(std::time::Duration::from_secs(secs)),
        };

        Ok(StartupConfig {
            source,
            ttl,
            delay: std::time::Duration::from_millis(cli.delay_ms),
            refresh_interval,
            plain: cli.plain,
            log_file: cli.log_file.clone(),
        })
    }

    /// TTL in whole seconds, for display
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }
}
