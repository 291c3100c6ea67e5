//! Background data refresh system
//!
//! Drives the memoized fetcher from a background task and reports progress to
//! the main loop over tokio channels. Loads happen once at startup, on every
//! auto-refresh tick, and whenever the UI asks for one.

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::{ItemFetchResult, ItemFetcher};

/// Shortest interval accepted for auto-refresh
const MIN_INTERVAL: Duration = Duration::from_millis(100);

/// Messages sent from background refresh to main app
#[derive(Debug, Clone)]
pub enum RefreshMessage {
    /// A fetch that will miss the cache has started
    Loading,
    /// Items are available (fresh from the API or served from cache)
    Loaded(ItemFetchResult),
    /// The fetch failed
    Failed(String),
}

/// Requests the UI can make of the refresh task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCommand {
    /// Ask for data again; a fresh cache entry is served as-is
    Revalidate,
    /// Drop the cache entry first so the API is hit
    Force,
}

/// Configuration for auto-refresh
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Interval between automatic revalidations
    pub interval: Duration,
    /// Whether auto-refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            enabled: false,
        }
    }
}

/// Handle for controlling the background refresh system
pub struct RefreshHandle {
    /// Channel for receiving refresh messages
    pub receiver: mpsc::Receiver<RefreshMessage>,
    command_tx: mpsc::Sender<RefreshCommand>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the background refresh task
    ///
    /// # Arguments
    /// * `fetcher` - The memoized fetcher to drive
    /// * `config` - Auto-refresh settings
    ///
    /// # Returns
    /// A RefreshHandle that receives updates via the `receiver` channel
    pub fn spawn(fetcher: ItemFetcher, config: RefreshConfig) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(32);
        let (command_tx, mut command_rx) = mpsc::channel::<RefreshCommand>(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            load(&fetcher, &msg_tx).await;

            let mut interval = tokio::time::interval(config.interval.max(MIN_INTERVAL));
            // Skip the first tick (immediate)
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick(), if config.enabled => {
                        debug!("auto-refresh tick");
                        load(&fetcher, &msg_tx).await;
                    }
                    command = command_rx.recv() => match command {
                        Some(RefreshCommand::Revalidate) => load(&fetcher, &msg_tx).await,
                        Some(RefreshCommand::Force) => {
                            fetcher.invalidate();
                            load(&fetcher, &msg_tx).await;
                        }
                        None => break,
                    },
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
            debug!("refresh task stopped");
        });

        Self {
            receiver: msg_rx,
            command_tx,
            shutdown_tx,
        }
    }

    /// Queues a refresh request without blocking
    ///
    /// Requests made while the queue is full are dropped; one is already pending.
    pub fn request(&self, command: RefreshCommand) {
        if self.command_tx.try_send(command).is_err() {
            debug!(?command, "refresh request dropped, queue full");
        }
    }

    /// Shuts down the background refresh task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

/// Runs one `get_data` call and reports the outcome
async fn load(fetcher: &ItemFetcher, tx: &mpsc::Sender<RefreshMessage>) {
    if !fetcher.is_fresh() {
        let _ = tx.send(RefreshMessage::Loading).await;
    }

    let message = match fetcher.get_data().await {
        Ok(result) => RefreshMessage::Loaded(result),
        Err(error) => {
            warn!(%error, "refresh failed");
            RefreshMessage::Failed(error.to_string())
        }
    };
    let _ = tx.send(message).await;
}

/// Checks for pending refresh messages without blocking
///
/// # Returns
/// * `Some(RefreshMessage)` if a message was available
/// * `None` if no messages are pending
pub fn try_recv(handle: &mut RefreshHandle) -> Option<RefreshMessage> {
    handle.receiver.try_recv().ok()
}
