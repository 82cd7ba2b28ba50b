//! Background Janitor
//!
//! Lazy expiry only removes an expired key when somebody reads it. A key
//! that is set with a TTL and never read again would stay in memory
//! forever, so the janitor sweeps the whole store on a fixed period.
//!
//! The sweep holds the store's write lock for the full scan; its cost grows
//! with the number of stored keys.
//!
//! The task runs until its [`Janitor`] handle is stopped or dropped. The
//! shutdown signal is only observed between sweeps.

use crate::storage::Store;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Configuration for the janitor.
#[derive(Debug, Clone)]
pub struct JanitorConfig {
    /// Time between sweeps (default: 1s)
    pub interval: Duration,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
        }
    }
}

/// A handle to the running janitor task.
///
/// When this handle is dropped, the janitor stops.
#[derive(Debug)]
pub struct Janitor {
    shutdown_tx: watch::Sender<bool>,
}

impl Janitor {
    /// Spawns the janitor on the current tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use litekv::storage::{Store, Janitor, JanitorConfig};
    /// use std::sync::Arc;
    ///
    /// let store = Arc::new(Store::new());
    /// let janitor = Janitor::start(store, JanitorConfig::default());
    ///
    /// // Sweeps once a second until dropped
    /// drop(janitor);
    /// ```
    pub fn start(store: Arc<Store>, config: JanitorConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            interval_ms = config.interval.as_millis() as u64,
            "Janitor started"
        );
        tokio::spawn(janitor_loop(store, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Signals the janitor to stop after its current sleep.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            info!("Janitor stopped");
        }
    }
}

impl Drop for Janitor {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn janitor_loop(
    store: Arc<Store>,
    config: JanitorConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = tokio::time::sleep(config.interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Janitor received shutdown signal");
                    return;
                }
            }
        }

        let removed = store.sweep_expired();

        if removed > 0 {
            debug!(removed, remaining = store.len(), "Swept expired keys");
        } else {
            trace!("Sweep found nothing to remove");
        }
    }
}

/// Starts the janitor with the default one-second period.
pub fn start_janitor(store: Arc<Store>) -> Janitor {
    Janitor::start(store, JanitorConfig::default())
}
