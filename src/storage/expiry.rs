//! Background Cache Sweeper
//!
//! The cache only decides staleness on read, so a word that is looked up once
//! and never again would keep its entry until the shard fills up. The sweeper
//! runs as a Tokio task and periodically purges stale entries from every shard.
//!
//! ## Design
//!
//! The sweeper:
//! 1. Sleeps for the configured interval
//! 2. Wakes up and purges stale entries across all shards
//! 3. Logs how many entries were removed
//!
//! It stops when its handle is dropped or [`CacheSweeper::stop`] is called.

use crate::storage::TtlCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Default interval between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// A handle to the running sweeper.
///
/// When this handle is dropped, the sweeper task will be stopped.
#[derive(Debug)]
pub struct CacheSweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl CacheSweeper {
    /// Starts the sweeper as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use anagramd::storage::{AnagramCache, CacheSweeper};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let cache = Arc::new(AnagramCache::default());
    /// let sweeper = CacheSweeper::start(Arc::clone(&cache), Duration::from_secs(1));
    ///
    /// // Dropping the sweeper will stop it
    /// drop(sweeper);
    /// ```
    pub fn start<V>(cache: Arc<TtlCache<V>>, interval: Duration) -> Self
    where
        V: Clone + Send + Sync + 'static,
    {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        tokio::spawn(sweeper_loop(cache, interval, shutdown_rx));

        info!(interval_ms = interval.as_millis() as u64, "Cache sweeper started");

        Self { shutdown_tx }
    }

    /// Stops the sweeper.
    ///
    /// This is called automatically when the handle is dropped.
    pub fn stop(&self) {
        if !*self.shutdown_tx.borrow() {
            let _ = self.shutdown_tx.send(true);
            debug!("Cache sweeper stopped");
        }
    }
}

impl Drop for CacheSweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop<V>(
    cache: Arc<TtlCache<V>>,
    interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    V: Clone + Send + Sync + 'static,
{
    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    trace!("Cache sweeper received shutdown signal");
                    return;
                }
            }
        }

        let purged = cache.purge_expired();

        if purged > 0 {
            debug!(
                purged = purged,
                remaining = cache.len(),
                "Stale cache entries purged"
            );
        }
    }
}
