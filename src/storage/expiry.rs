//! Background Expiry Sweeper
//!
//! Reads already ignore expired keys ("lazy expiry"), but a key that is never
//! read again would otherwise sit in memory until the process exits. The
//! sweeper is a tokio task that periodically calls
//! [`StorageEngine::cleanup_expired`] and adapts its interval to how many keys
//! it finds expired: it halves the interval when a large share of keys is
//! expiring and doubles it while nothing is.

use crate::storage::{millis, StorageEngine};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace};

/// Configuration for the expiry sweeper.
#[derive(Debug, Clone)]
pub struct ExpiryConfig {
    /// Base interval between sweeps (default: 100ms)
    pub base_interval: Duration,

    /// Minimum interval between sweeps (default: 10ms)
    pub min_interval: Duration,

    /// Maximum interval between sweeps (default: 1s)
    pub max_interval: Duration,

    /// If this fraction of stored keys expired, speed up sweeping
    pub speedup_threshold: f64,

    /// If fewer than this fraction expired, slow down sweeping
    pub slowdown_threshold: f64,
}

impl Default for ExpiryConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(100),
            min_interval: Duration::from_millis(10),
            max_interval: Duration::from_secs(1),
            speedup_threshold: 0.25,
            slowdown_threshold: 0.01,
        }
    }
}

impl ExpiryConfig {
    /// Computes the interval to wait before the next sweep.
    fn next_interval(&self, current: Duration, stored: u64, expired: u64) -> Duration {
        if stored == 0 {
            return current;
        }

        let rate = expired as f64 / stored as f64;
        if rate > self.speedup_threshold {
            (current / 2).max(self.min_interval)
        } else if expired == 0 && rate < self.slowdown_threshold {
            (current * 2).min(self.max_interval)
        } else {
            current
        }
    }
}

/// A handle to the running expiry sweeper.
///
/// Dropping the handle stops the sweeper task.
#[derive(Debug)]
pub struct ExpirySweeper {
    shutdown_tx: watch::Sender<bool>,
}

impl ExpirySweeper {
    /// Spawns the sweeper on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn start(engine: Arc<StorageEngine>, config: ExpiryConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        info!(
            base_interval_ms = millis(config.base_interval),
            "Starting background expiry sweeper"
        );
        tokio::spawn(sweeper_loop(engine, config, shutdown_rx));

        Self { shutdown_tx }
    }

    /// Stops the sweeper. Called automatically on drop.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            info!("Background expiry sweeper stopped");
        }
    }
}

impl Drop for ExpirySweeper {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn sweeper_loop(
    engine: Arc<StorageEngine>,
    config: ExpiryConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut interval = config.base_interval;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Expiry sweeper received shutdown signal");
                    return;
                }
            }
        }

        let stored = engine.len();
        let expired = engine.cleanup_expired();
        let next = config.next_interval(interval, stored, expired);

        if expired > 0 {
            debug!(
                expired,
                keys_remaining = engine.len(),
                "Expired keys cleaned up"
            );
        }
        if next != interval {
            trace!(
                old_interval_ms = millis(interval),
                new_interval_ms = millis(next),
                "Adjusted sweep interval"
            );
        }

        interval = next;
    }
}
