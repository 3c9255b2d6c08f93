//! Storage Module
//!
//! The expiring key-value store the cache is layered on. The cache only talks
//! to it through the [`KeyValueStore`] trait; [`StorageEngine`] is the
//! in-process implementation, with a background [`ExpirySweeper`] for active
//! expiry.
//!
//! ## Example
//!
//! ```
//! use zcache::storage::{KeyValueStore, StorageEngine};
//! use bytes::Bytes;
//! use std::time::Duration;
//!
//! let engine = StorageEngine::new();
//! engine.set_with_ttl(Bytes::from("session"), Bytes::from("token123"), Duration::from_secs(3600));
//!
//! let store: &dyn KeyValueStore = &engine;
//! assert_eq!(store.get("session"), Some(Bytes::from("token123")));
//! assert_eq!(store.len(), 1);
//! ```

pub mod engine;
pub mod expiry;

use bytes::Bytes;
use std::time::Duration;

pub use engine::{Entry, StorageEngine};
pub use expiry::{ExpiryConfig, ExpirySweeper};

/// The contract the cache needs from an expiring key-value store.
///
/// Implementations must be safe to share between threads. None of these
/// calls may block on I/O; an expired key behaves exactly like an absent one.
pub trait KeyValueStore: Send + Sync {
    /// Returns the value under `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Option<Bytes>;

    /// Stores `value` under `key`, replacing any previous value, expiring after `ttl`.
    fn set(&self, key: &str, value: Bytes, ttl: Duration);

    /// Removes `key`. Returns `true` if something was removed.
    fn delete(&self, key: &str) -> bool;

    /// Number of live (non-expired) keys.
    fn len(&self) -> u64;

    /// Expiry of `key`.
    ///
    /// - `Some(Some(remaining))` if the key exists and has an expiry
    /// - `Some(None)` if the key exists but never expires
    /// - `None` if the key doesn't exist
    fn ttl(&self, key: &str) -> Option<Option<Duration>>;

    /// Returns true if no live keys are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1500)), 1500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
