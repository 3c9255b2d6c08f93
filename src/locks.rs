//! Striped per-key locks.
//!
//! Every read-modify-write against the store runs while holding the stripe its
//! key hashes to, which makes writes to one key serializable. Keys that share a
//! stripe also serialize with each other. Guards are never held across two
//! keys, so stripes cannot deadlock.

use crate::storage::engine::stripe_for;
use parking_lot::{Mutex, MutexGuard};

/// Number of lock stripes.
const NUM_STRIPES: usize = 64;

pub(crate) struct KeyLocks {
    stripes: Vec<Mutex<()>>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self {
            stripes: (0..NUM_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Blocks until the stripe for `key` is free and returns its guard.
    pub(crate) fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.stripes[stripe_for(key.as_bytes(), NUM_STRIPES)].lock()
    }
}

impl std::fmt::Debug for KeyLocks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLocks")
            .field("stripes", &self.stripes.len())
            .finish()
    }
}
