//! Thread-Safe Storage Engine with Expiry Support
//!
//! This module implements the expiring key-value store that backs the cache.
//! Values are opaque `Bytes`; typed data such as sorted collections is encoded
//! by the layer above and stored here as a single value.
//!
//! ## Design Decisions
//!
//! 1. **Sharded Locks**: Instead of one big lock, we use multiple shards to reduce contention.
//! 2. **Lazy Expiry**: Keys are checked for expiry on access (lazy) plus background cleanup.
//! 3. **RwLock**: Multiple concurrent readers with exclusive writers, via `parking_lot`
//!    so a panicking writer never poisons a shard.
//!
//! ## Concurrency Model
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                           │
//! │  ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐           │
//! │  │ Shard 0 │ │ Shard 1 │ │ Shard 2 │ │ Shard N │           │
//! │  │ RwLock  │ │ RwLock  │ │ RwLock  │ │ RwLock  │           │
//! │  │ HashMap │ │ HashMap │ │ HashMap │ │ HashMap │           │
//! │  └─────────┘ └─────────┘ └─────────┘ └─────────┘           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are distributed across shards using a hash function.

use crate::storage::KeyValueStore;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Number of shards for the storage engine.
const NUM_SHARDS: usize = 64;

/// Returns the stripe a key falls into out of `stripes`.
///
/// Shared with the per-key lock table so both use the same distribution.
#[inline]
pub(crate) fn stripe_for(key: &[u8], stripes: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % stripes
}

/// Represents a stored value with optional expiry time.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The actual value stored
    pub value: Bytes,
    /// When this entry expires (None = never expires)
    pub expires_at: Option<Instant>,
}

impl Entry {
    /// Creates a new entry without expiry.
    pub fn new(value: Bytes) -> Self {
        Self {
            value,
            expires_at: None,
        }
    }

    /// Creates a new entry with TTL.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn with_ttl(value: Bytes, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now().checked_add(ttl),
        }
    }

    /// Checks if this entry has expired.
    #[inline]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|exp| Instant::now() >= exp)
            .unwrap_or(false)
    }

    /// Returns the remaining time-to-live, or None if no expiry.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|exp| exp.saturating_duration_since(Instant::now()))
    }
}

/// A single shard containing a portion of the key-value pairs.
#[derive(Debug)]
struct Shard {
    data: RwLock<HashMap<Bytes, Entry>>,
}

impl Shard {
    fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }
}

/// The expiring key-value store.
///
/// This struct is designed to be wrapped in an `Arc` and shared across
/// threads. All operations are thread-safe.
///
/// # Example
///
/// ```
/// use zcache::storage::StorageEngine;
/// use bytes::Bytes;
/// use std::time::Duration;
///
/// let engine = StorageEngine::new();
///
/// engine.set(Bytes::from("name"), Bytes::from("Ariz"));
/// assert_eq!(engine.get(b"name"), Some(Bytes::from("Ariz")));
///
/// engine.set_with_ttl(Bytes::from("session"), Bytes::from("abc123"), Duration::from_secs(60));
/// ```
pub struct StorageEngine {
    /// Sharded storage for reduced lock contention
    shards: Vec<Shard>,

    /// Number of stored keys, including expired keys not yet swept
    key_count: AtomicU64,
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("shards", &self.shards.len())
            .field("key_count", &self.key_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageEngine {
    /// Creates a new, empty storage engine.
    pub fn new() -> Self {
        let shards = (0..NUM_SHARDS).map(|_| Shard::new()).collect();

        Self {
            shards,
            key_count: AtomicU64::new(0),
        }
    }

    #[inline]
    fn get_shard(&self, key: &[u8]) -> &Shard {
        &self.shards[stripe_for(key, NUM_SHARDS)]
    }

    fn insert(&self, key: Bytes, entry: Entry) -> bool {
        let shard = self.get_shard(&key);
        let mut data = shard.data.write();

        let is_new = data.insert(key, entry).is_none();
        if is_new {
            self.key_count.fetch_add(1, Ordering::Relaxed);
        }

        is_new
    }

    /// Sets a key-value pair without expiry.
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set(&self, key: Bytes, value: Bytes) -> bool {
        self.insert(key, Entry::new(value))
    }

    /// Sets a key-value pair that expires after `ttl`.
    ///
    /// Returns `true` if a new key was created, `false` if an existing key was updated.
    pub fn set_with_ttl(&self, key: Bytes, value: Bytes, ttl: Duration) -> bool {
        self.insert(key, Entry::with_ttl(value, ttl))
    }

    /// Gets the full entry for a key (including metadata).
    ///
    /// Returns `None` if the key doesn't exist or has expired. Expired keys
    /// found here are removed ("lazy expiry").
    pub fn get_entry(&self, key: &[u8]) -> Option<Entry> {
        let shard = self.get_shard(key);

        // Fast path under a read lock
        {
            let data = shard.data.read();
            match data.get(key) {
                Some(entry) if !entry.is_expired() => return Some(entry.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut data = shard.data.write();
        if let Some(entry) = data.get(key) {
            if entry.is_expired() {
                data.remove(key);
                self.key_count.fetch_sub(1, Ordering::Relaxed);
                return None;
            }
            // Another writer replaced the key between the two locks
            return Some(entry.clone());
        }

        None
    }

    /// Gets the value for a key.
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.get_entry(key).map(|entry| entry.value)
    }

    /// Deletes a key.
    ///
    /// Returns `true` if the key was deleted, `false` if it didn't exist.
    pub fn delete(&self, key: &[u8]) -> bool {
        let shard = self.get_shard(key);
        let mut data = shard.data.write();

        if data.remove(key).is_some() {
            self.key_count.fetch_sub(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Gets the remaining TTL for a key.
    ///
    /// - `Some(Some(remaining))` if the key exists and has an expiry
    /// - `Some(None)` if the key exists but never expires
    /// - `None` if the key doesn't exist
    pub fn ttl(&self, key: &[u8]) -> Option<Option<Duration>> {
        self.get_entry(key).map(|entry| entry.remaining())
    }

    /// Returns the number of stored keys, including expired keys that
    /// haven't been swept yet.
    ///
    /// This is an approximation because it uses relaxed atomic ordering.
    pub fn len(&self) -> u64 {
        self.key_count.load(Ordering::Relaxed)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counts the keys that are currently live (not expired).
    pub fn live_len(&self) -> u64 {
        self.shards
            .iter()
            .map(|shard| {
                shard
                    .data
                    .read()
                    .values()
                    .filter(|entry| !entry.is_expired())
                    .count() as u64
            })
            .sum()
    }

    /// Removes expired keys from all shards.
    ///
    /// Called by the background expiry sweeper. Returns the number of keys removed.
    pub fn cleanup_expired(&self) -> u64 {
        let mut cleaned = 0u64;

        for shard in &self.shards {
            let mut data = shard.data.write();
            let before = data.len();

            data.retain(|_, entry| !entry.is_expired());

            cleaned += (before - data.len()) as u64;
        }

        if cleaned > 0 {
            self.key_count.fetch_sub(cleaned, Ordering::Relaxed);
        }

        cleaned
    }
}

impl KeyValueStore for StorageEngine {
    fn get(&self, key: &str) -> Option<Bytes> {
        StorageEngine::get(self, key.as_bytes())
    }

    fn set(&self, key: &str, value: Bytes, ttl: Duration) {
        self.set_with_ttl(Bytes::copy_from_slice(key.as_bytes()), value, ttl);
    }

    fn delete(&self, key: &str) -> bool {
        StorageEngine::delete(self, key.as_bytes())
    }

    fn len(&self) -> u64 {
        self.live_len()
    }

    fn ttl(&self, key: &str) -> Option<Option<Duration>> {
        StorageEngine::ttl(self, key.as_bytes())
    }
}
