//! The cache facade.
//!
//! [`Cache`] exposes the command surface on top of a [`KeyValueStore`]:
//! plain values (`set`, `get`, `del`, `dbsize`, `ttl`), integer counters
//! (`incr`) and sorted collections (`zadd`, `zcard`, `zrank`, `zrange`).
//!
//! No command panics or returns an error the caller has to unwind. Queries
//! log a rejected key or argument and answer with a benign default (`0`,
//! `None`, empty). Mutations log and report failure as `false` / `0`; the
//! `try_*` variants return the [`CacheError`] instead.
//!
//! A sorted collection lives under a single key in its encoded form
//! (see [`codec`]). Every mutation reads the whole value, changes an in-memory
//! copy and writes it back under the key's lock.

use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::locks::KeyLocks;
use crate::storage::{millis, ExpirySweeper, KeyValueStore, StorageEngine};
use crate::zset::{codec, Entry, SortedCollection, ZaddOutcome};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Checks that `key` can be used to address a value.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey);
    }
    Ok(())
}

/// Logs a failed command.
fn log_failure(command: &'static str, key: &str, error: &CacheError) {
    warn!(command, key, error = %error, "Command failed");
}

/// An in-process cache with expiring keys and sorted collections.
///
/// # Example
///
/// ```
/// use zcache::Cache;
///
/// let cache = Cache::new();
///
/// cache.zadd("board", ["3 a", "1 b"]);
/// cache.zadd("board", ["2 c"]);
///
/// assert_eq!(cache.zcard("board"), 3);
/// assert_eq!(cache.zrank("board", "a"), Some(2));
///
/// let members: Vec<_> = cache
///     .zrange("board", 0, -1)
///     .into_iter()
///     .map(|e| e.member)
///     .collect();
/// assert_eq!(members, vec!["b", "c", "a"]);
/// ```
pub struct Cache<S = StorageEngine> {
    store: Arc<S>,
    locks: KeyLocks,
    config: CacheConfig,
}

impl<S> std::fmt::Debug for Cache<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("locks", &self.locks)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for Cache<StorageEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache<StorageEngine> {
    /// Creates a cache over a fresh [`StorageEngine`] with default settings.
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache over a fresh [`StorageEngine`].
    pub fn with_config(config: CacheConfig) -> Self {
        Self::with_store(Arc::new(StorageEngine::new()), config)
    }

    /// Starts the background expiry sweeper using the configured settings.
    ///
    /// Must be called from within a tokio runtime. The sweeper stops when the
    /// returned handle is dropped.
    pub fn start_expiry_sweeper(&self) -> ExpirySweeper {
        ExpirySweeper::start(Arc::clone(&self.store), self.config.expiry.clone())
    }
}

impl<S: KeyValueStore> Cache<S> {
    /// Creates a cache over an existing store.
    pub fn with_store(store: Arc<S>, config: CacheConfig) -> Self {
        Self {
            store,
            locks: KeyLocks::new(),
            config,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The configuration this cache was built with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // ========================================================================
    // Plain values
    // ========================================================================

    /// Stores `value` under `key` with the configured default TTL.
    pub fn set(&self, key: &str, value: impl Into<Bytes>) -> bool {
        self.set_with_ttl(key, value, self.config.default_ttl)
    }

    /// Stores `value` under `key`, expiring after `ttl`.
    pub fn set_with_ttl(&self, key: &str, value: impl Into<Bytes>, ttl: Duration) -> bool {
        if let Err(e) = validate_key(key) {
            log_failure("set", key, &e);
            return false;
        }

        let _guard = self.locks.lock(key);
        self.store.set(key, value.into(), ttl);
        trace!(key, ttl_ms = millis(ttl), "Stored value");
        true
    }

    /// Returns the value under `key`, or `None` if absent, expired or invalid.
    pub fn get(&self, key: &str) -> Option<Bytes> {
        if let Err(e) = validate_key(key) {
            log_failure("get", key, &e);
            return None;
        }
        self.store.get(key)
    }

    /// Deletes `key`. Returns `false` only if the key is invalid.
    pub fn del(&self, key: &str) -> bool {
        if let Err(e) = validate_key(key) {
            log_failure("del", key, &e);
            return false;
        }

        let _guard = self.locks.lock(key);
        let removed = self.store.delete(key);
        trace!(key, removed, "Deleted key");
        true
    }

    /// Deletes every key in `keys`. Returns `false` if any key was invalid;
    /// valid keys are deleted regardless.
    pub fn del_many<I, K>(&self, keys: I) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .fold(true, |all_ok, key| self.del(key.as_ref()) && all_ok)
    }

    /// Number of live keys.
    pub fn dbsize(&self) -> u64 {
        self.store.len()
    }

    /// Remaining time-to-live of `key`, or `None` if absent, persistent or invalid.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        self.try_ttl(key).ok().flatten().flatten()
    }

    /// Expiry of `key`: `None` if absent, `Some(None)` if it never expires.
    pub fn try_ttl(&self, key: &str) -> Result<Option<Option<Duration>>> {
        validate_key(key).inspect_err(|e| log_failure("ttl", key, e))?;
        Ok(self.store.ttl(key))
    }

    // ========================================================================
    // Counters
    // ========================================================================

    /// Increments the integer under `key`.
    ///
    /// An absent key is initialized to `0` and `0` is returned; otherwise the
    /// stored value plus one is written back and returned.
    pub fn try_incr(&self, key: &str) -> Result<i64> {
        self.incr_locked(key)
            .inspect_err(|e| log_failure("incr", key, e))
    }

    fn incr_locked(&self, key: &str) -> Result<i64> {
        validate_key(key)?;

        let _guard = self.locks.lock(key);
        let next = match self.store.get(key) {
            None => 0,
            Some(raw) => parse_integer(&raw)
                .and_then(|n| n.checked_add(1))
                .ok_or_else(|| CacheError::InvalidCast {
                    key: key.to_string(),
                })?,
        };

        self.store
            .set(key, Bytes::from(next.to_string()), self.config.default_ttl);
        debug!(key, value = next, "Incremented counter");
        Ok(next)
    }

    /// Like [`try_incr`](Self::try_incr), returning `0` on failure.
    pub fn incr(&self, key: &str) -> i64 {
        self.try_incr(key).unwrap_or(0)
    }

    // ========================================================================
    // Sorted collections
    // ========================================================================

    /// Adds `"<score> <member>"` tokens to the collection under `key`.
    ///
    /// A member that already exists gets the token's score added to its
    /// current score; other members are inserted. Tokens are applied in
    /// order, so a member repeated in one call accumulates every score. If
    /// any token is malformed nothing is written.
    pub fn try_zadd<I, T>(&self, key: &str, tokens: I) -> Result<ZaddOutcome>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        self.zadd_locked(key, tokens)
            .inspect_err(|e| log_failure("zadd", key, e))
    }

    fn zadd_locked<I, T>(&self, key: &str, tokens: I) -> Result<ZaddOutcome>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        validate_key(key)?;

        let proposed = tokens
            .into_iter()
            .map(|token| token.as_ref().parse::<Entry>())
            .collect::<Result<Vec<_>>>()?;
        if proposed.is_empty() {
            return Err(CacheError::Parse("no score/member pairs given".to_string()));
        }

        let _guard = self.locks.lock(key);
        let mut collection = self.load_collection(key)?.unwrap_or_default();
        let outcome = collection.merge(proposed)?;

        self.store
            .set(key, codec::encode(&collection), self.config.default_ttl);
        debug!(
            key,
            added = outcome.added,
            updated = outcome.updated,
            len = collection.len(),
            "Applied ZADD"
        );
        Ok(outcome)
    }

    /// Like [`try_zadd`](Self::try_zadd), returning `1` on success and `0` on failure.
    pub fn zadd<I, T>(&self, key: &str, tokens: I) -> i64
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        match self.try_zadd(key, tokens) {
            Ok(_) => 1,
            Err(_) => 0,
        }
    }

    /// Number of entries in the collection under `key`, `0` if absent or invalid.
    pub fn zcard(&self, key: &str) -> usize {
        self.read_collection("zcard", key)
            .map(|collection| collection.len())
            .unwrap_or(0)
    }

    /// Zero-based rank of `member` in the collection under `key`.
    pub fn zrank(&self, key: &str, member: &str) -> Option<usize> {
        self.read_collection("zrank", key)?.rank(member)
    }

    /// Entries between `start` and `stop` inclusive, in ascending score order.
    ///
    /// Negative indices count from the end. An absent key yields an empty
    /// list; a normalized start after the normalized stop is a
    /// [`CacheError::Range`].
    pub fn try_zrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<Entry>> {
        let result = validate_key(key)
            .and_then(|()| self.load_collection(key))
            .and_then(|collection| match collection {
                Some(collection) => collection.range(start, stop).map(<[Entry]>::to_vec),
                None => Ok(Vec::new()),
            });

        result.inspect_err(|e| log_failure("zrange", key, e))
    }

    /// Like [`try_zrange`](Self::try_zrange), returning an empty list on failure.
    pub fn zrange(&self, key: &str, start: i64, stop: i64) -> Vec<Entry> {
        self.try_zrange(key, start, stop).unwrap_or_default()
    }

    /// Loads the collection for a query, logging failures.
    fn read_collection(&self, command: &'static str, key: &str) -> Option<SortedCollection> {
        validate_key(key)
            .and_then(|()| self.load_collection(key))
            .inspect_err(|e| log_failure(command, key, e))
            .ok()
            .flatten()
    }

    /// Fetches and decodes the collection under `key`; `Ok(None)` if absent.
    fn load_collection(&self, key: &str) -> Result<Option<SortedCollection>> {
        match self.store.get(key) {
            None => Ok(None),
            Some(raw) => codec::decode(&raw)
                .map(Some)
                .ok_or_else(|| CacheError::WrongType {
                    key: key.to_string(),
                }),
        }
    }
}

fn parse_integer(raw: &[u8]) -> Option<i64> {
    std::str::from_utf8(raw).ok()?.parse().ok()
}
