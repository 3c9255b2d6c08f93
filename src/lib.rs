//! # zcache - An Embeddable In-Process Cache with Sorted Collections
//!
//! zcache is a thread-safe, in-memory key-value cache with per-key expiry,
//! integer counters and score-ordered collections (`ZADD` / `ZCARD` /
//! `ZRANK` / `ZRANGE`). It is meant to be linked into a process and shared
//! between threads through an `Arc<Cache>`.
//!
//! ## Features
//!
//! - **Expiring values**: every write carries a TTL (30 minutes unless given)
//! - **Sorted collections**: members ordered by `f64` score, ties kept in
//!   insertion order, repeated adds accumulate score
//! - **Atomic read-modify-write**: `INCR` and `ZADD` are serialized per key
//! - **Pluggable store**: the cache runs on anything implementing
//!   [`KeyValueStore`]
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                                zcache                                │
//! │                                                                      │
//! │  ┌─────────────┐    ┌──────────────────────────────────────────┐     │
//! │  │  Command    │───>│                 Cache                    │     │
//! │  │  Handler    │    │  KeyLocks (64 stripes)    zset codec     │     │
//! │  └─────────────┘    └────────────────────┬─────────────────────┘     │
//! │                                          │ KeyValueStore             │
//! │                                          ▼                           │
//! │                     ┌──────────────────────────────────────────┐     │
//! │                     │              StorageEngine               │     │
//! │                     │  ┌────────┐ ┌────────┐ ┌────────┐        │     │
//! │                     │  │Shard 0 │ │Shard 1 │ │...N    │        │     │
//! │                     │  │RwLock  │ │RwLock  │ │shards  │        │     │
//! │                     │  └────────┘ └────────┘ └────────┘        │     │
//! │                     └──────────────────────────────────────────┘     │
//! │                                          ▲                           │
//! │                     ┌────────────────────┴─────────────────────┐     │
//! │                     │     ExpirySweeper (Background Tokio Task)│     │
//! │                     └──────────────────────────────────────────┘     │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use zcache::Cache;
//!
//! let cache = Cache::new();
//!
//! cache.zadd("board", ["3 alice", "1 bob"]);
//! cache.zadd("board", ["2 carol"]);
//!
//! let members: Vec<_> = cache
//!     .zrange("board", 0, -1)
//!     .into_iter()
//!     .map(|e| e.member)
//!     .collect();
//! assert_eq!(members, vec!["bob", "carol", "alice"]);
//! assert_eq!(cache.zrank("board", "alice"), Some(2));
//!
//! assert_eq!(cache.incr("visits"), 0);
//! assert_eq!(cache.incr("visits"), 1);
//! ```
//!
//! ## Module Overview
//!
//! - [`cache`]: the [`Cache`] facade and its commands
//! - [`zset`]: the sorted collection type and its stored encoding
//! - [`storage`]: the sharded expiring store and background sweeper
//! - [`commands`]: text command dispatch used by the `zcache` shell
//! - [`config`]: [`CacheConfig`]
//! - [`error`]: [`CacheError`]
//!
//! ## Lazy + Active Expiry
//!
//! Keys are expired in two ways:
//! 1. **Lazy**: a read of an expired key removes it and reports it absent
//! 2. **Active**: [`Cache::start_expiry_sweeper`] spawns a task that
//!    periodically removes expired keys

pub mod cache;
pub mod commands;
pub mod config;
pub mod error;
mod locks;
pub mod storage;
pub mod zset;

// Re-export commonly used types for convenience
pub use cache::{validate_key, Cache};
pub use commands::{CommandHandler, Reply};
pub use config::{CacheConfig, DEFAULT_TTL};
pub use error::{CacheError, Result};
pub use storage::{ExpiryConfig, ExpirySweeper, KeyValueStore, StorageEngine};
pub use zset::{order_by_score, Entry, SortedCollection, ZaddOutcome};

/// Version of zcache
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
