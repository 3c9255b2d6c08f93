//! Sorted Collection Module
//!
//! The data type behind `ZADD`, `ZCARD`, `ZRANK` and `ZRANGE`: a set of
//! `(score, member)` pairs kept in ascending score order.
//!
//! - `entry`: the `(score, member)` pair and its `"<score> <member>"` token form
//! - `collection`: [`SortedCollection`] and the [`order_by_score`] primitive
//! - `codec`: the stored representation kept under a single cache key
//!
//! ## Example
//!
//! ```
//! use zcache::zset::{Entry, SortedCollection};
//!
//! let mut board = SortedCollection::new();
//! board.merge(vec![Entry::new(3.0, "a"), Entry::new(1.0, "b")])?;
//! board.merge(vec![Entry::new(2.0, "c")])?;
//!
//! let members: Vec<_> = board.iter().map(|e| e.member.as_str()).collect();
//! assert_eq!(members, vec!["b", "c", "a"]);
//! assert_eq!(board.rank("a"), Some(2));
//! # Ok::<(), zcache::CacheError>(())
//! ```

pub mod codec;
pub mod collection;
pub mod entry;

pub use collection::{order_by_score, SortedCollection, ZaddOutcome};
pub use entry::Entry;
