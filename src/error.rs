//! Error types for cache operations.
//!
//! Every failure is local to the key being operated on. Query commands turn
//! these into benign defaults; mutating commands surface them through their
//! `try_*` variants or as a `false`/`0` result.

use thiserror::Error;

/// Errors that can occur while executing a cache command.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CacheError {
    /// The key was empty
    #[error("key can't be empty")]
    InvalidKey,

    /// A `"<score> <member>"` token could not be parsed
    #[error("invalid score/member token: {0}")]
    Parse(String),

    /// The value under the key is not an integer (or would overflow)
    #[error("the value stored at key '{key}' is not an integer or out of range")]
    InvalidCast { key: String },

    /// Adding to a member's score would leave the finite `f64` range
    #[error("score of member '{member}' would overflow")]
    Overflow { member: String },

    /// The normalized start index lies after the normalized stop index
    #[error("invalid range: start {start} is after stop {stop}")]
    Range { start: i64, stop: i64 },

    /// The value under the key is not an encoded sorted collection
    #[error("the value stored at key '{key}' is not a sorted collection")]
    WrongType { key: String },
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
