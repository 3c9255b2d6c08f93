//! Command Handler
//!
//! Turns a tokenized command line into a call on the [`Cache`] and wraps the
//! result in a [`Reply`].
//!
//! ## Supported Commands
//!
//! ### Value Commands
//! - `SET key value [EX seconds | PX milliseconds]` - Set a key (default TTL otherwise)
//! - `GET key` - Get a key's value
//! - `DEL key [key ...]` - Delete keys
//! - `INCR key` - Increment an integer (an absent key starts at 0)
//! - `TTL key` - Remaining TTL in seconds (-1 no expiry, -2 no such key)
//! - `DBSIZE` - Number of live keys
//!
//! ### Sorted Collection Commands
//! - `ZADD key score member [score member ...]` - Add or accumulate scores
//! - `ZCARD key` - Number of members
//! - `ZRANK key member` - Zero-based rank of a member
//! - `ZRANGE key start stop [WITHSCORES]` - Members between two ranks
//!
//! ### Server Commands
//! - `PING [message]`
//! - `COMMAND` - List commands

use crate::cache::Cache;
use crate::commands::Reply;
use crate::storage::{KeyValueStore, StorageEngine};
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Names of every command [`CommandHandler`] understands.
pub const COMMANDS: &[&str] = &[
    "SET", "GET", "DEL", "INCR", "TTL", "DBSIZE", "ZADD", "ZCARD", "ZRANK", "ZRANGE", "PING",
    "COMMAND",
];

/// Dispatches commands to a shared [`Cache`].
pub struct CommandHandler<S = StorageEngine> {
    cache: Arc<Cache<S>>,
}

impl<S> Clone for CommandHandler<S> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
        }
    }
}

impl<S: KeyValueStore> CommandHandler<S> {
    pub fn new(cache: Arc<Cache<S>>) -> Self {
        Self { cache }
    }

    /// Splits `line` on whitespace and executes it.
    pub fn execute_line(&self, line: &str) -> Reply {
        let args: Vec<&str> = line.split_whitespace().collect();
        self.execute(&args)
    }

    /// Executes a command given as its name followed by its arguments.
    pub fn execute(&self, args: &[&str]) -> Reply {
        let Some((name, rest)) = args.split_first() else {
            return Reply::error("ERR empty command");
        };

        let cmd = name.to_uppercase();
        trace!(command = %cmd, args = rest.len(), "Executing command");
        self.dispatch(&cmd, rest)
    }

    fn dispatch(&self, cmd: &str, args: &[&str]) -> Reply {
        match cmd {
            // Value commands
            "SET" => self.cmd_set(args),
            "GET" => self.cmd_get(args),
            "DEL" => self.cmd_del(args),
            "INCR" => self.cmd_incr(args),
            "TTL" => self.cmd_ttl(args),
            "DBSIZE" => self.cmd_dbsize(args),

            // Sorted collection commands
            "ZADD" => self.cmd_zadd(args),
            "ZCARD" => self.cmd_zcard(args),
            "ZRANK" => self.cmd_zrank(args),
            "ZRANGE" => self.cmd_zrange(args),

            // Server commands
            "PING" => self.cmd_ping(args),
            "COMMAND" => self.cmd_command(args),

            _ => Reply::error(format!("ERR unknown command '{}'", cmd)),
        }
    }

    // ========================================================================
    // Helper functions
    // ========================================================================

    fn wrong_arity(cmd: &str) -> Reply {
        Reply::error(format!(
            "ERR wrong number of arguments for '{}' command",
            cmd
        ))
    }

    fn get_integer(value: &str) -> Option<i64> {
        value.parse().ok()
    }

    // ========================================================================
    // Value Commands
    // ========================================================================

    /// SET key value [EX seconds | PX milliseconds]
    fn cmd_set(&self, args: &[&str]) -> Reply {
        let (key, value, options) = match args {
            [key, value, options @ ..] => (*key, *value, options),
            _ => return Self::wrong_arity("SET"),
        };

        let ttl = match options {
            [] => None,
            [unit, amount] => {
                let amount = match Self::get_integer(amount) {
                    Some(n) if n > 0 => n as u64,
                    _ => return Reply::error("ERR invalid expire time"),
                };
                match unit.to_uppercase().as_str() {
                    "EX" => Some(Duration::from_secs(amount)),
                    "PX" => Some(Duration::from_millis(amount)),
                    _ => return Reply::error("ERR syntax error"),
                }
            }
            _ => return Reply::error("ERR syntax error"),
        };

        let value = Bytes::copy_from_slice(value.as_bytes());
        let stored = match ttl {
            Some(ttl) => self.cache.set_with_ttl(key, value, ttl),
            None => self.cache.set(key, value),
        };

        if stored {
            Reply::ok()
        } else {
            Reply::error("ERR invalid key")
        }
    }

    /// GET key
    fn cmd_get(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Self::wrong_arity("GET");
        };

        match self.cache.get(key) {
            Some(value) => Reply::bulk(value),
            None => Reply::nil(),
        }
    }

    /// DEL key [key ...]
    fn cmd_del(&self, args: &[&str]) -> Reply {
        if args.is_empty() {
            return Self::wrong_arity("DEL");
        }

        if self.cache.del_many(args) {
            Reply::ok()
        } else {
            Reply::error("ERR invalid key")
        }
    }

    /// INCR key
    fn cmd_incr(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Self::wrong_arity("INCR");
        };

        match self.cache.try_incr(key) {
            Ok(n) => Reply::integer(n),
            Err(e) => Reply::error(format!("ERR {}", e)),
        }
    }

    /// TTL key
    fn cmd_ttl(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Self::wrong_arity("TTL");
        };

        match self.cache.try_ttl(key) {
            Ok(Some(Some(remaining))) => {
                Reply::integer(i64::try_from(remaining.as_secs()).unwrap_or(i64::MAX))
            }
            Ok(Some(None)) => Reply::integer(-1),
            Ok(None) => Reply::integer(-2),
            Err(e) => Reply::error(format!("ERR {}", e)),
        }
    }

    /// DBSIZE
    fn cmd_dbsize(&self, _args: &[&str]) -> Reply {
        Reply::integer(self.cache.dbsize() as i64)
    }

    // ========================================================================
    // Sorted Collection Commands
    // ========================================================================

    /// ZADD key score member [score member ...]
    ///
    /// Replies `1` once the whole batch is applied.
    fn cmd_zadd(&self, args: &[&str]) -> Reply {
        let (key, pairs) = match args {
            [key, pairs @ ..] if !pairs.is_empty() && pairs.len() % 2 == 0 => (*key, pairs),
            _ => return Self::wrong_arity("ZADD"),
        };

        let tokens = pairs
            .chunks_exact(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]));

        match self.cache.try_zadd(key, tokens) {
            Ok(_) => Reply::integer(1),
            Err(e) => Reply::error(format!("ERR {}", e)),
        }
    }

    /// ZCARD key
    fn cmd_zcard(&self, args: &[&str]) -> Reply {
        let [key] = args else {
            return Self::wrong_arity("ZCARD");
        };

        Reply::integer(self.cache.zcard(key) as i64)
    }

    /// ZRANK key member
    fn cmd_zrank(&self, args: &[&str]) -> Reply {
        let [key, member] = args else {
            return Self::wrong_arity("ZRANK");
        };

        match self.cache.zrank(key, member) {
            Some(rank) => Reply::integer(rank as i64),
            None => Reply::nil(),
        }
    }

    /// ZRANGE key start stop [WITHSCORES]
    fn cmd_zrange(&self, args: &[&str]) -> Reply {
        let (key, start, stop, with_scores) = match args {
            [key, start, stop] => (*key, *start, *stop, false),
            [key, start, stop, flag] if flag.eq_ignore_ascii_case("WITHSCORES") => {
                (*key, *start, *stop, true)
            }
            [_, _, _, _] => return Reply::error("ERR syntax error"),
            _ => return Self::wrong_arity("ZRANGE"),
        };

        let (Some(start), Some(stop)) = (Self::get_integer(start), Self::get_integer(stop)) else {
            return Reply::error("ERR value is not an integer or out of range");
        };

        let entries = match self.cache.try_zrange(key, start, stop) {
            Ok(entries) => entries,
            Err(e) => return Reply::error(format!("ERR {}", e)),
        };

        let mut values = Vec::with_capacity(entries.len() * if with_scores { 2 } else { 1 });
        for entry in entries {
            let score = entry.score;
            values.push(Reply::bulk(entry.member));
            if with_scores {
                values.push(Reply::bulk(score.to_string()));
            }
        }

        Reply::array(values)
    }

    // ========================================================================
    // Server Commands
    // ========================================================================

    /// PING [message]
    fn cmd_ping(&self, args: &[&str]) -> Reply {
        match args {
            [] => Reply::pong(),
            [message, ..] => Reply::bulk(message.to_string()),
        }
    }

    /// COMMAND
    fn cmd_command(&self, _args: &[&str]) -> Reply {
        Reply::array(
            COMMANDS
                .iter()
                .map(|name| Reply::bulk(*name))
                .collect(),
        )
    }
}
