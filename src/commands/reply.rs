//! Command Replies
//!
//! A [`Reply`] is what a command evaluates to. It mirrors the shapes Redis
//! clients know (status, error, integer, bulk string, nil, array) and renders
//! the way `redis-cli` prints them:
//!
//! ```text
//! OK
//! (error) ERR invalid range: start 3 is after stop 1
//! (integer) 2
//! "alice"
//! (nil)
//! 1) "bob"
//! 2) "alice"
//! ```

use bytes::Bytes;
use std::fmt;

/// The result of executing one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A short status such as `OK` or `PONG`
    Status(String),

    /// A failed command, message starting with an error code like `ERR`
    Error(String),

    /// A 64-bit signed integer
    Integer(i64),

    /// A binary-safe string
    Bulk(Bytes),

    /// Absence of a value
    Nil,

    /// A list of replies
    Array(Vec<Reply>),
}

impl Reply {
    pub fn status(s: impl Into<String>) -> Self {
        Reply::Status(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        Reply::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        Reply::Integer(n)
    }

    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Reply::Bulk(data.into())
    }

    pub fn nil() -> Self {
        Reply::Nil
    }

    pub fn array(values: Vec<Reply>) -> Self {
        Reply::Array(values)
    }

    /// Common reply for successful operations
    pub fn ok() -> Self {
        Reply::status("OK")
    }

    /// Reply to `PING`
    pub fn pong() -> Self {
        Reply::status("PONG")
    }

    /// Returns true if this reply is an error.
    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(s) => write!(f, "{}", s),
            Reply::Error(s) => write!(f, "(error) {}", s),
            Reply::Integer(n) => write!(f, "(integer) {}", n),
            Reply::Bulk(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
            },
            Reply::Nil => write!(f, "(nil)"),
            Reply::Array(values) if values.is_empty() => write!(f, "(empty array)"),
            Reply::Array(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}) {}", i + 1, value)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_scalars() {
        assert_eq!(Reply::ok().to_string(), "OK");
        assert_eq!(Reply::error("ERR nope").to_string(), "(error) ERR nope");
        assert_eq!(Reply::integer(-42).to_string(), "(integer) -42");
        assert_eq!(Reply::bulk("hello").to_string(), "\"hello\"");
        assert_eq!(Reply::nil().to_string(), "(nil)");
    }

    #[test]
    fn test_display_binary_bulk() {
        let reply = Reply::bulk(Bytes::from_static(&[0xff, 0x00, 0x01]));
        assert_eq!(reply.to_string(), "(binary data, 3 bytes)");
    }

    #[test]
    fn test_display_array() {
        assert_eq!(Reply::array(vec![]).to_string(), "(empty array)");

        let reply = Reply::array(vec![Reply::bulk("b"), Reply::bulk("a")]);
        assert_eq!(reply.to_string(), "1) \"b\"\n2) \"a\"");
    }

    #[test]
    fn test_is_error() {
        assert!(Reply::error("ERR x").is_error());
        assert!(!Reply::nil().is_error());
    }
}
