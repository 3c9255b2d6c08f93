//! Stored representation of a sorted collection.
//!
//! ```text
//! zset:1\n
//! <score> <member>\n
//! <score> <member>\n
//! ...
//! ```
//!
//! UTF-8 text, one entry per line in ascending score order. The header marks
//! the value as a collection so that a plain string stored under the same key
//! is never mistaken for one.

use crate::zset::{Entry, SortedCollection};
use bytes::{BufMut, Bytes, BytesMut};

/// First line of every encoded collection.
pub const HEADER: &str = "zset:1";

/// Encodes a collection into its stored form.
pub fn encode(collection: &SortedCollection) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER.len() + 1 + collection.len() * 16);
    buf.put_slice(HEADER.as_bytes());
    buf.put_u8(b'\n');

    for entry in collection {
        buf.put_slice(entry.to_string().as_bytes());
        buf.put_u8(b'\n');
    }

    buf.freeze()
}

/// Decodes a stored collection.
///
/// Returns `None` when the bytes are not an encoded collection: missing
/// header, invalid UTF-8, a malformed line or a repeated member.
pub fn decode(raw: &[u8]) -> Option<SortedCollection> {
    let text = std::str::from_utf8(raw).ok()?;
    let mut lines = text.lines();

    if lines.next()? != HEADER {
        return None;
    }

    let entries = lines
        .map(|line| line.parse::<Entry>().ok())
        .collect::<Option<Vec<_>>>()?;

    SortedCollection::from_stored(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        let mut board = SortedCollection::new();
        board
            .merge(vec![Entry::new(3.0, "a"), Entry::new(1.5, "b")])
            .unwrap();

        assert_eq!(encode(&board), Bytes::from("zset:1\n1.5 b\n3 a\n"));
    }

    #[test]
    fn test_decode_restores_order_and_scores() {
        let mut board = SortedCollection::new();
        board
            .merge(vec![
                Entry::new(0.1, "x"),
                Entry::new(-7.0, "y"),
                Entry::new(0.1, "z"),
            ])
            .unwrap();

        let restored = decode(&encode(&board)).unwrap();
        assert_eq!(restored.entries(), board.entries());
        assert_eq!(restored.rank("z"), Some(2));
    }

    #[test]
    fn test_decode_empty_collection() {
        let restored = decode(&encode(&SortedCollection::new())).unwrap();
        assert!(restored.is_empty());
    }

    #[test]
    fn test_decode_rejects_foreign_values() {
        assert!(decode(b"").is_none());
        assert!(decode(b"42").is_none());
        assert!(decode(b"1 a\n2 b\n").is_none());
        assert!(decode(b"zset:1\n1 a\nbroken\n").is_none());
        assert!(decode(b"zset:1\n1 a\n2 a\n").is_none());
        assert!(decode(&[0xff, 0xfe]).is_none());
    }
}
