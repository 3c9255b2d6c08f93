//! A single `(score, member)` pair and its `"<score> <member>"` token form.

use crate::error::CacheError;
use std::fmt;
use std::str::FromStr;

/// One `(score, member)` pair of a sorted collection.
///
/// Scores are finite `f64`s and may be negative or fractional. Members never
/// contain whitespace, since whitespace separates the score from the member
/// in the token form.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub score: f64,
    pub member: String,
}

impl Entry {
    pub fn new(score: f64, member: impl Into<String>) -> Self {
        Self {
            score,
            member: member.into(),
        }
    }
}

/// Parses a `"<score> <member>"` token.
///
/// Exactly two whitespace-separated fields are required: a finite number and
/// a non-empty member.
impl FromStr for Entry {
    type Err = CacheError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut fields = token.split_whitespace();

        let (score, member) = match (fields.next(), fields.next(), fields.next()) {
            (Some(score), Some(member), None) => (score, member),
            _ => {
                return Err(CacheError::Parse(format!(
                    "expected '<score> <member>', got '{}'",
                    token
                )))
            }
        };

        let score: f64 = score
            .parse()
            .map_err(|_| CacheError::Parse(format!("score '{}' is not a number", score)))?;
        if !score.is_finite() {
            return Err(CacheError::Parse(format!(
                "score '{}' is not a finite number",
                score
            )));
        }

        Ok(Entry::new(score, member))
    }
}

/// Formats the entry back into its token form. `f64`'s shortest round-trip
/// formatting keeps `6.0` as `6` and `0.1` as `0.1`.
impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.score, self.member)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_token() {
        let entry: Entry = "5 alice".parse().unwrap();
        assert_eq!(entry, Entry::new(5.0, "alice"));

        let entry: Entry = "-1.25 bob".parse().unwrap();
        assert_eq!(entry, Entry::new(-1.25, "bob"));

        // Extra whitespace around the fields is tolerated
        let entry: Entry = "  3   carol ".parse().unwrap();
        assert_eq!(entry, Entry::new(3.0, "carol"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!("".parse::<Entry>(), Err(CacheError::Parse(_))));
        assert!(matches!("5".parse::<Entry>(), Err(CacheError::Parse(_))));
        assert!(matches!(
            "5 two words".parse::<Entry>(),
            Err(CacheError::Parse(_))
        ));
        assert!(matches!(
            "five alice".parse::<Entry>(),
            Err(CacheError::Parse(_))
        ));
        assert!(matches!("NaN x".parse::<Entry>(), Err(CacheError::Parse(_))));
        assert!(matches!("inf x".parse::<Entry>(), Err(CacheError::Parse(_))));
    }

    #[test]
    fn test_display() {
        assert_eq!(Entry::new(6.0, "m").to_string(), "6 m");
        assert_eq!(Entry::new(0.1, "m").to_string(), "0.1 m");
        assert_eq!(Entry::new(-2.5, "m").to_string(), "-2.5 m");
    }
}
