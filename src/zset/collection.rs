//! The in-memory sorted collection.
//!
//! Entries are kept in a `Vec` ordered ascending by score. Equal scores keep
//! the order in which members were first inserted or merged, because every
//! mutation finishes with one stable sort over the whole vector. A member to
//! position index is rebuilt after each sort so rank lookups always reflect the
//! current order.

use crate::error::{CacheError, Result};
use crate::zset::Entry;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Sorts entries ascending by score, keeping the relative order of equal scores.
///
/// `-0.0` and `0.0` compare equal, so they keep their relative order too.
pub fn order_by_score(mut entries: Vec<Entry>) -> Vec<Entry> {
    // Scores are finite, so the fallback is never taken
    entries.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
    entries
}

/// What a merge did to a collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZaddOutcome {
    /// Members that were not present before
    pub added: usize,
    /// Score additions applied to members that were already present
    /// (including members added earlier in the same merge)
    pub updated: usize,
}

/// An ordered set of `(score, member)` pairs with unique members.
#[derive(Debug, Clone, Default)]
pub struct SortedCollection {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl SortedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from entries that were previously stored.
    ///
    /// Returns `None` if a member appears twice.
    pub(crate) fn from_stored(entries: Vec<Entry>) -> Option<Self> {
        let mut collection = Self {
            entries: order_by_score(entries),
            index: HashMap::new(),
        };
        collection.rebuild_index();

        (collection.index.len() == collection.entries.len()).then_some(collection)
    }

    /// Applies proposed entries in order, then re-sorts.
    ///
    /// A member that is already present has the proposed score added to its
    /// current one; anything else is appended as a new entry. If any
    /// resulting score would not be finite, returns [`CacheError::Overflow`]
    /// and leaves the collection untouched.
    pub fn merge<I>(&mut self, proposed: I) -> Result<ZaddOutcome>
    where
        I: IntoIterator<Item = Entry>,
    {
        let proposed: Vec<Entry> = proposed.into_iter().collect();
        self.check_totals(&proposed)?;

        let mut outcome = ZaddOutcome::default();

        for entry in proposed {
            match self.index.get(&entry.member) {
                Some(&position) => {
                    self.entries[position].score += entry.score;
                    outcome.updated += 1;
                }
                None => {
                    self.index.insert(entry.member.clone(), self.entries.len());
                    self.entries.push(entry);
                    outcome.added += 1;
                }
            }
        }

        self.entries = order_by_score(std::mem::take(&mut self.entries));
        self.rebuild_index();

        Ok(outcome)
    }

    /// Replays the score additions of a merge without applying them.
    fn check_totals(&self, proposed: &[Entry]) -> Result<()> {
        let mut totals: HashMap<&str, f64> = HashMap::new();

        for entry in proposed {
            let total = totals.entry(entry.member.as_str()).or_insert_with(|| {
                self.index
                    .get(&entry.member)
                    .map_or(0.0, |&position| self.entries[position].score)
            });
            *total += entry.score;

            if !total.is_finite() {
                return Err(CacheError::Overflow {
                    member: entry.member.clone(),
                });
            }
        }

        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (position, entry) in self.entries.iter().enumerate() {
            self.index.insert(entry.member.clone(), position);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Zero-based position of `member` in ascending score order.
    pub fn rank(&self, member: &str) -> Option<usize> {
        self.index.get(member).copied()
    }

    /// Returns the entries between `start` and `stop`, both inclusive.
    ///
    /// Negative indices count from the end (`-1` is the last entry). Both
    /// bounds are normalized first; a normalized start after the normalized
    /// stop is a [`CacheError::Range`]. Bounds reaching past either end of the
    /// collection select nothing there.
    pub fn range(&self, start: i64, stop: i64) -> Result<&[Entry]> {
        if self.entries.is_empty() {
            return Ok(&[]);
        }

        let len = self.entries.len() as i64;
        let normalize = |index: i64| if index < 0 { len + index } else { index };
        let (from, to) = (normalize(start), normalize(stop));

        if from > to {
            return Err(CacheError::Range { start, stop });
        }

        let from = from.max(0);
        let to = to.min(len - 1);
        if from > to {
            return Ok(&[]);
        }

        Ok(&self.entries[from as usize..=to as usize])
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a SortedCollection {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.member.as_str()).collect()
    }

    fn collection(pairs: &[(f64, &str)]) -> SortedCollection {
        let mut collection = SortedCollection::new();
        collection
            .merge(pairs.iter().map(|&(score, member)| Entry::new(score, member)))
            .unwrap();
        collection
    }

    #[test]
    fn test_order_by_score_is_stable() {
        let sorted = order_by_score(vec![
            Entry::new(2.0, "x"),
            Entry::new(1.0, "y"),
            Entry::new(2.0, "a"),
            Entry::new(-0.5, "z"),
            Entry::new(1.0, "b"),
        ]);

        assert_eq!(members(&sorted), vec!["z", "y", "b", "x", "a"]);
    }

    #[test]
    fn test_order_by_score_fractional() {
        let sorted = order_by_score(vec![
            Entry::new(0.3, "c"),
            Entry::new(0.25, "b"),
            Entry::new(0.2, "a"),
        ]);

        assert_eq!(members(&sorted), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_merge_inserts_and_sorts() {
        let mut board = collection(&[(3.0, "a"), (1.0, "b")]);
        let outcome = board.merge(vec![Entry::new(2.0, "c")]).unwrap();

        assert_eq!(outcome, ZaddOutcome { added: 1, updated: 0 });
        assert_eq!(members(board.entries()), vec!["b", "c", "a"]);
        assert_eq!(board.rank("a"), Some(2));
        assert_eq!(board.rank("z"), None);
    }

    #[test]
    fn test_merge_accumulates_scores() {
        let mut board = collection(&[(5.0, "m")]);
        let outcome = board.merge(vec![Entry::new(1.0, "m")]).unwrap();

        assert_eq!(outcome, ZaddOutcome { added: 0, updated: 1 });
        assert_eq!(board.len(), 1);
        assert_eq!(board.entries()[0], Entry::new(6.0, "m"));
    }

    #[test]
    fn test_merge_folds_duplicates_in_one_call() {
        let mut board = SortedCollection::new();
        let outcome = board
            .merge(vec![
                Entry::new(1.0, "a"),
                Entry::new(4.0, "b"),
                Entry::new(2.5, "a"),
            ])
            .unwrap();

        assert_eq!(outcome, ZaddOutcome { added: 2, updated: 1 });
        assert_eq!(board.len(), 2);
        assert_eq!(board.entries()[0], Entry::new(3.5, "a"));
        assert_eq!(board.entries()[1], Entry::new(4.0, "b"));
    }

    #[test]
    fn test_merge_reorders_after_update() {
        let mut board = collection(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]);
        board
            .merge(vec![Entry::new(10.0, "a"), Entry::new(-5.0, "c")])
            .unwrap();

        assert_eq!(members(board.entries()), vec!["c", "b", "a"]);
        assert_eq!(board.rank("c"), Some(0));
        assert_eq!(board.rank("a"), Some(2));
    }

    #[test]
    fn test_order_by_score_signed_zero_is_a_tie() {
        let sorted = order_by_score(vec![Entry::new(0.0, "first"), Entry::new(-0.0, "second")]);
        assert_eq!(members(&sorted), vec!["first", "second"]);

        let mut board = SortedCollection::new();
        board
            .merge(vec![Entry::new(-0.0, "a"), Entry::new(0.0, "b")])
            .unwrap();
        assert_eq!(members(board.entries()), vec!["a", "b"]);
    }

    #[test]
    fn test_merge_rejects_overflowing_score() {
        let mut board = collection(&[(1e308, "m"), (1.0, "other")]);

        let result = board.merge(vec![Entry::new(2.0, "x"), Entry::new(1e308, "m")]);

        assert_eq!(
            result,
            Err(CacheError::Overflow {
                member: "m".to_string()
            })
        );
        // Nothing from the failed merge was applied
        assert_eq!(members(board.entries()), vec!["other", "m"]);
        assert_eq!(board.rank("x"), None);
        assert_eq!(board.entries()[1].score, 1e308);
    }

    #[test]
    fn test_merge_rejects_overflow_within_one_call() {
        let mut board = SortedCollection::new();

        let result = board.merge(vec![Entry::new(-1e308, "m"), Entry::new(-1e308, "m")]);

        assert!(matches!(result, Err(CacheError::Overflow { .. })));
        assert!(board.is_empty());
    }

    #[test]
    fn test_range_positive_and_negative() {
        let board = collection(&[
            (1.0, "one"),
            (2.0, "two"),
            (3.0, "three"),
            (4.0, "four"),
            (5.0, "five"),
        ]);

        assert_eq!(members(board.range(-2, -1).unwrap()), vec!["four", "five"]);
        assert_eq!(members(board.range(1, 2).unwrap()), vec!["two", "three"]);
        assert_eq!(board.range(0, -1).unwrap().len(), 5);
        assert_eq!(members(board.range(-1, 4).unwrap()), vec!["five"]);
    }

    #[test]
    fn test_range_out_of_bounds() {
        let board = collection(&[(1.0, "a"), (2.0, "b"), (3.0, "c")]);

        assert_eq!(members(board.range(-10, 1).unwrap()), vec!["a", "b"]);
        assert_eq!(members(board.range(1, 100).unwrap()), vec!["b", "c"]);
        assert!(board.range(5, 10).unwrap().is_empty());
        assert!(board.range(-10, -5).unwrap().is_empty());
    }

    #[test]
    fn test_range_start_after_stop() {
        let board = collection(&[(1.0, "a"), (2.0, "b"), (3.0, "c"), (4.0, "d")]);

        assert_eq!(
            board.range(3, 1),
            Err(CacheError::Range { start: 3, stop: 1 })
        );
        // -1 normalizes to 3, which is after 2
        assert_eq!(
            board.range(-1, 2),
            Err(CacheError::Range { start: -1, stop: 2 })
        );
    }

    #[test]
    fn test_range_on_empty_collection() {
        let board = SortedCollection::new();
        assert!(board.range(0, -1).unwrap().is_empty());
    }

    #[test]
    fn test_from_stored_rejects_duplicate_members() {
        assert!(SortedCollection::from_stored(vec![
            Entry::new(1.0, "a"),
            Entry::new(2.0, "a"),
        ])
        .is_none());

        let restored =
            SortedCollection::from_stored(vec![Entry::new(2.0, "b"), Entry::new(1.0, "a")])
                .unwrap();
        assert_eq!(restored.rank("a"), Some(0));
    }
}
