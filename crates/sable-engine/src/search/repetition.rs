//! Repetition table for draw detection along the game and search path.

use std::collections::HashMap;

/// Multiset of position keys that occurred *before* the node being searched.
///
/// Holds the game history preceding the root plus every ancestor on the
/// current search path. The search increments a node's key around each child
/// search and decrements it afterward, so once the search is back at the root
/// the counts equal the game-history counts again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepetitionTable {
    counts: HashMap<u64, u32>,
}

impl RepetitionTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with the keys of the game history.
    pub fn reset_to(&mut self, history: &[u64]) {
        self.counts.clear();
        for &key in history {
            self.push(key);
        }
    }

    /// Record one more occurrence of `key`.
    pub fn push(&mut self, key: u64) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    /// Remove one occurrence of `key`, pairing an earlier [`push`](Self::push).
    pub fn pop(&mut self, key: u64) {
        if let Some(count) = self.counts.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&key);
            }
        } else {
            debug_assert!(false, "repetition pop without matching push for {key:#018x}");
        }
    }

    /// Number of recorded prior occurrences of `key`.
    pub fn count(&self, key: u64) -> u32 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Whether reaching `key` again repeats it often enough to be a draw.
    ///
    /// `threshold` counts prior occurrences: 2 means the current visit is the
    /// third, i.e. threefold repetition.
    pub fn is_repetition(&self, key: u64, threshold: u32) -> bool {
        self.count(key) >= threshold
    }

    /// Number of distinct keys recorded.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
