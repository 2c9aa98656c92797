//! Transposition table keyed by the position's Zobrist key.
//!
//! A power-of-two array of slots indexed by the low bits of the key. Every
//! slot keeps the full 64-bit key, so a probe only hits on an exact key match.
//! Stores overwrite whatever occupies the slot: last write wins, with no
//! depth- or age-based replacement. The table is cleared after every move
//! decision, so nothing survives from one root position to the next.

use shakmaty::Move;

use crate::search::negamax::MATE_THRESHOLD;

/// Bound type stored with a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// The stored score is exact.
    Exact,
    /// The search failed high; the true score is at least the stored score.
    Lower,
    /// The search failed low; the true score is at most the stored score.
    Upper,
}

/// A remembered search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtEntry {
    /// Remaining depth the position was searched to.
    pub depth: i32,
    /// Best move found, used as an ordering hint even when the depth is too shallow.
    pub best_move: Option<Move>,
    /// Score in node-relative form (see [`score_to_tt`]).
    pub score: i32,
    /// How `score` relates to the true value.
    pub bound: Bound,
}

/// Convert a root-relative search score to node-relative form for storage.
///
/// Mate scores encode the distance from the root; adding the current ply
/// (subtracting for negative scores) turns that into distance from this node,
/// which is the same no matter which path reached the position.
pub fn score_to_tt(score: i32, ply: u32) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

/// Convert a stored node-relative score back to root-relative form.
pub fn score_from_tt(score: i32, ply: u32) -> i32 {
    let ply = ply as i32;
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

#[derive(Clone, Copy)]
struct Slot {
    key: u64,
    entry: TtEntry,
}

/// Single-threaded transposition table owned by the search session.
pub struct TranspositionTable {
    slots: Box<[Option<Slot>]>,
    mask: u64,
}

impl TranspositionTable {
    /// Create a table using roughly `mb` megabytes.
    ///
    /// The slot count is rounded down to a power of two (at least one slot).
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let slot_size = std::mem::size_of::<Option<Slot>>();
        let num_slots = ((bytes / slot_size).next_power_of_two() >> 1).max(1);

        Self {
            slots: vec![None; num_slots].into_boxed_slice(),
            mask: (num_slots - 1) as u64,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Drop every entry, keeping the allocation.
    pub fn clear(&mut self) {
        self.slots.fill(None);
    }

    /// Look up `key`. Returns `None` on an empty slot or a different key.
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        match self.slots[(key & self.mask) as usize] {
            Some(slot) if slot.key == key => Some(slot.entry),
            _ => None,
        }
    }

    /// Store an entry for `key`, replacing whatever the slot held.
    pub fn store(&mut self, key: u64, entry: TtEntry) {
        self.slots[(key & self.mask) as usize] = Some(Slot { key, entry });
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("slots", &self.slots.len())
            .finish()
    }
}
