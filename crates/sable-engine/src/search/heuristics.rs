//! History heuristic for quiet move ordering.

use shakmaty::{Color, Move, Square};

/// History table indexed by `[side_to_move][from][to]`.
///
/// Quiet moves that cause a beta cutoff earn `depth²`. Entries only grow
/// within a search; the session zeroes the table after every move decision
/// so bias from an earlier root position does not leak into the next one.
pub struct HistoryTable {
    table: Box<[[[i32; 64]; 64]; 2]>,
}

fn side_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl HistoryTable {
    /// Create a zeroed history table.
    pub fn new() -> Self {
        Self {
            table: Box::new([[[0; 64]; 64]; 2]),
        }
    }

    /// Reward a quiet move that caused a beta cutoff at `depth`.
    pub fn reward(&mut self, side: Color, mv: Move, depth: i32) {
        let Some(from) = mv.from() else {
            return;
        };
        let entry = &mut self.table[side_index(side)][from as usize][mv.to() as usize];
        *entry = entry.saturating_add(depth * depth);
    }

    /// History score for a move by `side`.
    pub fn score(&self, side: Color, mv: Move) -> i32 {
        mv.from().map_or(0, |from| self.get(side, from, mv.to()))
    }

    /// History score for a from/to pair.
    pub fn get(&self, side: Color, from: Square, to: Square) -> i32 {
        self.table[side_index(side)][from as usize][to as usize]
    }

    /// Zero every entry.
    pub fn reset(&mut self) {
        *self.table = [[[0; 64]; 64]; 2];
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
