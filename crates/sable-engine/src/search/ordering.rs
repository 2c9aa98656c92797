//! Move ordering: a static rating per move and a picker yielding best-first.
//!
//! Ratings only steer the search order; they never affect correctness.
//! Bands, highest first:
//!
//! | Category                         | Rating               |
//! |----------------------------------|----------------------|
//! | Transposition-table move         | 60,000               |
//! | Winning capture                  | 1,000 ..= 4,000      |
//! | Equal capture, en passant, promo | 0                    |
//! | Quiet move with history          | -999 ..= -1          |
//! | Losing capture                   | -5,000 ..= -1,000    |
//! | Any other quiet move             | -10,000              |
//!
//! A move with a history score takes the history band even when it is a
//! capture.

use shakmaty::{Chess, Move, MoveList, Position, Role};

use crate::search::heuristics::HistoryTable;

/// Rating for the move remembered by the transposition table.
pub const TT_MOVE_RATING: i32 = 60_000;

/// Multiplier applied to the victim/attacker value difference of a capture.
pub const CAPTURE_SCALE: i32 = 1_000;

/// Rating for quiet moves without history.
pub const QUIET_RATING: i32 = -10_000;

/// Ordinal piece value used only to compare victim and attacker.
pub fn piece_value(role: Role) -> i32 {
    match role {
        Role::Pawn => 1,
        Role::Knight => 2,
        Role::Bishop => 3,
        Role::Rook => 4,
        Role::Queen => 5,
        Role::King => 6,
    }
}

/// Rate `mv` in `pos` for ordering; higher is searched first.
pub fn rate(pos: &Chess, mv: Move, tt_move: Option<Move>, history: &HistoryTable) -> i32 {
    if tt_move == Some(mv) {
        return TT_MOVE_RATING;
    }

    let hist = history.score(pos.turn(), mv);
    if hist != 0 {
        return -CAPTURE_SCALE + hist.clamp(1, CAPTURE_SCALE - 1);
    }

    if mv.is_en_passant() {
        return 0;
    }
    if let Some(victim) = mv.capture() {
        return (piece_value(victim) - piece_value(mv.role())) * CAPTURE_SCALE;
    }
    if mv.is_promotion() {
        return 0;
    }

    QUIET_RATING
}

/// Incremental picker using selection sort.
///
/// Most nodes cut off after a few moves, so sorting lazily beats sorting
/// the whole list up front.
pub struct MovePicker {
    entries: Vec<(Move, i32)>,
    cursor: usize,
}

impl MovePicker {
    /// Rate every move in `moves` for `pos`.
    pub fn new(pos: &Chess, moves: &MoveList, tt_move: Option<Move>, history: &HistoryTable) -> Self {
        let entries = moves
            .iter()
            .map(|&mv| (mv, rate(pos, mv, tt_move, history)))
            .collect();
        Self { entries, cursor: 0 }
    }

    /// Yield the highest-rated remaining move.
    ///
    /// Ties keep generation order among the moves not yet swapped.
    pub fn pick_next(&mut self) -> Option<Move> {
        if self.cursor >= self.entries.len() {
            return None;
        }

        let mut best_idx = self.cursor;
        for i in (self.cursor + 1)..self.entries.len() {
            if self.entries[i].1 > self.entries[best_idx].1 {
                best_idx = i;
            }
        }

        self.entries.swap(self.cursor, best_idx);
        let mv = self.entries[self.cursor].0;
        self.cursor += 1;
        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::{CastlingMode, Color, Square};

    fn position(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    fn find(pos: &Chess, from: Square, to: Square) -> Move {
        pos.legal_moves()
            .into_iter()
            .find(|m| m.from() == Some(from) && m.to() == to)
            .expect("move should be legal")
    }

    #[test]
    fn piece_values_are_ordinal() {
        assert!(piece_value(Role::Pawn) < piece_value(Role::Knight));
        assert!(piece_value(Role::Queen) < piece_value(Role::King));
        assert_eq!(piece_value(Role::King), 6);
    }

    #[test]
    fn tt_move_rates_highest() {
        let pos = Chess::default();
        let history = HistoryTable::new();
        let mv = find(&pos, Square::G1, Square::F3);
        assert_eq!(rate(&pos, mv, Some(mv), &history), TT_MOVE_RATING);
    }

    #[test]
    fn capture_bands() {
        // White pawn b4 can take the rook on c5; white queen h4 can take the pawn on h7
        let pos = position("4k3/7p/8/2r5/1P5Q/8/8/4K3 w - - 0 1");
        let history = HistoryTable::new();

        let pawn_takes_rook = rate(&pos, find(&pos, Square::B4, Square::C5), None, &history);
        let queen_takes_pawn = rate(&pos, find(&pos, Square::H4, Square::H7), None, &history);
        let quiet = rate(&pos, find(&pos, Square::E1, Square::D1), None, &history);

        assert_eq!(pawn_takes_rook, 3 * CAPTURE_SCALE);
        assert_eq!(queen_takes_pawn, -4 * CAPTURE_SCALE);
        assert_eq!(quiet, QUIET_RATING);
        assert!(pawn_takes_rook > queen_takes_pawn);
        assert!(queen_takes_pawn > quiet);
    }

    #[test]
    fn en_passant_and_promotion_rate_zero() {
        let ep = position("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3");
        let history = HistoryTable::new();
        let ep_move = ep
            .legal_moves()
            .into_iter()
            .find(|m| m.is_en_passant())
            .expect("en passant should be available");
        assert_eq!(rate(&ep, ep_move, None, &history), 0);

        let promo = position("7k/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let push = promo
            .legal_moves()
            .into_iter()
            .find(|m| m.promotion() == Some(Role::Queen))
            .unwrap();
        assert_eq!(rate(&promo, push, None, &history), 0);
    }

    #[test]
    fn history_band_sits_between_equal_and_losing_captures() {
        let pos = Chess::default();
        let mut history = HistoryTable::new();
        let mv = find(&pos, Square::G1, Square::F3);
        history.reward(Color::White, mv, 3);

        let rating = rate(&pos, mv, None, &history);
        assert_eq!(rating, -CAPTURE_SCALE + 9);
        assert!(rating < 0);
        assert!(rating > -CAPTURE_SCALE);

        // Larger history ranks higher but stays inside the band
        history.reward(Color::White, mv, 100);
        assert_eq!(rate(&pos, mv, None, &history), -1);
    }

    #[test]
    fn picker_yields_all_moves_in_starting_position() {
        let pos = Chess::default();
        let moves = pos.legal_moves();
        let mut picker = MovePicker::new(&pos, &moves, None, &HistoryTable::new());
        let mut count = 0;
        while picker.pick_next().is_some() {
            count += 1;
        }
        assert_eq!(count, 20);
    }

    #[test]
    fn picker_yields_tt_move_then_captures() {
        let pos = position("4k3/8/8/4p3/3Q4/8/8/4K3 w - - 0 1");
        let moves = pos.legal_moves();
        let tt_move = find(&pos, Square::E1, Square::F1);
        let mut picker = MovePicker::new(&pos, &moves, Some(tt_move), &HistoryTable::new());

        assert_eq!(picker.pick_next(), Some(tt_move));
        let second = picker.pick_next().unwrap();
        assert!(second.is_capture(), "capture should follow the TT move, got {second:?}");
    }
}
