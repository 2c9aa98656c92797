//! Static evaluation: material, bishop pair and piece-square tables.

pub mod material;
pub mod pst;

use shakmaty::{Chess, Color, Position};

pub use material::game_phase;

/// Evaluate `pos` in centipawns from the side to move's perspective.
pub fn evaluate(pos: &Chess) -> i32 {
    let board = pos.board();
    let phase = game_phase(board);
    let white = material::material(board) + pst::pst(board, phase);

    match pos.turn() {
        Color::White => white,
        Color::Black => -white,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::fen::Fen;
    use shakmaty::CastlingMode;

    fn position(fen: &str) -> Chess {
        let fen: Fen = fen.parse().unwrap();
        fen.into_position(CastlingMode::Standard).unwrap()
    }

    #[test]
    fn starting_position_is_zero() {
        assert_eq!(evaluate(&Chess::default()), 0);
    }

    #[test]
    fn extra_queen_favours_its_owner() {
        let white_to_move = position("4k3/8/8/8/8/8/8/3QK3 w - - 0 1");
        let black_to_move = position("4k3/8/8/8/8/8/8/3QK3 b - - 0 1");
        assert!(evaluate(&white_to_move) > 800);
        assert_eq!(evaluate(&black_to_move), -evaluate(&white_to_move));
    }

    #[test]
    fn colour_flipped_position_scores_the_same() {
        let white = position("4k3/8/8/8/4P3/2N5/8/4K3 w - - 0 1");
        let black = position("4k3/8/2n5/4p3/8/8/8/4K3 b - - 0 1");
        assert_eq!(evaluate(&white), evaluate(&black));
    }
}
