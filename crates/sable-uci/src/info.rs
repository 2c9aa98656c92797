//! Formatting of `info` and `bestmove` lines.

use shakmaty::{CastlingMode, Move};

use sable_engine::SearchInfo;

/// UCI notation of a move, `0000` for none.
pub fn move_to_uci(mv: Option<Move>) -> String {
    match mv {
        Some(mv) => mv.to_uci(CastlingMode::Standard).to_string(),
        None => "0000".to_string(),
    }
}

/// `info depth D score cp S nodes N nps P time T pv M`
pub fn format_info(info: &SearchInfo) -> String {
    format!(
        "info depth {} score cp {} nodes {} nps {} time {} pv {}",
        info.depth,
        info.score,
        info.nodes,
        info.nps(),
        info.elapsed.as_millis(),
        move_to_uci(info.best_move),
    )
}

/// `bestmove M`
pub fn format_bestmove(mv: Option<Move>) -> String {
    format!("bestmove {}", move_to_uci(mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::uci::UciMove;
    use std::time::Duration;
    use shakmaty::{Chess, Position};

    fn e2e4() -> Move {
        let pos = Chess::default();
        "e2e4".parse::<UciMove>().unwrap().to_move(&pos).unwrap()
    }

    #[test]
    fn info_line_fields() {
        let info = SearchInfo {
            depth: 5,
            score: -37,
            nodes: 12_000,
            elapsed: Duration::from_millis(40),
            best_move: Some(e2e4()),
        };
        assert_eq!(
            format_info(&info),
            "info depth 5 score cp -37 nodes 12000 nps 300000 time 40 pv e2e4"
        );
    }

    #[test]
    fn zero_elapsed_does_not_divide_by_zero() {
        let info = SearchInfo {
            depth: 1,
            score: 0,
            nodes: 20,
            elapsed: Duration::ZERO,
            best_move: None,
        };
        assert_eq!(
            format_info(&info),
            "info depth 1 score cp 0 nodes 20 nps 20000 time 0 pv 0000"
        );
    }

    #[test]
    fn bestmove_line() {
        assert_eq!(format_bestmove(Some(e2e4())), "bestmove e2e4");
        assert_eq!(format_bestmove(None), "bestmove 0000");
    }

    #[test]
    fn castling_uses_king_destination() {
        let pos: Chess = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1"
            .parse::<shakmaty::fen::Fen>()
            .unwrap()
            .into_position(CastlingMode::Standard)
            .unwrap();
        let castle = pos
            .legal_moves()
            .into_iter()
            .find(|m| m.is_castle() && m.to() == shakmaty::Square::H1)
            .unwrap();
        assert_eq!(move_to_uci(Some(castle)), "e1g1");
    }
}
