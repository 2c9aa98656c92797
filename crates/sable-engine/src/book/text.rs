//! Plain-text opening book format.
//!
//! One position per line: the first four FEN fields (placement, side to move,
//! castling, en passant) followed by one or more UCI moves, best first.
//! Blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - e2e4 d2d4
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Move};

use crate::error::BookError;
use crate::search::position_key;

/// Book moves keyed by position.
#[derive(Debug, Clone, Default)]
pub struct TextBook {
    entries: HashMap<u64, Vec<UciMove>>,
}

impl TextBook {
    /// Read and parse a book file.
    pub fn load(path: &Path) -> Result<Self, BookError> {
        let text = fs::read_to_string(path).map_err(|source| BookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse book text. Fails on the first malformed line.
    pub fn parse(text: &str) -> Result<Self, BookError> {
        let mut entries: HashMap<u64, Vec<UciMove>> = HashMap::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let raw = raw.trim();
            if raw.is_empty() || raw.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = raw.split_whitespace().collect();
            if tokens.len() < 5 {
                return Err(BookError::MalformedLine { line });
            }

            let fen = format!("{} 0 1", tokens[..4].join(" "));
            let pos: Chess = fen
                .parse::<Fen>()
                .ok()
                .and_then(|f| f.into_position(CastlingMode::Standard).ok())
                .ok_or_else(|| BookError::InvalidPosition {
                    line,
                    fen: fen.clone(),
                })?;

            let moves = tokens[4..]
                .iter()
                .map(|tok| {
                    tok.parse::<UciMove>().map_err(|_| BookError::InvalidMove {
                        line,
                        uci_move: (*tok).to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            entries.entry(position_key(&pos)).or_default().extend(moves);
        }

        Ok(Self { entries })
    }

    /// First listed move that is legal in `pos`.
    pub fn lookup(&self, pos: &Chess) -> Option<Move> {
        self.entries
            .get(&position_key(pos))?
            .iter()
            .find_map(|uci| uci.to_move(pos).ok())
    }

    /// Number of positions in the book.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shakmaty::{Position, Square};

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

    #[test]
    fn lookup_returns_first_legal_move() {
        // e2e5 is not legal, so e2e4 is chosen
        let book = TextBook::parse(&format!("# test book\n\n{START} e2e5 e2e4 d2d4\n")).unwrap();
        assert_eq!(book.len(), 1);

        let mv = book.lookup(&Chess::default()).unwrap();
        assert_eq!(mv.from(), Some(Square::E2));
        assert_eq!(mv.to(), Square::E4);
    }

    #[test]
    fn unknown_position_misses() {
        let book = TextBook::parse(&format!("{START} e2e4\n")).unwrap();
        let mut pos = Chess::default();
        let mv = pos.legal_moves()[0];
        pos.play_unchecked(mv);
        assert_eq!(book.lookup(&pos), None);
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(
            TextBook::parse(&format!("{START}\n")),
            Err(BookError::MalformedLine { line: 1 })
        ));
        assert!(matches!(
            TextBook::parse("x/y/z w - - e2e4\n"),
            Err(BookError::InvalidPosition { line: 1, .. })
        ));
        assert!(matches!(
            TextBook::parse(&format!("\n{START} zz99\n")),
            Err(BookError::InvalidMove { line: 2, .. })
        ));
    }
}
