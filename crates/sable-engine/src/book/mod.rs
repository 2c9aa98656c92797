//! Opening books: Polyglot `.bin` files and a plain-text format.
//!
//! Files ending in `.bin` are read as Polyglot, anything else as text.

pub mod polyglot;
pub mod text;

use std::path::{Path, PathBuf};

use rand::Rng;
use shakmaty::{Chess, Move};
use tracing::{info, warn};

use crate::error::BookError;

pub use polyglot::PolyglotBook;
pub use text::TextBook;

/// A loaded opening book of either format.
#[derive(Debug, Clone)]
pub enum OpeningBook {
    Polyglot(PolyglotBook),
    Text(TextBook),
}

impl OpeningBook {
    /// Load `path`, choosing the format from its extension.
    pub fn load(path: &Path) -> Result<Self, BookError> {
        let is_polyglot = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("bin"));
        if is_polyglot {
            PolyglotBook::load(path).map(Self::Polyglot)
        } else {
            TextBook::load(path).map(Self::Text)
        }
    }

    /// Book move for `pos`: weighted random for Polyglot, first legal for text.
    pub fn pick<R: Rng + ?Sized>(&self, pos: &Chess, rng: &mut R) -> Option<Move> {
        match self {
            Self::Polyglot(book) => book.choose(pos, rng),
            Self::Text(book) => book.lookup(pos),
        }
    }

    /// Number of records (Polyglot) or positions (text).
    pub fn len(&self) -> usize {
        match self {
            Self::Polyglot(book) => book.len(),
            Self::Text(book) => book.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Lazily loaded book that switches itself off after a failure.
#[derive(Debug, Clone, Default)]
pub enum BookState {
    /// No book configured, or loading failed earlier in this run.
    #[default]
    Disabled,
    /// Configured but not read yet.
    Unloaded(PathBuf),
    Loaded(OpeningBook),
}

impl BookState {
    /// Book that will be read from `path` on first use.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Unloaded(path.into())
    }

    /// Look up a move, loading the book first if needed.
    ///
    /// A book that fails to load is logged and disabled for the rest of the run.
    pub fn probe(&mut self, pos: &Chess) -> Option<Move> {
        if let Self::Unloaded(path) = self {
            let path = path.clone();
            *self = match OpeningBook::load(&path) {
                Ok(book) => {
                    info!(path = %path.display(), entries = book.len(), "opening book loaded");
                    Self::Loaded(book)
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "opening book disabled");
                    Self::Disabled
                }
            };
        }

        match self {
            Self::Loaded(book) => book.pick(pos, &mut rand::thread_rng()),
            _ => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::position_key;
    use shakmaty::Square;
    use std::io::Write;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

    #[test]
    fn loads_lazily_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{START} d2d4").unwrap();
        file.flush().unwrap();

        let mut state = BookState::from_path(file.path());
        assert!(matches!(state, BookState::Unloaded(_)));

        let mv = state.probe(&Chess::default()).unwrap();
        assert_eq!(mv.to(), Square::D4);
        assert!(matches!(state, BookState::Loaded(OpeningBook::Text(_))));
    }

    #[test]
    fn missing_file_disables_book() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = BookState::from_path(dir.path().join("missing.txt"));

        assert_eq!(state.probe(&Chess::default()), None);
        assert!(state.is_disabled());
        // Stays off without retrying
        assert_eq!(state.probe(&Chess::default()), None);
    }

    #[test]
    fn bin_extension_loads_polyglot() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        let key = position_key(&Chess::default());
        // d2d4: to d4 = 27, from d2 = 11
        let raw_move: u16 = 27 | 11 << 6;
        file.write_all(&key.to_be_bytes()).unwrap();
        file.write_all(&raw_move.to_be_bytes()).unwrap();
        file.write_all(&1u16.to_be_bytes()).unwrap();
        file.write_all(&0u32.to_be_bytes()).unwrap();
        file.flush().unwrap();

        let mut state = BookState::from_path(file.path());
        let mv = state.probe(&Chess::default()).unwrap();
        assert_eq!(mv.to(), Square::D4);
        assert!(matches!(state, BookState::Loaded(OpeningBook::Polyglot(_))));
    }

    #[test]
    fn truncated_polyglot_disables_book() {
        let mut file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
        file.write_all(&[0; 20]).unwrap();
        file.flush().unwrap();

        let mut state = BookState::from_path(file.path());
        assert_eq!(state.probe(&Chess::default()), None);
        assert!(state.is_disabled());
    }

    #[test]
    fn corrupt_file_disables_book() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "not a book").unwrap();

        let mut state = BookState::from_path(file.path());
        assert_eq!(state.probe(&Chess::default()), None);
        assert!(state.is_disabled());
    }
}
