//! Top-level move selection for one game.

use shakmaty::{Chess, Move, Position};
use tracing::{debug, info, warn};

use crate::book::BookState;
use crate::config::EngineConfig;
use crate::search::control::SearchControl;
use crate::search::negamax::play;
use crate::search::{SearchInfo, SearchResult, Searcher, position_key};
use crate::tablebase::{EndgameOracle, SyzygyTablebase};

/// Where a chosen move came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveSource {
    Book,
    Tablebase,
    Search,
}

/// Outcome of [`Session::choose_move`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveChoice {
    /// `None` only when the position has no legal moves or the search was
    /// stopped before depth 1 completed.
    pub best_move: Option<Move>,
    pub source: MoveSource,
    /// Search statistics; for book and tablebase moves only the score is set.
    pub result: SearchResult,
}

/// Owns every table that lives for a whole game: the searcher (with its
/// transposition, history and repetition tables), the opening book and the
/// endgame oracle.
pub struct Session {
    searcher: Searcher,
    book: BookState,
    oracle: Option<Box<dyn EndgameOracle>>,
    tablebase_pieces: usize,
}

impl Session {
    /// Build a session from startup settings.
    ///
    /// A tablebase directory that cannot be opened is logged and ignored.
    pub fn new(config: &EngineConfig) -> Self {
        let mut searcher = Searcher::new(config.search.clone());
        searcher.resize_tt(config.hash_mb);

        let mut session = Self {
            searcher,
            book: BookState::Disabled,
            oracle: None,
            tablebase_pieces: config.tablebase_pieces,
        };
        session.configure_book(config);
        session.configure_tablebase(config);
        session
    }

    /// Re-read the book settings; the book is loaded again on next use.
    pub fn configure_book(&mut self, config: &EngineConfig) {
        self.book = match (&config.book_file, config.own_book) {
            (Some(path), true) => BookState::from_path(path),
            _ => BookState::Disabled,
        };
    }

    /// Re-open the tablebase directory, if any.
    pub fn configure_tablebase(&mut self, config: &EngineConfig) {
        self.tablebase_pieces = config.tablebase_pieces;
        self.oracle = config.syzygy_path.as_deref().and_then(|path| {
            match SyzygyTablebase::open(path) {
                Ok(tb) => Some(Box::new(tb) as Box<dyn EndgameOracle>),
                Err(err) => {
                    warn!(error = %err, "tablebase disabled");
                    None
                }
            }
        });
    }

    /// Replace the endgame oracle.
    pub fn set_oracle(&mut self, oracle: Option<Box<dyn EndgameOracle>>) {
        self.oracle = oracle;
    }

    pub fn resize_tt(&mut self, mb: usize) {
        self.searcher.resize_tt(mb);
    }

    /// Forget everything learned in the previous game.
    pub fn new_game(&mut self) {
        self.searcher.reset_tables();
        self.searcher.set_game_history(&[]);
    }

    /// Seed draw detection with the keys of the positions played so far,
    /// excluding the current one.
    pub fn set_game_history(&mut self, keys: &[u64]) {
        self.searcher.set_game_history(keys);
    }

    pub fn searcher(&self) -> &Searcher {
        &self.searcher
    }

    /// Pick a move for `pos`: opening book, then tablebase, then search.
    ///
    /// After a search the transposition and history tables are reset. The
    /// root position and the position after the chosen move are recorded as
    /// game history for later repetition checks.
    pub fn choose_move<F>(
        &mut self,
        pos: &Chess,
        depth: u32,
        control: &SearchControl,
        on_iter: F,
    ) -> MoveChoice
    where
        F: FnMut(&SearchInfo),
    {
        let choice = if let Some(mv) = self.book.probe(pos) {
            info!(mv = %mv, "book move");
            MoveChoice {
                best_move: Some(mv),
                source: MoveSource::Book,
                result: SearchResult {
                    best_move: Some(mv),
                    score: 0,
                    nodes: 0,
                    depth: 0,
                },
            }
        } else if let Some((mv, score)) = self.tablebase_move(pos) {
            info!(mv = %mv, score, "tablebase move");
            MoveChoice {
                best_move: Some(mv),
                source: MoveSource::Tablebase,
                result: SearchResult {
                    best_move: Some(mv),
                    score,
                    nodes: 0,
                    depth: 0,
                },
            }
        } else {
            let result = self.searcher.search(pos, depth, control, on_iter);
            self.searcher.reset_tables();
            debug!(depth = result.depth, nodes = result.nodes, score = result.score, "search finished");
            MoveChoice {
                best_move: result.best_move,
                source: MoveSource::Search,
                result,
            }
        };

        if let Some(mv) = choice.best_move {
            self.searcher.record_position(position_key(pos));
            self.searcher.record_position(position_key(&play(pos, mv)));
        }
        choice
    }

    /// Best move by oracle verdict, or `None` if any child is not covered.
    fn tablebase_move(&self, pos: &Chess) -> Option<(Move, i32)> {
        let oracle = self.oracle.as_ref()?;
        let pieces = pos.board().occupied().count();
        if pieces > self.tablebase_pieces || pieces > oracle.max_pieces() {
            return None;
        }

        let mut best: Option<(Move, i32)> = None;
        for mv in pos.legal_moves() {
            let score = -oracle.probe(&play(pos, mv))?;
            if best.is_none_or(|(_, s)| score > s) {
                best = Some((mv, score));
            }
        }
        best
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}
