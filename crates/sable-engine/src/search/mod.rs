//! Search algorithms and move ordering.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod repetition;
pub mod tt;

use std::time::Duration;

use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Chess, EnPassantMode, Move};
use tracing::debug;

use crate::config::SearchConfig;
use control::SearchControl;
use heuristics::HistoryTable;
use negamax::{INF, Outcome, SearchContext, negamax};
use repetition::RepetitionTable;
use tt::TranspositionTable;

/// Default transposition table size in megabytes.
pub const DEFAULT_TT_MB: usize = 16;

/// 64-bit Zobrist key of a position, counting en passant only when legal.
pub fn position_key(pos: &Chess) -> u64 {
    pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

/// Result of the deepest completed iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    /// Best move found, `None` before any depth completed or without legal moves.
    pub best_move: Option<Move>,
    /// Score in centipawns from the side to move's perspective.
    pub score: i32,
    /// Total nodes visited during the search.
    pub nodes: u64,
    /// Depth reached.
    pub depth: u32,
}

impl SearchResult {
    /// The state returned when no iteration completes.
    pub fn seed() -> Self {
        Self {
            best_move: None,
            score: -INF,
            nodes: 0,
            depth: 0,
        }
    }
}

/// Progress report for one completed depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchInfo {
    pub depth: u32,
    pub score: i32,
    pub nodes: u64,
    pub elapsed: Duration,
    pub best_move: Option<Move>,
}

impl SearchInfo {
    /// Nodes per second, with elapsed time floored at one millisecond.
    pub fn nps(&self) -> u64 {
        let millis = self.elapsed.as_millis().max(1) as u64;
        self.nodes.saturating_mul(1000) / millis
    }
}

/// Iterative-deepening searcher owning the transposition, history and
/// repetition tables.
pub struct Searcher {
    tt: TranspositionTable,
    history: HistoryTable,
    repetitions: RepetitionTable,
    config: SearchConfig,
}

impl Searcher {
    /// Create a searcher with a [`DEFAULT_TT_MB`] transposition table.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            tt: TranspositionTable::new(DEFAULT_TT_MB),
            history: HistoryTable::new(),
            repetitions: RepetitionTable::new(),
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Resize the transposition table to the given size in megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Clear the transposition table and zero the history table.
    pub fn reset_tables(&mut self) {
        self.tt.clear();
        self.history.reset();
    }

    /// Replace the repetition table with the keys of the game so far.
    pub fn set_game_history(&mut self, keys: &[u64]) {
        self.repetitions.reset_to(keys);
    }

    /// Record one more occurrence of a position in the game history.
    pub fn record_position(&mut self, key: u64) {
        self.repetitions.push(key);
    }

    pub fn repetitions(&self) -> &RepetitionTable {
        &self.repetitions
    }

    /// Run iterative deepening from depth 1 to `max_depth`.
    ///
    /// Calls `on_iter` after each completed depth. A depth interrupted by the
    /// stop controller is discarded; the result of the last completed depth
    /// is returned, or [`SearchResult::seed`] if none completed.
    pub fn search<F>(
        &mut self,
        pos: &Chess,
        max_depth: u32,
        control: &SearchControl,
        mut on_iter: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        let mut ctx = SearchContext {
            nodes: 0,
            tt: &mut self.tt,
            history: &mut self.history,
            repetitions: &mut self.repetitions,
            control,
            config: &self.config,
        };

        let mut completed = SearchResult::seed();

        for depth in 1..=max_depth {
            if control.should_stop(ctx.nodes) {
                break;
            }

            let (best_move, score) = match negamax(pos, depth as i32, 0, -INF, INF, false, &mut ctx) {
                Outcome::Cancelled => {
                    debug!(depth, nodes = ctx.nodes, "iteration cancelled");
                    break;
                }
                Outcome::Completed { best_move, score } => (best_move, score),
            };

            completed = SearchResult {
                best_move,
                score,
                nodes: ctx.nodes,
                depth,
            };

            on_iter(&SearchInfo {
                depth,
                score,
                nodes: ctx.nodes,
                elapsed: control.elapsed(),
                best_move,
            });
        }

        completed.nodes = ctx.nodes;
        completed
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}
