//! Engine and search tunables.

use std::path::PathBuf;

/// Pruning, reduction and draw parameters shared by every node of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Probe and store the transposition table.
    pub use_tt: bool,
    /// Enable null-move pruning.
    pub null_move: bool,
    /// Extra depth reduction `R` for the null-move search (`depth - 1 - R`).
    pub null_move_reduction: i32,
    /// Null move needs strictly more occupied squares than this.
    pub null_move_min_pieces: usize,
    /// Enable late-move reduction.
    pub late_move_reduction: bool,
    /// Moves searched at a node before later quiet moves get reduced.
    pub lmr_min_moves: usize,
    /// Remaining depth must exceed this for a reduction.
    pub lmr_min_depth: i32,
    /// Prior occurrences at which a position scores as a repetition draw.
    pub repetition_threshold: u32,
    /// Score of a drawn position.
    pub draw_score: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            use_tt: true,
            null_move: true,
            null_move_reduction: 2,
            null_move_min_pieces: 14,
            late_move_reduction: true,
            lmr_min_moves: 3,
            lmr_min_depth: 2,
            repetition_threshold: 2,
            draw_score: 0,
        }
    }
}

impl SearchConfig {
    /// Plain alpha-beta: no transposition table, null move or reductions.
    pub fn unpruned() -> Self {
        Self {
            use_tt: false,
            null_move: false,
            late_move_reduction: false,
            ..Self::default()
        }
    }
}

/// Startup settings of the whole engine, changed at runtime by `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Transposition table size in megabytes.
    pub hash_mb: usize,
    /// Depth searched when `go` gives no depth.
    pub depth: u32,
    /// Consult the opening book before searching.
    pub own_book: bool,
    pub book_file: Option<PathBuf>,
    /// Directory holding Syzygy tables.
    pub syzygy_path: Option<PathBuf>,
    /// Tablebase is consulted at or below this many pieces on the board.
    pub tablebase_pieces: usize,
    pub search: SearchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: 16,
            depth: 4,
            own_book: false,
            book_file: None,
            syzygy_path: None,
            tablebase_pieces: 5,
            search: SearchConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unpruned_keeps_draw_settings() {
        let config = SearchConfig::unpruned();
        assert!(!config.use_tt && !config.null_move && !config.late_move_reduction);
        assert_eq!(config.repetition_threshold, SearchConfig::default().repetition_threshold);
        assert_eq!(config.draw_score, 0);
    }

    #[test]
    fn engine_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.depth, 4);
        assert!(!config.own_book);
        assert_eq!(config.tablebase_pieces, 5);
        assert_eq!(config.search, SearchConfig::default());
    }
}
