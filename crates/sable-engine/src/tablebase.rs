//! Endgame tablebase lookup.

use std::path::Path;

use shakmaty::Chess;
use shakmaty_syzygy::{Tablebase, Wdl};
use tracing::{debug, info};

use crate::error::EngineError;

/// Score for a tablebase win, below the mate band.
pub const TB_WIN_SCORE: i32 = 20_000;

/// Perfect-play verdict for a position.
pub trait EndgameOracle: Send {
    /// Score for the side to move, or `None` when the position is not covered.
    fn probe(&self, pos: &Chess) -> Option<i32>;

    /// Largest piece count the oracle can answer for.
    fn max_pieces(&self) -> usize;
}

/// Map a win/draw/loss verdict to a centipawn-like score.
///
/// Wins and losses spoiled by the fifty-move rule score barely off a draw.
pub fn wdl_score(wdl: Wdl) -> i32 {
    match wdl {
        Wdl::Win => TB_WIN_SCORE,
        Wdl::CursedWin => 1,
        Wdl::Draw => 0,
        Wdl::BlessedLoss => -1,
        Wdl::Loss => -TB_WIN_SCORE,
    }
}

/// Syzygy tables read from one or more directories.
pub struct SyzygyTablebase {
    tables: Tablebase<Chess>,
}

impl SyzygyTablebase {
    /// Open every table found in `dir`.
    pub fn open(dir: &Path) -> Result<Self, EngineError> {
        let mut tables = Tablebase::new();
        tables
            .add_directory(dir)
            .map_err(|source| EngineError::Tablebase {
                path: dir.to_path_buf(),
                source,
            })?;
        info!(path = %dir.display(), max_pieces = tables.max_pieces(), "tablebase opened");
        Ok(Self { tables })
    }
}

impl EndgameOracle for SyzygyTablebase {
    fn probe(&self, pos: &Chess) -> Option<i32> {
        match self.tables.probe_wdl_after_zeroing(pos) {
            Ok(wdl) => Some(wdl_score(wdl)),
            Err(err) => {
                debug!(error = %err, "tablebase probe failed");
                None
            }
        }
    }

    fn max_pieces(&self) -> usize {
        self.tables.max_pieces()
    }
}
