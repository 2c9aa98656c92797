//! Time management: convert clock parameters to search limits.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use shakmaty::Color;

use crate::search::control::SearchControl;

/// Moves assumed left in the game when the GUI does not send `movestogo`.
pub const DEFAULT_MOVES_TO_GO: u32 = 30;

/// Reserved per move for I/O and thread hand-off.
pub const MOVE_OVERHEAD: Duration = Duration::from_millis(10);

/// Clock-related parameters of a `go` command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoLimits {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub movetime: Option<Duration>,
    pub nodes: Option<u64>,
    pub infinite: bool,
}

/// Budget for one move from the side's clock.
///
/// `remaining / movestogo + 3/4 * increment`, capped at half the remaining
/// time minus [`MOVE_OVERHEAD`], and never below 1 ms.
pub fn allocate(remaining: Duration, increment: Duration, moves_to_go: Option<u32>) -> Duration {
    let remaining_ms = remaining.as_millis() as u64;
    let inc_ms = increment.as_millis() as u64;
    let mtg = u64::from(moves_to_go.unwrap_or(DEFAULT_MOVES_TO_GO).max(1));

    let budget = remaining_ms / mtg + inc_ms * 3 / 4;
    let cap = (remaining_ms / 2).saturating_sub(MOVE_OVERHEAD.as_millis() as u64);

    Duration::from_millis(budget.min(cap).max(1))
}

/// Build a [`SearchControl`] from `go` parameters and the side to move.
///
/// Priority order:
/// 1. `infinite` -> no deadline
/// 2. `movetime` -> that budget as-is
/// 3. clock time for `side` -> [`allocate`]
/// 4. `depth` only / bare `go` -> no deadline
///
/// A `nodes` limit is added on top of any of these.
pub fn limits_from_go(limits: &GoLimits, side: Color, stopped: Arc<AtomicBool>) -> SearchControl {
    let (remaining, increment) = match side {
        Color::White => (limits.wtime, limits.winc),
        Color::Black => (limits.btime, limits.binc),
    };

    let control = if limits.infinite {
        SearchControl::new_infinite(stopped)
    } else if let Some(movetime) = limits.movetime {
        SearchControl::new_timed(stopped, movetime)
    } else if let Some(remaining) = remaining {
        let budget = allocate(
            remaining,
            increment.unwrap_or(Duration::ZERO),
            limits.movestogo,
        );
        SearchControl::new_timed(stopped, budget)
    } else {
        SearchControl::new_infinite(stopped)
    };

    match limits.nodes {
        Some(nodes) => control.with_node_limit(nodes),
        None => control,
    }
}
