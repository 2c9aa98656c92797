//! Negamax alpha-beta search with quiescence.

use shakmaty::{Chess, Move, Position};

use crate::config::SearchConfig;
use crate::evaluate;
use crate::search::control::SearchControl;
use crate::search::heuristics::HistoryTable;
use crate::search::ordering::MovePicker;
use crate::search::position_key;
use crate::search::repetition::RepetitionTable;
use crate::search::tt::{Bound, TranspositionTable, TtEntry, score_from_tt, score_to_tt};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 30_000;

/// Base score for checkmate (adjusted by ply for mate distance).
pub const MATE_SCORE: i32 = 29_000;

/// Scores above this threshold indicate a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Maximum search depth in plies; quiescence returns the static eval here.
pub const MAX_PLY: u32 = 128;

/// Quiet checking moves quiescence may play along one line.
pub const QSEARCH_CHECKS: u32 = 2;

/// Result of a search call.
///
/// A cancelled call carries no score at all, so a legitimate 0 evaluation
/// can never be mistaken for an aborted search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The stop controller fired before the node finished.
    Cancelled,
    /// The node was fully searched.
    Completed {
        best_move: Option<Move>,
        score: i32,
    },
}

/// Mutable state threaded through every recursive call.
pub struct SearchContext<'a> {
    pub nodes: u64,
    pub tt: &'a mut TranspositionTable,
    pub history: &'a mut HistoryTable,
    pub repetitions: &'a mut RepetitionTable,
    pub control: &'a SearchControl,
    pub config: &'a SearchConfig,
}

/// Score for the side to move being checkmated at `ply`.
pub fn mated_in(ply: u32) -> i32 {
    -(MATE_SCORE - ply as i32)
}

/// Whether `score` is a forced mate for either side.
pub fn is_mate_score(score: i32) -> bool {
    score.abs() >= MATE_THRESHOLD
}

/// Fifty-move rule or insufficient material.
pub fn is_drawn(pos: &Chess) -> bool {
    pos.halfmoves() >= 100 || pos.is_insufficient_material()
}

/// Play `mv` on a copy of `pos`.
pub(crate) fn play(pos: &Chess, mv: Move) -> Chess {
    let mut child = pos.clone();
    child.play_unchecked(mv);
    child
}

/// Whether `mv` puts the opponent in check.
pub fn gives_check(pos: &Chess, mv: Move) -> bool {
    play(pos, mv).is_check()
}

/// Whether `mv` may be searched at reduced depth.
///
/// Captures, promotions, checking moves and check evasions are never reduced.
pub fn reduction_ok(pos: &Chess, mv: Move) -> bool {
    !mv.is_capture() && !mv.is_promotion() && !pos.is_check() && !gives_check(pos, mv)
}

/// Whether the side to move may pass for a null-move search.
///
/// Refused in check, directly after another null move, and once the board
/// holds `min_pieces` or fewer pieces (zugzwang gets likely).
pub fn null_move_ok(pos: &Chess, after_null: bool, min_pieces: usize) -> bool {
    !after_null && !pos.is_check() && pos.board().occupied().count() > min_pieces
}

/// Negamax alpha-beta search.
///
/// Returns the best score for the side to move at `ply` plies from the root.
/// The node's key is pushed onto the repetition table around every child
/// search and popped afterward, on every exit path.
pub fn negamax(
    pos: &Chess,
    depth: i32,
    ply: u32,
    mut alpha: i32,
    mut beta: i32,
    after_null: bool,
    ctx: &mut SearchContext<'_>,
) -> Outcome {
    if ctx.control.should_stop(ctx.nodes) {
        return Outcome::Cancelled;
    }
    ctx.nodes += 1;

    let key = position_key(pos);
    let draw = ctx.config.draw_score;

    if ply > 0 && ctx.repetitions.is_repetition(key, ctx.config.repetition_threshold) {
        return Outcome::Completed {
            best_move: None,
            score: draw,
        };
    }

    // Probe transposition table
    let mut tt_move = None;
    if ctx.config.use_tt
        && let Some(entry) = ctx.tt.probe(key)
    {
        tt_move = entry.best_move;
        let score = score_from_tt(entry.score, ply);
        // A stored draw may come from a repetition on another path
        let usable = entry.depth >= depth
            && score != draw
            && (ply > 0 || entry.best_move.is_some());
        if usable {
            match entry.bound {
                Bound::Exact => {
                    return Outcome::Completed {
                        best_move: entry.best_move,
                        score,
                    };
                }
                Bound::Lower => alpha = alpha.max(score),
                Bound::Upper => beta = beta.min(score),
            }
            if alpha >= beta {
                return Outcome::Completed {
                    best_move: entry.best_move,
                    score,
                };
            }
        }
    }

    let moves = pos.legal_moves();

    // Leaf or terminal node; the root always plays a move
    if depth <= 0 || moves.is_empty() || (ply > 0 && is_drawn(pos)) {
        return match qsearch(pos, ply, alpha, beta, ctx) {
            Some(score) => Outcome::Completed {
                best_move: None,
                score,
            },
            None => Outcome::Cancelled,
        };
    }

    // Null-move pruning
    if ctx.config.null_move
        && ply > 0
        && null_move_ok(pos, after_null, ctx.config.null_move_min_pieces)
        && let Ok(passed) = pos.clone().swap_turn()
    {
        let reduced = depth - 1 - ctx.config.null_move_reduction;
        ctx.repetitions.push(key);
        let outcome = negamax(&passed, reduced, ply + 1, -beta, -beta + 1, true, ctx);
        ctx.repetitions.pop(key);

        match outcome {
            Outcome::Cancelled => return Outcome::Cancelled,
            Outcome::Completed { score, .. } => {
                let score = -score;
                if score >= beta {
                    // Never claim an unproven mate from a pass
                    let score = if is_mate_score(score) { beta } else { score };
                    return Outcome::Completed {
                        best_move: None,
                        score,
                    };
                }
            }
        }
    }

    let window_alpha = alpha;
    let side = pos.turn();
    let mut best_score = -INF;
    let mut best_move = None;
    let mut moves_searched = 0;
    let mut picker = MovePicker::new(pos, &moves, tt_move, ctx.history);

    while let Some(mv) = picker.pick_next() {
        let reduce = ctx.config.late_move_reduction
            && moves_searched >= ctx.config.lmr_min_moves
            && depth > ctx.config.lmr_min_depth
            && reduction_ok(pos, mv);

        let child = play(pos, mv);
        ctx.repetitions.push(key);
        let mut outcome = negamax(
            &child,
            depth - 1 - i32::from(reduce),
            ply + 1,
            -beta,
            -alpha,
            false,
            ctx,
        );
        // A reduced move that beats alpha is re-searched at full depth
        if reduce && matches!(outcome, Outcome::Completed { score, .. } if -score > alpha) {
            outcome = negamax(&child, depth - 1, ply + 1, -beta, -alpha, false, ctx);
        }
        ctx.repetitions.pop(key);

        let score = match outcome {
            Outcome::Cancelled => return Outcome::Cancelled,
            Outcome::Completed { score, .. } => -score,
        };
        moves_searched += 1;

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
        }
        if alpha >= beta {
            if !mv.is_capture() {
                ctx.history.reward(side, mv, depth);
            }
            break;
        }
    }

    if ctx.config.use_tt {
        let bound = if best_score <= window_alpha {
            Bound::Upper
        } else if best_score >= beta {
            Bound::Lower
        } else {
            Bound::Exact
        };
        ctx.tt.store(
            key,
            TtEntry {
                depth,
                best_move: best_move.or(tt_move),
                score: score_to_tt(best_score, ply),
                bound,
            },
        );
    }

    Outcome::Completed {
        best_move,
        score: best_score,
    }
}

/// Quiescence search over captures and checking moves.
///
/// Returns `None` when cancelled. In check every evasion is searched and the
/// static evaluation is not used as a lower bound: unlike the plain
/// stand-pat rule, there is no beta cutoff on the static score while in
/// check, since the side to move may have no quiet move that holds it.
pub fn qsearch(
    pos: &Chess,
    ply: u32,
    alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    qsearch_inner(pos, ply, alpha, beta, QSEARCH_CHECKS, ctx)
}

/// `checks_left` bounds quiet checks along the line so check chains end.
fn qsearch_inner(
    pos: &Chess,
    ply: u32,
    mut alpha: i32,
    beta: i32,
    checks_left: u32,
    ctx: &mut SearchContext<'_>,
) -> Option<i32> {
    if ctx.control.should_stop(ctx.nodes) {
        return None;
    }
    ctx.nodes += 1;

    let draw = ctx.config.draw_score;
    let in_check = pos.is_check();
    let moves = pos.legal_moves();

    if moves.is_empty() {
        return Some(if in_check { mated_in(ply) } else { draw });
    }
    if is_drawn(pos) {
        return Some(draw);
    }

    let stand_pat = evaluate(pos);
    if ply >= MAX_PLY {
        return Some(stand_pat);
    }

    if !in_check {
        if stand_pat >= beta {
            return Some(beta);
        }
        alpha = alpha.max(stand_pat);
    }

    let mut picker = MovePicker::new(pos, &moves, None, ctx.history);
    while let Some(mv) = picker.pick_next() {
        let child = play(pos, mv);
        let mut child_checks = checks_left;
        if !in_check && !mv.is_capture() {
            if checks_left == 0 || !child.is_check() {
                continue;
            }
            child_checks -= 1;
        }

        let score = -qsearch_inner(&child, ply + 1, -beta, -alpha, child_checks, ctx)?;
        if score >= beta {
            return Some(beta);
        }
        if score > alpha {
            alpha = score;
        }
    }

    Some(alpha)
}
