//! Search control: stop flag, per-move deadline and node limit.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Decides when a search has to give up.
///
/// Consulted at the top of every negamax and quiescence call. Cancellation is
/// cooperative: a call already in flight (e.g. a static evaluation) runs to
/// completion, and the next recursive entry observes the stop.
///
/// Three sources can end a search:
/// - the shared stop flag (set by the protocol layer on `stop`/`quit`),
/// - the wall-clock budget (`movetime`), measured from construction,
/// - an optional node limit (`go nodes`).
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    movetime: Option<Duration>,
    node_limit: Option<u64>,
}

impl SearchControl {
    /// Control without a deadline; only the stop flag (or a node limit) ends the search.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            movetime: None,
            node_limit: None,
        }
    }

    /// Control with a wall-clock budget; the clock starts immediately.
    pub fn new_timed(stopped: Arc<AtomicBool>, movetime: Duration) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            movetime: Some(movetime),
            node_limit: None,
        }
    }

    /// Add a node limit to this control.
    pub fn with_node_limit(mut self, nodes: u64) -> Self {
        self.node_limit = Some(nodes);
        self
    }

    /// Whether the search must exit now.
    ///
    /// True once the stop flag is set, the budget is consumed, or `nodes`
    /// reached the node limit. When the deadline or node limit fires, the stop
    /// flag is raised so later calls return without re-reading the clock.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.stopped.load(Ordering::Relaxed) {
            return true;
        }

        let exhausted = self.node_limit.is_some_and(|limit| nodes >= limit)
            || self.movetime.is_some_and(|budget| self.elapsed() >= budget);

        if exhausted {
            self.stopped.store(true, Ordering::Release);
        }
        exhausted
    }

    /// Elapsed time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The per-move budget, if any.
    pub fn movetime(&self) -> Option<Duration> {
        self.movetime
    }

    /// Reference to the shared stop flag.
    pub fn stop_flag(&self) -> &Arc<AtomicBool> {
        &self.stopped
    }
}

impl std::fmt::Debug for SearchControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchControl")
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .field("movetime", &self.movetime)
            .field("node_limit", &self.node_limit)
            .finish()
    }
}
