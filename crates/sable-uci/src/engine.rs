//! Event-driven UCI engine with a background search thread.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use shakmaty::{Chess, Position};
use tracing::{debug, info, warn};

use sable_engine::search::negamax::MAX_PLY;
use sable_engine::{EngineConfig, MoveChoice, SearchInfo, Session, limits_from_go};

use crate::command::{Command, GoParams, MAX_HASH_MB, PositionInfo, UciOption, parse_command};
use crate::error::UciError;
use crate::info::{format_bestmove, format_info};

/// Internal engine state.
enum EngineState {
    Idle,
    Searching,
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    choice: MoveChoice,
    session: Session,
    elapsed: Duration,
}

/// Record `option` in `config`.
fn update_config(config: &mut EngineConfig, option: &UciOption) {
    match option {
        UciOption::Hash(mb) => config.hash_mb = *mb,
        UciOption::Depth(depth) => config.depth = *depth,
        UciOption::OwnBook(on) => config.own_book = *on,
        UciOption::BookFile(path) => config.book_file = path.clone(),
        UciOption::SyzygyPath(path) => config.syzygy_path = path.clone(),
        UciOption::Unknown(name) => debug!(name = %name, "ignoring unknown option"),
    }
}

/// Bring `session` in line with `config` after `option` changed.
fn reconfigure(session: &mut Session, config: &EngineConfig, option: &UciOption) {
    match option {
        UciOption::Hash(mb) => session.resize_tt(*mb),
        UciOption::OwnBook(_) | UciOption::BookFile(_) => session.configure_book(config),
        UciOption::SyzygyPath(_) => session.configure_tablebase(config),
        UciOption::Depth(_) | UciOption::Unknown(_) => {}
    }
}

/// Forward parsed stdin lines to the event loop from a dedicated thread.
fn spawn_reader(tx: mpsc::Sender<EngineEvent>) {
    std::thread::spawn(move || {
        for line in io::stdin().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            debug!(line = line.trim(), "input");
            if tx.send(EngineEvent::UciCommand(parse_command(&line))).is_err() {
                return;
            }
        }
        let _ = tx.send(EngineEvent::InputClosed);
    });
}

/// The UCI engine, holding the current position and the game session.
///
/// Runs an event-driven loop on the main thread. A `go` moves the session
/// into a worker thread, which hands it back through the event channel
/// together with the chosen move; the loop keeps reading commands meanwhile
/// so `stop` and `isready` are answered during a search.
pub struct UciEngine {
    position: Chess,
    history: Vec<u64>,
    session: Option<Session>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    config: EngineConfig,
    /// `ucinewgame` arrived while the search thread owned the session.
    pending_new_game: bool,
    /// Options to apply when the search thread returns the session.
    pending_options: Vec<UciOption>,
    /// Current search is `go infinite`: its result waits for `stop`.
    infinite: bool,
    /// Final `info` and `bestmove` lines of an infinite search that ended early.
    held_report: Option<[String; 2]>,
}

impl UciEngine {
    /// Create a new engine with the starting position.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            position: Chess::default(),
            history: Vec::new(),
            session: Some(Session::new(&config)),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            config,
            pending_new_game: false,
            pending_options: Vec::new(),
            infinite: false,
            held_report: None,
        }
    }

    /// Serve GUI commands from stdin until `quit` or end of input.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel();
        spawn_reader(tx.clone());

        while let Ok(event) = rx.recv() {
            let keep_going = match event {
                EngineEvent::UciCommand(Ok(Command::Quit)) => false,
                EngineEvent::UciCommand(Ok(cmd)) => {
                    self.dispatch(cmd, &tx);
                    true
                }
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "discarding bad input");
                    true
                }
                EngineEvent::SearchDone(done) => {
                    self.finish_search(done);
                    true
                }
                EngineEvent::InputClosed => false,
            };
            if !keep_going {
                break;
            }
        }

        // A running search still owns the session and must print its move
        if matches!(self.state, EngineState::Searching) {
            self.handle_stop();
        }
        if self.session.is_none() {
            let done = rx.iter().find_map(|event| match event {
                EngineEvent::SearchDone(done) => Some(done),
                _ => None,
            });
            if let Some(done) = done {
                self.finish_search(done);
            }
        }

        info!("sable shutting down");
        Ok(())
    }

    fn dispatch(&mut self, cmd: Command, tx: &mpsc::Sender<EngineEvent>) {
        match cmd {
            Command::Uci => self.handle_uci(),
            Command::IsReady => println!("readyok"),
            Command::UciNewGame => self.handle_ucinewgame(),
            Command::Position(info) => self.handle_position(info),
            Command::Go(params) => self.handle_go(params, tx),
            Command::SetOption(opt) => self.handle_setoption(opt),
            Command::Stop => self.handle_stop(),
            Command::Quit | Command::Unknown(_) => {}
        }
    }

    fn handle_uci(&self) {
        println!("id name sable");
        println!("id author the sable developers");
        println!("option name Hash type spin default 16 min 1 max {MAX_HASH_MB}");
        println!(
            "option name Depth type spin default {} min 1 max {MAX_PLY}",
            EngineConfig::default().depth
        );
        println!("option name OwnBook type check default false");
        println!("option name BookFile type string default <empty>");
        println!("option name SyzygyPath type string default <empty>");
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.position = Chess::default();
        self.history.clear();
        match self.session.as_mut() {
            Some(session) => session.new_game(),
            // Search thread owns the session; reset it when it comes back
            None => self.pending_new_game = true,
        }
    }

    fn handle_setoption(&mut self, option: UciOption) {
        update_config(&mut self.config, &option);
        match self.session.as_mut() {
            Some(session) => reconfigure(session, &self.config, &option),
            None => self.pending_options.push(option),
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.position = info.position;
        self.history = info.history;
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while searching, ignoring");
            return;
        }
        let Some(mut session) = self.session.take() else {
            warn!("no session available, ignoring go");
            return;
        };

        // Fresh flag per search so a late `stop` cannot hit the next one
        self.stop_flag = Arc::new(AtomicBool::new(false));
        let control = limits_from_go(
            &params.limits(),
            self.position.turn(),
            Arc::clone(&self.stop_flag),
        );

        let depth = match params.depth {
            Some(depth) => depth,
            None if params.is_timed() => MAX_PLY,
            None => self.config.depth,
        };
        debug!(depth, "starting search");

        session.set_game_history(&self.history);
        self.infinite = params.infinite;
        let position = self.position.clone();
        let tx = tx.clone();

        std::thread::spawn(move || {
            let choice = session.choose_move(&position, depth, &control, |info| {
                println!("{}", format_info(info));
            });
            let elapsed = control.elapsed();
            let _ = tx.send(EngineEvent::SearchDone(SearchDone {
                choice,
                session,
                elapsed,
            }));
        });

        self.state = EngineState::Searching;
    }

    fn handle_stop(&mut self) {
        self.stop_flag.store(true, Ordering::Release);
        if let Some(lines) = self.held_report.take() {
            print_report(&lines);
            self.state = EngineState::Idle;
        }
    }

    fn finish_search(&mut self, done: SearchDone) {
        let mut session = done.session;
        if std::mem::take(&mut self.pending_new_game) {
            session.new_game();
        }
        for option in self.pending_options.drain(..) {
            reconfigure(&mut session, &self.config, &option);
        }
        self.session = Some(session);

        let result = &done.choice.result;
        let lines = [
            format_info(&SearchInfo {
                depth: result.depth,
                score: result.score,
                nodes: result.nodes,
                elapsed: done.elapsed,
                best_move: done.choice.best_move,
            }),
            format_bestmove(done.choice.best_move),
        ];

        // `go infinite` may not answer before the GUI sends `stop`
        if self.infinite && !self.stop_flag.load(Ordering::Acquire) {
            debug!("infinite search finished early, holding bestmove");
            self.held_report = Some(lines);
            return;
        }
        print_report(&lines);
        self.state = EngineState::Idle;
    }
}

fn print_report(lines: &[String; 2]) {
    for line in lines {
        println!("{line}");
    }
}

impl Default for UciEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn options_update_config() {
        let mut config = EngineConfig::default();
        update_config(&mut config, &UciOption::Hash(64));
        update_config(&mut config, &UciOption::Depth(7));
        update_config(&mut config, &UciOption::OwnBook(true));
        update_config(&mut config, &UciOption::BookFile(Some(PathBuf::from("book.txt"))));
        update_config(&mut config, &UciOption::Unknown("Threads".to_string()));

        assert_eq!(config.hash_mb, 64);
        assert_eq!(config.depth, 7);
        assert!(config.own_book);
        assert_eq!(config.book_file, Some(PathBuf::from("book.txt")));
        assert_eq!(config.syzygy_path, None);
    }

    #[test]
    fn ucinewgame_while_searching_is_deferred() {
        let mut engine = UciEngine::default();
        let session = engine.session.take().unwrap();
        engine.handle_ucinewgame();
        engine.handle_setoption(UciOption::Hash(2));
        assert!(engine.pending_new_game);
        assert_eq!(engine.pending_options, vec![UciOption::Hash(2)]);

        engine.state = EngineState::Searching;
        engine.finish_search(SearchDone {
            choice: MoveChoice {
                best_move: None,
                source: sable_engine::MoveSource::Search,
                result: sable_engine::SearchResult::seed(),
            },
            session,
            elapsed: Duration::ZERO,
        });

        assert!(!engine.pending_new_game);
        assert!(engine.pending_options.is_empty());
        assert!(engine.session.is_some());
        assert!(matches!(engine.state, EngineState::Idle));
        assert_eq!(engine.config.hash_mb, 2);
    }

    fn finished(session: Session) -> SearchDone {
        SearchDone {
            choice: MoveChoice {
                best_move: None,
                source: sable_engine::MoveSource::Search,
                result: sable_engine::SearchResult::seed(),
            },
            session,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn infinite_search_waits_for_stop() {
        let mut engine = UciEngine::default();
        let session = engine.session.take().unwrap();
        engine.infinite = true;
        engine.state = EngineState::Searching;

        engine.finish_search(finished(session));
        assert!(engine.held_report.is_some());
        assert!(matches!(engine.state, EngineState::Searching));
        assert!(engine.session.is_some());

        engine.handle_stop();
        assert!(engine.held_report.is_none());
        assert!(matches!(engine.state, EngineState::Idle));
    }

    #[test]
    fn stopped_infinite_search_reports_at_once() {
        let mut engine = UciEngine::default();
        let session = engine.session.take().unwrap();
        engine.infinite = true;
        engine.state = EngineState::Searching;
        engine.handle_stop();

        engine.finish_search(finished(session));
        assert!(engine.held_report.is_none());
        assert!(matches!(engine.state, EngineState::Idle));
    }

    #[test]
    fn position_replaces_board_and_history() {
        let mut engine = UciEngine::default();
        let Ok(Command::Position(info)) = parse_command("position startpos moves e2e4") else {
            panic!("expected position");
        };
        engine.handle_position(info);
        assert_eq!(engine.history.len(), 1);
        assert_eq!(engine.position.turn(), shakmaty::Color::Black);
    }
}
