//! UCI command parsing.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Position};
use tracing::debug;

use sable_engine::{GoLimits, position_key};

use crate::error::UciError;

/// Largest accepted `Hash` value in megabytes.
pub const MAX_HASH_MB: usize = 65_536;

/// Limits sent with `go`. Absent fields stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    /// Iteration cap; overrides the `Depth` option.
    pub depth: Option<u32>,
    /// Fixed thinking time.
    pub movetime: Option<Duration>,
    /// Node budget.
    pub nodes: Option<u64>,
    /// Run until `stop`.
    pub infinite: bool,
}

impl GoParams {
    /// Clock-related subset handed to the time manager.
    pub fn limits(&self) -> GoLimits {
        GoLimits {
            wtime: self.wtime,
            btime: self.btime,
            winc: self.winc,
            binc: self.binc,
            movestogo: self.movestogo,
            movetime: self.movetime,
            nodes: self.nodes,
            infinite: self.infinite,
        }
    }

    /// Whether the search is bounded by time or `stop` rather than depth.
    pub fn is_timed(&self) -> bool {
        self.infinite
            || self.movetime.is_some()
            || self.wtime.is_some()
            || self.btime.is_some()
            || self.nodes.is_some()
    }
}

/// Position set up by a `position` command.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    /// Position after all moves were applied.
    pub position: Chess,
    /// Keys of every earlier position of the game, oldest first.
    pub history: Vec<u64>,
}

/// An engine option changed through `setoption`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciOption {
    /// Transposition table size in megabytes.
    Hash(usize),
    /// Default search depth.
    Depth(u32),
    OwnBook(bool),
    BookFile(Option<PathBuf>),
    SyzygyPath(Option<PathBuf>),
    /// Option this engine does not know; ignored.
    Unknown(String),
}

/// One line of GUI input.
#[derive(Debug)]
pub enum Command {
    Uci,
    IsReady,
    UciNewGame,
    Position(PositionInfo),
    Go(GoParams),
    SetOption(UciOption),
    Stop,
    Quit,
    /// Anything else; the engine ignores it.
    Unknown(String),
}

/// Parse one line of engine input.
///
/// Blank lines and unrecognized verbs become [`Command::Unknown`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&verb, args)) = tokens.split_first() else {
        return Ok(Command::Unknown(String::new()));
    };

    let command = match verb {
        "uci" => Command::Uci,
        "isready" => Command::IsReady,
        "ucinewgame" => Command::UciNewGame,
        "stop" => Command::Stop,
        "quit" => Command::Quit,
        "position" => parse_position(args)?,
        "go" => Command::Go(parse_go(args)?),
        "setoption" => parse_setoption(args)?,
        other => Command::Unknown(other.to_string()),
    };
    Ok(command)
}

/// `startpos | fen <fields...>` optionally followed by `moves <m1> <m2> ...`.
///
/// Every position before the final one is recorded as game history.
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let moves_at = tokens.iter().position(|&t| t == "moves");
    let (setup, moves) = match moves_at {
        Some(i) => (&tokens[..i], &tokens[i + 1..]),
        None => (tokens, &[][..]),
    };

    let mut position = match setup.first() {
        Some(&"startpos") => Chess::default(),
        Some(&"fen") => {
            let fen = setup[1..].join(" ");
            fen.parse::<Fen>()
                .ok()
                .and_then(|f| f.into_position(CastlingMode::Standard).ok())
                .ok_or(UciError::InvalidFen { fen })?
        }
        _ => return Err(UciError::MalformedPosition),
    };

    let mut history = Vec::with_capacity(moves.len());
    for &uci_str in moves {
        let mv = uci_str
            .parse::<UciMove>()
            .ok()
            .and_then(|uci| uci.to_move(&position).ok())
            .ok_or_else(|| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
        history.push(position_key(&position));
        position.play_unchecked(mv);
    }

    Ok(Command::Position(PositionInfo { position, history }))
}

/// Read the `go` parameters; tokens this engine does not know are skipped.
fn parse_go(tokens: &[&str]) -> Result<GoParams, UciError> {
    let mut params = GoParams::default();
    let mut iter = tokens.iter().copied();

    while let Some(key) = iter.next() {
        match key {
            "infinite" => params.infinite = true,
            "wtime" => params.wtime = Some(millis(iter.next(), key)?),
            "btime" => params.btime = Some(millis(iter.next(), key)?),
            "winc" => params.winc = Some(millis(iter.next(), key)?),
            "binc" => params.binc = Some(millis(iter.next(), key)?),
            "movetime" => params.movetime = Some(millis(iter.next(), key)?),
            "movestogo" => params.movestogo = Some(number(iter.next(), key)?),
            "depth" => params.depth = Some(number(iter.next(), key)?),
            "nodes" => params.nodes = Some(number(iter.next(), key)?),
            _ => debug!(token = key, "skipping go token"),
        }
    }

    Ok(params)
}

/// Milliseconds after `param`. A flagging GUI may send a negative clock,
/// which counts as zero.
fn millis(token: Option<&str>, param: &str) -> Result<Duration, UciError> {
    let ms: i64 = number(token, param)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

fn number<T: FromStr>(token: Option<&str>, param: &str) -> Result<T, UciError> {
    let Some(raw) = token else {
        return Err(UciError::MissingGoValue {
            param: param.to_owned(),
        });
    };
    raw.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_owned(),
        value: raw.to_owned(),
    })
}

/// Parse `setoption name <name> [value <value>]`.
///
/// Option names are case-insensitive and may contain spaces.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MalformedOption);
    }
    let rest = &tokens[1..];
    let value_at = rest.iter().position(|&t| t == "value");
    let (name, value) = match value_at {
        Some(i) => (rest[..i].join(" "), rest[i + 1..].join(" ")),
        None => (rest.join(" "), String::new()),
    };
    if name.is_empty() {
        return Err(UciError::MalformedOption);
    }

    let invalid = || UciError::InvalidOptionValue {
        name: name.clone(),
        value: value.clone(),
    };

    let option = match name.to_ascii_lowercase().as_str() {
        "hash" => {
            let mb: usize = value.parse().map_err(|_| invalid())?;
            UciOption::Hash(mb.clamp(1, MAX_HASH_MB))
        }
        "depth" => {
            let depth: u32 = value.parse().map_err(|_| invalid())?;
            UciOption::Depth(depth.max(1))
        }
        "ownbook" => match value.to_ascii_lowercase().as_str() {
            "true" => UciOption::OwnBook(true),
            "false" => UciOption::OwnBook(false),
            _ => return Err(invalid()),
        },
        "bookfile" => UciOption::BookFile(optional_path(&value)),
        "syzygypath" => UciOption::SyzygyPath(optional_path(&value)),
        _ => UciOption::Unknown(name),
    };

    Ok(Command::SetOption(option))
}

/// Empty and `<empty>` mean "no path".
fn optional_path(value: &str) -> Option<PathBuf> {
    match value.trim() {
        "" | "<empty>" => None,
        path => Some(PathBuf::from(path)),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn go(line: &str) -> GoParams {
        match parse_command(line).unwrap() {
            Command::Go(params) => params,
            other => panic!("expected Go, got {other:?}"),
        }
    }

    fn option(line: &str) -> UciOption {
        match parse_command(line).unwrap() {
            Command::SetOption(opt) => opt,
            other => panic!("expected SetOption, got {other:?}"),
        }
    }

    fn position(line: &str) -> PositionInfo {
        match parse_command(line).unwrap() {
            Command::Position(info) => info,
            other => panic!("expected Position, got {other:?}"),
        }
    }

    #[test]
    fn bare_verbs() {
        assert!(matches!(parse_command("uci").unwrap(), Command::Uci));
        assert!(matches!(parse_command("isready").unwrap(), Command::IsReady));
        assert!(matches!(parse_command("quit").unwrap(), Command::Quit));
        assert!(matches!(parse_command("stop").unwrap(), Command::Stop));
        assert!(matches!(
            parse_command("ucinewgame").unwrap(),
            Command::UciNewGame
        ));
    }

    #[test]
    fn startpos_has_no_history() {
        let info = position("position startpos");
        assert_eq!(position_key(&info.position), position_key(&Chess::default()));
        assert!(info.history.is_empty());
    }

    #[test]
    fn moves_are_applied_and_recorded() {
        let info = position("position startpos moves e2e4 e7e5");
        assert_eq!(info.history.len(), 2);
        assert_eq!(info.history[0], position_key(&Chess::default()));
        assert_eq!(info.position.turn(), shakmaty::Color::White);
        assert!(info.position.board().pawns().contains(shakmaty::Square::E5));
    }

    #[test]
    fn history_records_repetitions() {
        let info = position("position startpos moves g1f3 g8f6 f3g1 f6g8");
        assert_eq!(info.history.len(), 4);
        assert_eq!(position_key(&info.position), info.history[0]);
    }

    #[test]
    fn fen_sets_side_to_move() {
        let info = position(
            "position fen rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
        );
        assert_eq!(info.position.turn(), shakmaty::Color::Black);
    }

    #[test]
    fn parse_position_fen_with_moves() {
        let info = position("position fen 4k3/8/8/8/8/8/8/4K2R w K - 0 1 moves e1g1");
        assert_eq!(info.history.len(), 1);
        assert!(info.position.board().rooks().contains(shakmaty::Square::F1));
    }

    #[test]
    fn parse_position_errors() {
        assert!(matches!(
            parse_command("position"),
            Err(UciError::MalformedPosition)
        ));
        assert!(matches!(
            parse_command("position fen invalid"),
            Err(UciError::InvalidFen { .. })
        ));
        assert!(matches!(
            parse_command("position startpos moves e2e5"),
            Err(UciError::InvalidMove { .. })
        ));
    }

    #[test]
    fn go_depth() {
        assert_eq!(go("go depth 6").depth, Some(6));
    }

    #[test]
    fn bare_go_is_untimed() {
        let params = go("go");
        assert_eq!(params, GoParams::default());
        assert!(!params.is_timed());
    }

    #[test]
    fn go_clock_fields() {
        let params = go("go wtime 60000 btime 45000 winc 500 binc 0 movestogo 12");
        let expected = GoParams {
            wtime: Some(Duration::from_secs(60)),
            btime: Some(Duration::from_secs(45)),
            winc: Some(Duration::from_millis(500)),
            binc: Some(Duration::ZERO),
            movestogo: Some(12),
            ..GoParams::default()
        };
        assert_eq!(params, expected);
        assert!(params.is_timed());
    }

    #[test]
    fn parse_go_negative_clock_clamps() {
        assert_eq!(go("go wtime -50").wtime, Some(Duration::ZERO));
    }

    #[test]
    fn parse_go_movetime_nodes_infinite() {
        assert_eq!(go("go movetime 5000").movetime, Some(Duration::from_millis(5000)));
        assert_eq!(go("go nodes 1000000").nodes, Some(1_000_000));
        assert!(go("go infinite").infinite);
    }

    #[test]
    fn go_limits_carry_clock_fields() {
        let limits = go("go wtime 1000 nodes 50 infinite").limits();
        assert_eq!(limits.wtime, Some(Duration::from_millis(1000)));
        assert_eq!(limits.nodes, Some(50));
        assert!(limits.infinite);
    }

    #[test]
    fn parse_go_errors() {
        assert!(matches!(
            parse_command("go wtime"),
            Err(UciError::MissingGoValue { .. })
        ));
        assert!(matches!(
            parse_command("go depth abc"),
            Err(UciError::InvalidGoValue { .. })
        ));
    }

    #[test]
    fn parse_setoption_values() {
        assert_eq!(option("setoption name Hash value 64"), UciOption::Hash(64));
        assert_eq!(option("setoption name hash value 0"), UciOption::Hash(1));
        assert_eq!(option("setoption name Depth value 6"), UciOption::Depth(6));
        assert_eq!(option("setoption name OwnBook value true"), UciOption::OwnBook(true));
        assert_eq!(
            option("setoption name BookFile value /tmp/my book.txt"),
            UciOption::BookFile(Some(PathBuf::from("/tmp/my book.txt")))
        );
        assert_eq!(
            option("setoption name SyzygyPath value <empty>"),
            UciOption::SyzygyPath(None)
        );
        assert_eq!(
            option("setoption name Clear Hash"),
            UciOption::Unknown("Clear Hash".to_string())
        );
    }

    #[test]
    fn parse_setoption_errors() {
        assert!(matches!(
            parse_command("setoption value 3"),
            Err(UciError::MalformedOption)
        ));
        assert!(matches!(
            parse_command("setoption name Hash value lots"),
            Err(UciError::InvalidOptionValue { .. })
        ));
        assert!(matches!(
            parse_command("setoption name OwnBook value maybe"),
            Err(UciError::InvalidOptionValue { .. })
        ));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(matches!(parse_command("foobar").unwrap(), Command::Unknown(_)));
        assert!(matches!(parse_command("").unwrap(), Command::Unknown(_)));
    }
}
