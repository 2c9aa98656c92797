//! Errors raised while reading GUI input.

/// A line of UCI input that could not be understood.
///
/// None of these end the session; the event loop logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum UciError {
    #[error("position command needs `startpos` or `fen`")]
    MalformedPosition,

    #[error("cannot set up position from FEN {fen:?}")]
    InvalidFen { fen: String },

    /// Unparsable, or not legal in the position it was applied to.
    #[error("move {uci_move} is not playable")]
    InvalidMove { uci_move: String },

    #[error("go {param} given without a value")]
    MissingGoValue { param: String },

    #[error("go {param}: cannot parse {value:?}")]
    InvalidGoValue { param: String, value: String },

    #[error("setoption without an option name")]
    MalformedOption,

    #[error("option {name}: unusable value {value:?}")]
    InvalidOptionValue { name: String, value: String },

    #[error("reading input failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
