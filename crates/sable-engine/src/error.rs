//! Engine errors.

use std::path::PathBuf;

/// Errors raised while loading or reading an opening book.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// The book file could not be read.
    #[error("cannot read book {path}: {source}")]
    Io {
        /// Path of the book file.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A book line has fewer than four FEN fields or no moves.
    #[error("book line {line}: expected four FEN fields followed by moves")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
    },

    /// The FEN fields of a book line do not describe a legal position.
    #[error("book line {line}: invalid position {fen:?}")]
    InvalidPosition {
        /// 1-based line number.
        line: usize,
        /// The FEN that failed to parse.
        fen: String,
    },

    /// A Polyglot book whose size is not a whole number of records.
    #[error("polyglot book of {len} bytes is not a multiple of 16")]
    TruncatedPolyglot {
        /// File size in bytes.
        len: usize,
    },

    /// A move of a book line is not valid UCI notation.
    #[error("book line {line}: invalid move {uci_move:?}")]
    InvalidMove {
        /// 1-based line number.
        line: usize,
        /// The move text that failed to parse.
        uci_move: String,
    },
}

/// Errors raised while setting up engine resources.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The tablebase directory could not be opened.
    #[error("cannot open tablebase directory {path}: {source}")]
    Tablebase {
        /// Directory given as the tablebase path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
