//! Search, evaluation and move selection for sable.

pub mod book;
pub mod config;
pub mod error;
pub mod eval;
pub mod search;
pub mod session;
pub mod tablebase;
pub mod time;

pub use config::{EngineConfig, SearchConfig};
pub use error::{BookError, EngineError};
pub use eval::evaluate;
pub use search::control::SearchControl;
pub use search::{SearchInfo, SearchResult, Searcher, position_key};
pub use session::{MoveChoice, MoveSource, Session};
pub use tablebase::{EndgameOracle, SyzygyTablebase};
pub use time::{GoLimits, limits_from_go};
