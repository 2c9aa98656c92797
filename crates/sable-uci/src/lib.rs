//! UCI protocol handling for sable.

pub mod command;
pub mod engine;
pub mod error;
pub mod info;

pub use command::GoParams;
pub use engine::UciEngine;
pub use error::UciError;
