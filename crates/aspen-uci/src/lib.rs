//! UCI protocol front end for the aspen search engine.

pub mod command;
pub mod engine;
pub mod error;

pub use command::{Command, GoParams, PositionInfo, UciOption, parse_command};
pub use engine::{EngineConfig, UciEngine};
pub use error::UciError;
