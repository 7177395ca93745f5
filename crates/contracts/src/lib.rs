//! # Contracts
//!
//! Frozen interface contracts shared by every logtree crate.
//! Business crates depend on this crate only, never the reverse.
//!
//! ## Contents
//! - `LogLevel` / `LogContext`: what a log event carries besides its text
//! - `Formatter`: turns an event into the string a sink receives
//! - `Sink` with its optional `Flushable` / `Closable` capabilities
//! - `LogConfig`: the receiver tree described by a configuration file

mod config;
mod error;
mod format;
mod level;
mod sink;

pub use config::*;
pub use error::*;
pub use format::{Formatter, PatternFormatter, SharedFormatter, DEFAULT_PATTERN};
pub use level::{LogContext, LogLevel};
pub use sink::*;
