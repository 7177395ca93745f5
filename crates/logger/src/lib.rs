//! # Logger
//!
//! Front ends that decide when a log call reaches the dispatch tree.
//!
//! - `SyncLogger`: dispatches on the calling thread
//! - `AsyncLogger`: queues events for a worker task, immediately or paced by an interval
//! - `build_logger`: picks one from a `LogConfig`

mod async_logger;
mod error;
mod logger;
mod report;
mod sync_logger;

pub use async_logger::{AsyncLogger, LoggerStats, Pacing};
pub use error::LoggerError;
pub use logger::{build_logger, Logger};
pub use sync_logger::SyncLogger;
