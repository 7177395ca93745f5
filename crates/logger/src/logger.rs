//! Logger - one front end chosen from configuration

use std::time::Duration;

use contracts::{LogConfig, LogContext, LogLevel, LoggerMode};
use dispatcher::create_dispatcher;
use tracing::info;

use crate::async_logger::{AsyncLogger, Pacing};
use crate::error::LoggerError;
use crate::sync_logger::SyncLogger;

/// Either scheduling strategy behind one call surface
pub enum Logger {
    Sync(SyncLogger),
    Async(AsyncLogger),
}

impl Logger {
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) {
        let context = LogContext::caller();
        match self {
            Logger::Sync(logger) => logger.log_with_context(level, message, &context),
            Logger::Async(logger) => {
                logger.try_log_with_context(level, message, context);
            }
        }
    }

    /// Flush now (sync) or queue a flush request (async)
    pub fn flush(&self) {
        match self {
            Logger::Sync(logger) => logger.flush(),
            Logger::Async(logger) => {
                logger.flush();
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Logger::Sync(logger) => logger.describe(),
            Logger::Async(logger) => logger.describe().to_string(),
        }
    }

    pub fn mode(&self) -> LoggerMode {
        match self {
            Logger::Sync(_) => LoggerMode::Sync,
            Logger::Async(logger) => match logger.pacing() {
                Pacing::Immediate => LoggerMode::AsyncLoop,
                Pacing::Interval(_) => LoggerMode::AsyncTimer,
            },
        }
    }

    /// Deliver pending events and close the tree
    pub async fn shutdown(self) -> Result<(), LoggerError> {
        match self {
            Logger::Sync(logger) => logger.close(),
            Logger::Async(logger) => logger.shutdown().await,
        }
    }
}

/// Build the tree described by `config` and wrap it in the configured front end.
///
/// Async modes need a running Tokio runtime and fail with `NoRuntime` otherwise.
pub fn build_logger(config: &LogConfig) -> Result<Logger, LoggerError> {
    let root = create_dispatcher(config)?;

    let logger = match config.mode {
        LoggerMode::Sync => Logger::Sync(SyncLogger::new(root, config.min_level)),
        LoggerMode::AsyncLoop | LoggerMode::AsyncTimer => {
            tokio::runtime::Handle::try_current().map_err(|_| LoggerError::NoRuntime)?;
            let pacing = if config.mode == LoggerMode::AsyncTimer {
                Pacing::Interval(Duration::from_millis(config.interval_ms))
            } else {
                Pacing::Immediate
            };
            Logger::Async(AsyncLogger::spawn(
                root,
                config.min_level,
                config.queue_capacity,
                pacing,
            ))
        }
    };

    info!(
        mode = ?config.mode,
        min_level = %config.min_level,
        sinks = config.sink_count(),
        "Logger built"
    );
    Ok(logger)
}
