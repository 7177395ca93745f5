//! Logger error types

use dispatcher::DispatcherError;
use thiserror::Error;

/// Logger-specific errors
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Tree construction or teardown error
    #[error(transparent)]
    Dispatcher(#[from] DispatcherError),

    /// Async mode requested outside a Tokio runtime
    #[error("async logger requires a running tokio runtime")]
    NoRuntime,

    /// Worker task ended abnormally
    #[error("logger worker failed: {0}")]
    Worker(String),
}
