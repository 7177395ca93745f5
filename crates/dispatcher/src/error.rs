//! Dispatcher error types

use contracts::ContractError;
use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    // ===== Construction =====
    /// No formatter supplied
    #[error("formatter can not be nil")]
    NilFormatter,

    /// No receivers supplied
    #[error("receivers can not be nil or empty")]
    EmptyReceivers,

    /// Receiver is neither writer-like nor dispatcher-like
    #[error("unsupported receiver type '{type_name}': expected a writer, a known sink or a dispatch node")]
    UnsupportedReceiverType { type_name: String },

    /// Sink could not be wrapped into a writer
    #[error("invalid writer: {message}")]
    InvalidWriter { message: String },

    /// Sink creation error (config-driven builds)
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    // ===== Delivery / teardown =====
    /// A single writer failed to write
    #[error("write to '{sink_name}' failed: {source}")]
    Write {
        sink_name: String,
        #[source]
        source: ContractError,
    },

    /// A writer failed to close
    #[error("close of '{sink_name}' failed: {source}")]
    Close {
        sink_name: String,
        #[source]
        source: ContractError,
    },

    /// Operation on a dispatcher that was already closed
    #[error("dispatcher is closed")]
    Closed,

    /// Contract error (format pattern, config)
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl DispatcherError {
    /// Create an unsupported receiver error
    pub fn unsupported(type_name: impl Into<String>) -> Self {
        Self::UnsupportedReceiverType {
            type_name: type_name.into(),
        }
    }

    /// Create an invalid writer error
    pub fn invalid_writer(message: impl Into<String>) -> Self {
        Self::InvalidWriter {
            message: message.into(),
        }
    }

    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a write error
    pub fn write(sink_name: impl Into<String>, source: ContractError) -> Self {
        Self::Write {
            sink_name: sink_name.into(),
            source,
        }
    }

    /// Create a close error
    pub fn close(sink_name: impl Into<String>, source: ContractError) -> Self {
        Self::Close {
            sink_name: sink_name.into(),
            source,
        }
    }

    /// True for errors raised while building a tree
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::NilFormatter
                | Self::EmptyReceivers
                | Self::UnsupportedReceiverType { .. }
                | Self::InvalidWriter { .. }
                | Self::SinkCreation { .. }
                | Self::Contract(_)
        )
    }
}
