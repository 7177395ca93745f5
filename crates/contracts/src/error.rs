//! Layered error definitions
//!
//! Categorized by source: config / format / sink

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Format Errors =====
    /// Format pattern could not be compiled
    #[error("invalid format pattern '{pattern}': {message}")]
    InvalidFormat { pattern: String, message: String },

    /// Unknown log level name
    #[error("unknown log level '{0}'")]
    UnknownLevel(String),

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    /// Sink close error
    #[error("sink '{sink_name}' close error: {message}")]
    SinkClose { sink_name: String, message: String },

    /// Sink connection error
    #[error("sink '{sink_name}' connection error: {message}")]
    SinkConnection { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create format pattern error
    pub fn invalid_format(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink close error
    pub fn sink_close(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkClose {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }
}
