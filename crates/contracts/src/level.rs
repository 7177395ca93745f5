//! Log levels and call-site context

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::Location;
use std::str::FromStr;

use crate::ContractError;

/// Severity of a log event, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl LogLevel {
    /// All levels, least severe first
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    /// Full lowercase name (`"info"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    /// Three-letter name used by the `%Lev` verb
    pub fn short_name(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trc",
            LogLevel::Debug => "Dbg",
            LogLevel::Info => "Inf",
            LogLevel::Warn => "Wrn",
            LogLevel::Error => "Err",
            LogLevel::Critical => "Crt",
        }
    }

    /// Capitalized name used by the `%Level` verb
    pub fn display_name(&self) -> &'static str {
        match self {
            LogLevel::Trace => "Trace",
            LogLevel::Debug => "Debug",
            LogLevel::Info => "Info",
            LogLevel::Warn => "Warn",
            LogLevel::Error => "Error",
            LogLevel::Critical => "Critical",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" | "trc" => Ok(LogLevel::Trace),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "info" | "inf" => Ok(LogLevel::Info),
            "warn" | "warning" | "wrn" => Ok(LogLevel::Warn),
            "error" | "err" => Ok(LogLevel::Error),
            "critical" | "crt" => Ok(LogLevel::Critical),
            other => Err(ContractError::UnknownLevel(other.to_string())),
        }
    }
}

/// Where a log call was made.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    /// Source file of the call site
    pub file: String,
    /// Line of the call site (0 = unknown)
    pub line: u32,
    /// Enclosing function or module path, if known
    pub function: Option<String>,
}

impl LogContext {
    /// Create a context from explicit parts
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            function: None,
        }
    }

    /// Attach a function or module path
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// Capture the location of the caller
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self::new(location.file(), location.line())
    }

    /// File name without its directories
    pub fn short_file(&self) -> &str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Error < LogLevel::Critical);
        assert_eq!(LogLevel::ALL.iter().max(), Some(&LogLevel::Critical));
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("wrn".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(ContractError::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_level_serde_snake_case() {
        let json = serde_json::to_string(&LogLevel::Critical).unwrap();
        assert_eq!(json, "\"critical\"");
        let level: LogLevel = serde_json::from_str("\"debug\"").unwrap();
        assert_eq!(level, LogLevel::Debug);
    }

    #[test]
    fn test_caller_captures_this_file() {
        let ctx = LogContext::caller();
        assert_eq!(ctx.short_file(), "level.rs");
        assert!(ctx.line > 0);
    }
}
