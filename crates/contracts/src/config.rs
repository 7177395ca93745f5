//! LogConfig - the receiver tree described by a configuration file
//!
//! A configuration names a root formatter, the logger mode, and an ordered
//! list of receivers. Receivers are either sinks or nested dispatchers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::LogLevel;

/// Top-level logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Root format pattern (None = `DEFAULT_PATTERN`)
    #[serde(default)]
    pub format: Option<String>,

    /// Events below this level never reach the tree
    #[serde(default = "default_min_level")]
    pub min_level: LogLevel,

    /// How log calls reach the tree
    #[serde(default)]
    pub mode: LoggerMode,

    /// Pacing interval for `async_timer` mode
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Queue capacity for async modes
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Root receivers, in registration order
    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: None,
            min_level: default_min_level(),
            mode: LoggerMode::default(),
            interval_ms: default_interval_ms(),
            queue_capacity: default_queue_capacity(),
            receivers: Vec::new(),
        }
    }
}

fn default_min_level() -> LogLevel {
    LogLevel::Trace
}

fn default_interval_ms() -> u64 {
    100
}

fn default_queue_capacity() -> usize {
    1000
}

/// Logger scheduling mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggerMode {
    /// Dispatch on the calling thread
    Sync,
    /// Dispatch from a worker task as soon as events arrive
    #[default]
    AsyncLoop,
    /// Dispatch from a worker task, one event per interval tick
    AsyncTimer,
}

/// One receiver of a dispatcher
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReceiverConfig {
    /// Standard output / error
    Console(ConsoleConfig),
    /// Plain file
    File(FileConfig),
    /// Re-emit as `tracing` events
    Tracing(TracingConfig),
    /// One UDP datagram per event
    Udp(UdpConfig),
    /// Nested dispatcher, optionally with its own format
    Dispatcher(DispatcherConfig),
    /// Nested dispatcher that only forwards some levels
    Filter(FilterConfig),
}

impl ReceiverConfig {
    /// Nested receivers for dispatcher-like entries
    pub fn children(&self) -> Option<&[ReceiverConfig]> {
        match self {
            ReceiverConfig::Dispatcher(d) => Some(&d.receivers),
            ReceiverConfig::Filter(f) => Some(&f.receivers),
            _ => None,
        }
    }

    /// Short type tag, as written in the configuration
    pub fn kind(&self) -> &'static str {
        match self {
            ReceiverConfig::Console(_) => "console",
            ReceiverConfig::File(_) => "file",
            ReceiverConfig::Tracing(_) => "tracing",
            ReceiverConfig::Udp(_) => "udp",
            ReceiverConfig::Dispatcher(_) => "dispatcher",
            ReceiverConfig::Filter(_) => "filter",
        }
    }

    /// Sink name, explicit or derived from the sink parameters
    pub fn sink_name(&self) -> Option<String> {
        match self {
            ReceiverConfig::Console(c) => Some(
                c.name
                    .clone()
                    .unwrap_or_else(|| format!("console:{}", c.stream.as_str())),
            ),
            ReceiverConfig::File(c) => Some(
                c.name
                    .clone()
                    .unwrap_or_else(|| format!("file:{}", c.path.display())),
            ),
            ReceiverConfig::Tracing(c) => {
                Some(c.name.clone().unwrap_or_else(|| "tracing".to_string()))
            }
            ReceiverConfig::Udp(c) => Some(
                c.name
                    .clone()
                    .unwrap_or_else(|| format!("udp:{}", c.addr)),
            ),
            ReceiverConfig::Dispatcher(_) | ReceiverConfig::Filter(_) => None,
        }
    }
}

/// Console output stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

impl ConsoleStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsoleStream::Stdout => "stdout",
            ConsoleStream::Stderr => "stderr",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stream: ConsoleStream,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// File to append to (created if missing)
    pub path: PathBuf,
    /// Wrap the file in a write buffer
    #[serde(default)]
    pub buffered: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TracingConfig {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdpConfig {
    #[serde(default)]
    pub name: Option<String>,
    /// Target address (`host:port`)
    pub addr: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Format for this subtree (None = inherit the parent's)
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Levels forwarded to the nested receivers
    #[serde(default)]
    pub levels: Vec<LogLevel>,
    /// Format for this subtree (None = inherit the parent's)
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub receivers: Vec<ReceiverConfig>,
}

impl LogConfig {
    /// Number of sink receivers in the whole tree
    pub fn sink_count(&self) -> usize {
        count_sinks(&self.receivers)
    }

    /// Number of dispatcher-like receivers in the whole tree
    pub fn dispatcher_count(&self) -> usize {
        count_dispatchers(&self.receivers)
    }
}

fn count_sinks(receivers: &[ReceiverConfig]) -> usize {
    receivers
        .iter()
        .map(|r| match r.children() {
            Some(children) => count_sinks(children),
            None => 1,
        })
        .sum()
}

fn count_dispatchers(receivers: &[ReceiverConfig]) -> usize {
    receivers
        .iter()
        .filter_map(|r| r.children())
        .map(|children| 1 + count_dispatchers(children))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_json_config() {
        let json = r#"{
            "format": "%Msg",
            "receivers": [
                { "type": "console" },
                { "type": "filter", "levels": ["error", "critical"], "receivers": [
                    { "type": "file", "path": "errors.log" },
                    { "type": "dispatcher", "receivers": [ { "type": "tracing" } ] }
                ]}
            ]
        }"#;
        let config: LogConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode, LoggerMode::AsyncLoop);
        assert_eq!(config.min_level, LogLevel::Trace);
        assert_eq!(config.receivers.len(), 2);
        assert_eq!(config.sink_count(), 3);
        assert_eq!(config.dispatcher_count(), 2);
        assert_eq!(config.receivers[1].kind(), "filter");
    }

    #[test]
    fn test_sink_name_defaults() {
        let file = ReceiverConfig::File(FileConfig {
            name: None,
            path: PathBuf::from("/tmp/a.log"),
            buffered: false,
        });
        assert_eq!(file.sink_name().as_deref(), Some("file:/tmp/a.log"));

        let console = ReceiverConfig::Console(ConsoleConfig {
            name: Some("screen".into()),
            stream: ConsoleStream::Stderr,
        });
        assert_eq!(console.sink_name().as_deref(), Some("screen"));
    }

    #[test]
    fn test_unknown_receiver_type_rejected() {
        let json = r#"{ "receivers": [ { "type": "smtp" } ] }"#;
        assert!(serde_json::from_str::<LogConfig>(json).is_err());
    }
}
