//! # Dispatcher
//!
//! Log dispatch tree.
//!
//! Responsibilities:
//! - Fan a log event out to writers, then to nested dispatchers
//! - Isolate a failing destination from its siblings
//! - Flush and close every sink the tree owns, children first

pub mod dispatcher;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod node;
pub mod sinks;
pub mod writer;

pub use contracts::{Closable, Flushable, Formatter, LogContext, LogLevel, SharedFormatter, Sink};
pub use dispatcher::{create_dispatcher, Dispatcher, DispatcherBuilder};
pub use error::DispatcherError;
pub use filter::FilterNode;
pub use metrics::{MetricsSnapshot, WriterMetrics};
pub use node::{DispatchNode, Receiver};
pub use sinks::{ConsoleSink, FileSink, MemoryHandle, MemorySink, TracingSink, UdpSink};
pub use writer::{FormattedWriter, SharedSink, SinkOwnership};
