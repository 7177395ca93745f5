//! Sink implementations
//!
//! Contains ConsoleSink, FileSink, MemorySink, TracingSink and UdpSink.

mod console;
mod file;
mod log;
mod memory;
mod network;

pub use self::console::ConsoleSink;
pub use self::file::FileSink;
pub use self::log::TracingSink;
pub use self::memory::{MemoryHandle, MemorySink};
pub use self::network::UdpSink;
