//! ConsoleSink - stdout / stderr

use std::io::{self, Write};

use contracts::{ConsoleStream, ContractError, Flushable, Sink};

/// Sink writing to the process's standard output or error
pub struct ConsoleSink {
    name: String,
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(name: impl Into<String>, stream: ConsoleStream) -> Self {
        Self {
            name: name.into(),
            stream,
        }
    }

    pub fn stdout() -> Self {
        Self::new("console:stdout", ConsoleStream::Stdout)
    }

    pub fn stderr() -> Self {
        Self::new("console:stderr", ConsoleStream::Stderr)
    }

    fn write_bytes(&self, bytes: &[u8]) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().lock().write_all(bytes),
            ConsoleStream::Stderr => io::stderr().lock().write_all(bytes),
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        self.write_bytes(text.as_bytes())
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("console ({})", self.stream.as_str())
    }
}

impl Flushable for ConsoleSink {
    fn flush(&mut self) -> Result<(), ContractError> {
        match self.stream {
            ConsoleStream::Stdout => io::stdout().flush()?,
            ConsoleStream::Stderr => io::stderr().flush()?,
        }
        Ok(())
    }
}
