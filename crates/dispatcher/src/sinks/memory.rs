//! MemorySink - captures formatted lines in memory

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{Closable, ContractError, Flushable, Sink};

// Process-wide write counter, lets callers compare delivery order across sinks.
static WRITE_SEQUENCE: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Default)]
struct Captured {
    lines: Mutex<Vec<String>>,
    last_sequence: Mutex<Option<u64>>,
    flush_count: AtomicU64,
    close_count: AtomicU64,
}

/// Sink that records every line it receives.
///
/// The sink itself usually moves into a dispatch tree; keep a
/// [`MemoryHandle`] to inspect what it captured.
pub struct MemorySink {
    name: String,
    captured: Arc<Captured>,
    closed: bool,
}

/// Read side of a [`MemorySink`]
#[derive(Debug, Clone)]
pub struct MemoryHandle {
    captured: Arc<Captured>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            captured: Arc::new(Captured::default()),
            closed: false,
        }
    }

    pub fn handle(&self) -> MemoryHandle {
        MemoryHandle {
            captured: Arc::clone(&self.captured),
        }
    }
}

impl MemoryHandle {
    /// Captured lines, in write order
    pub fn lines(&self) -> Vec<String> {
        self.captured
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All captured lines concatenated
    pub fn contents(&self) -> String {
        self.lines().concat()
    }

    /// Global sequence number of the latest write, if any
    pub fn last_sequence(&self) -> Option<u64> {
        *self
            .captured
            .last_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn flush_count(&self) -> u64 {
        self.captured.flush_count.load(Ordering::Relaxed)
    }

    pub fn close_count(&self) -> u64 {
        self.captured.close_count.load(Ordering::Relaxed)
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        if self.closed {
            return Err(ContractError::sink_write(&self.name, "sink is closed"));
        }
        let seq = WRITE_SEQUENCE.fetch_add(1, Ordering::SeqCst);
        self.captured
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_string());
        *self
            .captured
            .last_sequence
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(seq);
        Ok(())
    }

    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        Some(self)
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        Some(self)
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

impl Flushable for MemorySink {
    fn flush(&mut self) -> Result<(), ContractError> {
        self.captured.flush_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Closable for MemorySink {
    fn close(&mut self) -> Result<(), ContractError> {
        self.closed = true;
        self.captured.close_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_captures_in_order() {
        let mut sink = MemorySink::new("mem");
        let handle = sink.handle();

        sink.write_str("a").unwrap();
        let first = handle.last_sequence();
        sink.write_str("b").unwrap();

        assert_eq!(handle.lines(), vec!["a", "b"]);
        assert_eq!(handle.contents(), "ab");
        assert!(first < handle.last_sequence());
    }

    #[test]
    fn test_memory_sink_refuses_writes_after_close() {
        let mut sink = MemorySink::new("mem");
        let handle = sink.handle();

        sink.close().unwrap();

        assert!(sink.write_str("late").is_err());
        assert_eq!(handle.close_count(), 1);
        assert!(handle.lines().is_empty());
    }
}
