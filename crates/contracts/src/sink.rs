//! Sink traits - Dispatcher output interface
//!
//! A sink is a raw destination for formatted text. Flushing and closing are
//! optional capabilities: a sink declares them by overriding `as_flushable` /
//! `as_closable`, and callers check for them at use time.

use crate::ContractError;

/// Raw writable destination for formatted log text
pub trait Sink: Send {
    /// Sink name (used for diagnostics and metrics)
    fn name(&self) -> &str;

    /// Write one already formatted event
    ///
    /// # Errors
    /// Returns write error (should include the sink name)
    fn write_str(&mut self, text: &str) -> Result<(), ContractError>;

    /// Flush capability, if the sink buffers
    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        None
    }

    /// Close capability, if the sink holds a releasable resource
    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        None
    }

    /// One-line description for tree diagnostics
    fn describe(&self) -> String {
        self.name().to_string()
    }
}

/// Optional capability: push buffered data to the destination
pub trait Flushable {
    fn flush(&mut self) -> Result<(), ContractError>;
}

/// Optional capability: release the underlying resource
pub trait Closable {
    fn close(&mut self) -> Result<(), ContractError>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        (**self).write_str(text)
    }

    fn as_flushable(&mut self) -> Option<&mut dyn Flushable> {
        (**self).as_flushable()
    }

    fn as_closable(&mut self) -> Option<&mut dyn Closable> {
        (**self).as_closable()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
