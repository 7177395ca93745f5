//! TracingSink - re-emits formatted lines as tracing events

use contracts::{ContractError, Sink};
use tracing::info;

/// Sink that forwards every formatted line to the `tracing` subscriber
pub struct TracingSink {
    name: String,
}

impl TracingSink {
    /// Create a new TracingSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Sink for TracingSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write_str(&mut self, text: &str) -> Result<(), ContractError> {
        info!(sink = %self.name, line = %text.trim_end(), "Log event");
        Ok(())
    }
}
