//! FilterNode - dispatcher that only forwards selected levels

use std::collections::BTreeSet;

use contracts::{LogContext, LogLevel};

use crate::dispatcher::Dispatcher;
use crate::error::DispatcherError;
use crate::metrics::MetricsSnapshot;
use crate::node::DispatchNode;

/// Child node forwarding an event to its inner dispatcher only when the
/// event's level is in the allowed set. Flush and close always pass through.
#[derive(Debug)]
pub struct FilterNode {
    levels: BTreeSet<LogLevel>,
    inner: Dispatcher,
}

impl FilterNode {
    pub fn new(levels: impl IntoIterator<Item = LogLevel>, inner: Dispatcher) -> Self {
        Self {
            levels: levels.into_iter().collect(),
            inner,
        }
    }

    /// Forward only levels at or above `min`
    pub fn at_least(min: LogLevel, inner: Dispatcher) -> Self {
        Self::new(LogLevel::ALL.into_iter().filter(|l| *l >= min), inner)
    }

    pub fn allows(&self, level: LogLevel) -> bool {
        self.levels.contains(&level)
    }

    pub fn inner(&self) -> &Dispatcher {
        &self.inner
    }
}

impl DispatchNode for FilterNode {
    fn dispatch(
        &mut self,
        message: &str,
        level: LogLevel,
        context: &LogContext,
        on_error: &mut dyn FnMut(DispatcherError),
    ) {
        if self.allows(level) {
            self.inner.dispatch(message, level, context, on_error);
        }
    }

    fn flush(&mut self) {
        self.inner.flush();
    }

    fn close(&mut self) -> Result<(), DispatcherError> {
        self.inner.close()
    }

    fn describe(&self) -> String {
        let levels: Vec<_> = self.levels.iter().map(LogLevel::as_str).collect();
        format!("Filter[{}] {}", levels.join(", "), self.inner.describe())
    }

    fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.inner.metrics()
    }
}
