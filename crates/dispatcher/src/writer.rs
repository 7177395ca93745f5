//! FormattedWriter - binds one sink to one formatter

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{ContractError, LogContext, LogLevel, SharedFormatter, Sink};
use tracing::debug;

use crate::error::DispatcherError;
use crate::metrics::WriterMetrics;

/// Sink owned elsewhere and lent to one or more writers
pub type SharedSink = Arc<Mutex<Box<dyn Sink>>>;

/// Who is responsible for closing a writer's sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkOwnership {
    /// The writer owns the sink and closes it on teardown
    Owned,
    /// The sink is shared; teardown flushes it but never closes it
    Shared,
}

impl fmt::Display for SinkOwnership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkOwnership::Owned => f.write_str("owned"),
            SinkOwnership::Shared => f.write_str("shared"),
        }
    }
}

enum SinkSlot {
    Owned(Box<dyn Sink>),
    Shared(SharedSink),
}

/// A sink paired with the formatter that renders events for it
pub struct FormattedWriter {
    name: String,
    sink: SinkSlot,
    formatter: SharedFormatter,
    metrics: Arc<WriterMetrics>,
}

impl FormattedWriter {
    /// Wrap an owned sink
    ///
    /// # Errors
    /// Returns `InvalidWriter` if the sink has an empty name.
    pub fn new(sink: Box<dyn Sink>, formatter: SharedFormatter) -> Result<Self, DispatcherError> {
        let name = checked_name(sink.name())?;
        Ok(Self {
            name,
            sink: SinkSlot::Owned(sink),
            formatter,
            metrics: Arc::new(WriterMetrics::new()),
        })
    }

    /// Wrap a sink that stays owned by the caller
    ///
    /// # Errors
    /// Returns `InvalidWriter` if the sink has an empty name.
    pub fn shared(sink: SharedSink, formatter: SharedFormatter) -> Result<Self, DispatcherError> {
        let name = {
            let guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
            checked_name(guard.name())?
        };
        Ok(Self {
            name,
            sink: SinkSlot::Shared(sink),
            formatter,
            metrics: Arc::new(WriterMetrics::new()),
        })
    }

    /// Sink name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether teardown closes the sink
    pub fn ownership(&self) -> SinkOwnership {
        match self.sink {
            SinkSlot::Owned(_) => SinkOwnership::Owned,
            SinkSlot::Shared(_) => SinkOwnership::Shared,
        }
    }

    /// Formatter used by this writer
    pub fn formatter(&self) -> &SharedFormatter {
        &self.formatter
    }

    /// Get current metrics
    pub fn metrics(&self) -> &Arc<WriterMetrics> {
        &self.metrics
    }

    /// Format and write one event
    pub fn write(
        &mut self,
        message: &str,
        level: LogLevel,
        context: &LogContext,
    ) -> Result<(), ContractError> {
        let text = self.formatter.format(message, level, context);
        let result = self.with_sink(|sink| sink.write_str(&text));
        match result {
            Ok(()) => self.metrics.inc_write_count(),
            Err(_) => self.metrics.inc_failure_count(),
        }
        result
    }

    /// Run `f` against the underlying sink, e.g. to check its capabilities
    pub fn with_sink<R>(&mut self, f: impl FnOnce(&mut dyn Sink) -> R) -> R {
        match &mut self.sink {
            SinkSlot::Owned(sink) => f(&mut **sink),
            SinkSlot::Shared(sink) => {
                let mut guard = sink.lock().unwrap_or_else(PoisonError::into_inner);
                f(&mut **guard)
            }
        }
    }

    /// Flush the sink if it is flushable
    ///
    /// Returns `Ok(false)` when the sink has no flush capability.
    pub fn flush_sink(&mut self) -> Result<bool, ContractError> {
        let flushed = self.with_sink(|sink| match sink.as_flushable() {
            Some(flushable) => flushable.flush().map(|()| true),
            None => Ok(false),
        })?;
        if flushed {
            self.metrics.inc_flush_count();
        }
        Ok(flushed)
    }

    /// Flush, swallowing any failure
    pub(crate) fn flush_quietly(&mut self) {
        if let Err(e) = self.flush_sink() {
            debug!(sink = %self.name, error = %e, "Flush failed, ignored");
        }
    }

    /// Close the sink if it is owned and closable
    ///
    /// Shared sinks are left open for their owner.
    pub fn close_sink(&mut self) -> Result<(), ContractError> {
        match &mut self.sink {
            SinkSlot::Owned(sink) => match sink.as_closable() {
                Some(closable) => closable.close(),
                None => Ok(()),
            },
            SinkSlot::Shared(_) => Ok(()),
        }
    }

    fn sink_description(&self) -> String {
        match &self.sink {
            SinkSlot::Owned(sink) => sink.describe(),
            SinkSlot::Shared(sink) => sink
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .describe(),
        }
    }
}

fn checked_name(name: &str) -> Result<String, DispatcherError> {
    if name.trim().is_empty() {
        return Err(DispatcherError::invalid_writer("sink name cannot be empty"));
    }
    Ok(name.to_string())
}

impl fmt::Display for FormattedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}], format: {}",
            self.sink_description(),
            self.ownership(),
            self.formatter
        )
    }
}

impl fmt::Debug for FormattedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormattedWriter")
            .field("name", &self.name)
            .field("ownership", &self.ownership())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemorySink;
    use contracts::PatternFormatter;

    fn formatter() -> SharedFormatter {
        PatternFormatter::new("%Lev|%Msg").unwrap().shared()
    }

    struct Bare;

    impl Sink for Bare {
        fn name(&self) -> &str {
            ""
        }

        fn write_str(&mut self, _text: &str) -> Result<(), ContractError> {
            Ok(())
        }
    }

    #[test]
    fn test_write_formats_before_sink() {
        let sink = MemorySink::new("mem");
        let handle = sink.handle();
        let mut writer = FormattedWriter::new(Box::new(sink), formatter()).unwrap();

        writer
            .write("hello", LogLevel::Info, &LogContext::default())
            .unwrap();

        assert_eq!(handle.lines(), vec!["Inf|hello".to_string()]);
        assert_eq!(writer.metrics().write_count(), 1);
        assert_eq!(writer.ownership(), SinkOwnership::Owned);
    }

    #[test]
    fn test_empty_sink_name_rejected() {
        let err = FormattedWriter::new(Box::new(Bare), formatter()).unwrap_err();
        assert!(matches!(err, DispatcherError::InvalidWriter { .. }));
    }

    #[test]
    fn test_capability_absent_is_not_an_error() {
        struct Named;
        impl Sink for Named {
            fn name(&self) -> &str {
                "named"
            }
            fn write_str(&mut self, _text: &str) -> Result<(), ContractError> {
                Ok(())
            }
        }

        let mut writer = FormattedWriter::new(Box::new(Named), formatter()).unwrap();
        assert!(!writer.flush_sink().unwrap());
        assert!(writer.close_sink().is_ok());
        assert_eq!(writer.metrics().flush_count(), 0);
    }

    #[test]
    fn test_shared_sink_is_not_closed() {
        let sink = MemorySink::new("shared");
        let handle = sink.handle();
        let shared: SharedSink = Arc::new(Mutex::new(Box::new(sink) as Box<dyn Sink>));
        let mut writer = FormattedWriter::shared(Arc::clone(&shared), formatter()).unwrap();

        assert!(writer.flush_sink().unwrap());
        writer.close_sink().unwrap();

        assert_eq!(handle.flush_count(), 1);
        assert_eq!(handle.close_count(), 0);
        assert_eq!(writer.ownership(), SinkOwnership::Shared);
    }

    #[test]
    fn test_display_names_sink_and_format() {
        let writer = FormattedWriter::new(Box::new(MemorySink::new("mem")), formatter()).unwrap();
        let text = writer.to_string();
        assert!(text.contains("memory:mem"));
        assert!(text.contains("[owned]"));
        assert!(text.contains("%Lev|%Msg"));
    }
}
