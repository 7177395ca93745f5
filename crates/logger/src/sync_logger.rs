//! SyncLogger - dispatches on the calling thread

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use contracts::{LogContext, LogLevel};
use dispatcher::{Dispatcher, DispatcherError, MetricsSnapshot};
use tracing::{debug, instrument};

use crate::error::LoggerError;
use crate::report::report_delivery_error;

type ErrorHandler = Box<dyn FnMut(DispatcherError) + Send>;

struct Inner {
    root: Dispatcher,
    on_error: ErrorHandler,
}

/// Logger that pushes every accepted event through the tree before returning.
///
/// The tree is guarded by a mutex, so concurrent callers are serialized.
pub struct SyncLogger {
    inner: Mutex<Inner>,
    min_level: LogLevel,
}

impl SyncLogger {
    /// Wrap a root dispatcher; events below `min_level` are discarded
    pub fn new(root: Dispatcher, min_level: LogLevel) -> Self {
        Self::with_error_handler(root, min_level, report_delivery_error)
    }

    /// Like `new`, with a custom handler for per-destination failures
    pub fn with_error_handler(
        root: Dispatcher,
        min_level: LogLevel,
        on_error: impl FnMut(DispatcherError) + Send + 'static,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                root,
                on_error: Box::new(on_error),
            }),
            min_level,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Log `message` at `level` with the caller's location as context
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) {
        self.log_with_context(level, message, &LogContext::caller());
    }

    /// Log with an explicit context
    pub fn log_with_context(&self, level: LogLevel, message: &str, context: &LogContext) {
        if !self.enabled(level) {
            return;
        }
        observability::record_event_logged(level);

        let started = Instant::now();
        let mut guard = self.lock();
        let Inner { root, on_error } = &mut *guard;
        root.dispatch(message, level, context, on_error);
        observability::record_dispatch_latency_us(started.elapsed().as_secs_f64() * 1e6);
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: &str) {
        self.log(LogLevel::Critical, message);
    }

    /// Best-effort flush of the whole tree
    pub fn flush(&self) {
        self.lock().root.flush();
    }

    /// Flush and close the whole tree
    #[instrument(name = "sync_logger_close", skip(self))]
    pub fn close(&self) -> Result<(), LoggerError> {
        let result = self.lock().root.close();
        if result.is_err() {
            observability::record_close_failure();
        }
        debug!(ok = result.is_ok(), "SyncLogger closed");
        Ok(result?)
    }

    /// Tree dump, see `Dispatcher::describe`
    pub fn describe(&self) -> String {
        self.lock().root.describe()
    }

    /// Per-writer metrics of the tree
    pub fn metrics(&self) -> Vec<(String, MetricsSnapshot)> {
        self.lock().root.metrics()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, PatternFormatter, Sink};
    use dispatcher::{MemoryHandle, MemorySink};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Broken;

    impl Sink for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn write_str(&mut self, _text: &str) -> Result<(), ContractError> {
            Err(ContractError::sink_write("broken", "disk full"))
        }
    }

    fn logger(min_level: LogLevel) -> (SyncLogger, MemoryHandle) {
        let sink = MemorySink::new("mem");
        let handle = sink.handle();
        let root = Dispatcher::builder()
            .formatter(PatternFormatter::new("%Lev %File %Msg").unwrap().shared())
            .sink(sink)
            .build()
            .unwrap();
        (SyncLogger::new(root, min_level), handle)
    }

    #[test]
    fn test_min_level_filters_before_tree() {
        let (logger, handle) = logger(LogLevel::Info);

        logger.debug("hidden");
        logger.info("shown");
        logger.critical("loud");

        assert_eq!(
            handle.lines(),
            vec!["Inf sync_logger.rs shown", "Crt sync_logger.rs loud"]
        );
    }

    #[test]
    fn test_close_closes_tree_once() {
        let (logger, handle) = logger(LogLevel::Trace);

        logger.info("before");
        logger.close().unwrap();
        logger.info("after");

        assert_eq!(handle.lines().len(), 1);
        assert_eq!(handle.close_count(), 1);
        assert!(matches!(
            logger.close(),
            Err(LoggerError::Dispatcher(DispatcherError::Closed))
        ));
    }

    #[test]
    fn test_custom_error_handler_sees_each_failure() {
        let failures = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&failures);
        let sink = MemorySink::new("ok");
        let handle = sink.handle();
        let root = Dispatcher::builder()
            .formatter(PatternFormatter::new("%Msg").unwrap().shared())
            .sink(Broken)
            .sink(sink)
            .build()
            .unwrap();
        let logger = SyncLogger::with_error_handler(root, LogLevel::Trace, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..3 {
            logger.warn("x");
        }

        assert_eq!(failures.load(Ordering::SeqCst), 3);
        assert_eq!(handle.lines().len(), 3);
        assert_eq!(logger.metrics()[0].1.failure_count, 3);
    }
}
