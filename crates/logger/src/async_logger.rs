//! AsyncLogger - bounded queue in front of a worker task that owns the tree

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use contracts::{LogContext, LogLevel};
use dispatcher::{Dispatcher, DispatcherError};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, instrument, warn};

use crate::error::LoggerError;
use crate::report::report_delivery_error;

/// Message from the logging front end to the worker
#[derive(Debug)]
enum Command {
    Event {
        level: LogLevel,
        message: String,
        context: LogContext,
    },
    Flush,
}

/// When the worker hands queued events to the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Dispatch each event as soon as it is received
    Immediate,
    /// Dispatch one queued event per period; the rest is delivered at shutdown
    Interval(Duration),
}

/// Queue counters shared between the front end and the worker
#[derive(Debug, Default)]
pub struct LoggerStats {
    queued: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    failures: Mutex<BTreeMap<String, u64>>,
}

impl LoggerStats {
    /// Events accepted into the queue
    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    /// Events handed to the tree by the worker
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Events rejected because the queue was full or the worker was gone
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Failed writes per sink name, as seen by the worker
    pub fn failures(&self) -> Vec<(String, u64)> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect()
    }

    fn record_failure(&self, sink_name: &str) {
        let mut failures = self.failures.lock().unwrap_or_else(PoisonError::into_inner);
        *failures.entry(sink_name.to_string()).or_default() += 1;
    }

    fn inc_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handle to a running logger worker.
///
/// The root dispatcher moves into the worker task; every call on the handle
/// only touches the queue. `shutdown` drains the queue and closes the tree.
pub struct AsyncLogger {
    min_level: LogLevel,
    tx: mpsc::Sender<Command>,
    stop_tx: oneshot::Sender<()>,
    stats: Arc<LoggerStats>,
    worker_handle: JoinHandle<Result<(), DispatcherError>>,
    description: String,
    pacing: Pacing,
}

impl AsyncLogger {
    /// Spawn the worker on the current Tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, like `tokio::spawn`.
    pub fn spawn(root: Dispatcher, min_level: LogLevel, capacity: usize, pacing: Pacing) -> Self {
        let description = root.describe();
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let (stop_tx, stop_rx) = oneshot::channel();
        let stats = Arc::new(LoggerStats::default());

        let worker_stats = Arc::clone(&stats);
        let worker_handle = tokio::spawn(async move {
            logger_worker(root, rx, stop_rx, worker_stats, pacing).await
        });

        Self {
            min_level,
            tx,
            stop_tx,
            stats,
            worker_handle,
            description,
            pacing,
        }
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Queue an event without waiting.
    ///
    /// Returns true if queued, false if below the minimum level or dropped.
    #[track_caller]
    pub fn try_log(&self, level: LogLevel, message: &str) -> bool {
        self.try_log_with_context(level, message, LogContext::caller())
    }

    /// `try_log` with an explicit context
    pub fn try_log_with_context(&self, level: LogLevel, message: &str, context: LogContext) -> bool {
        if !self.enabled(level) {
            return false;
        }

        let command = Command::Event {
            level,
            message: message.to_string(),
            context,
        };
        match self.tx.try_send(command) {
            Ok(()) => {
                self.stats.inc_queued();
                observability::record_event_logged(level);
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.stats.inc_dropped();
                observability::record_event_dropped();
                warn!(level = %level, "Log queue full, event dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.stats.inc_dropped();
                observability::record_event_dropped();
                error!("Logger worker closed unexpectedly");
                false
            }
        }
    }

    /// Fire-and-forget logging call
    #[track_caller]
    pub fn log(&self, level: LogLevel, message: &str) {
        self.try_log(level, message);
    }

    /// Queue an event, waiting for room when the queue is full
    pub async fn send(
        &self,
        level: LogLevel,
        message: &str,
        context: LogContext,
    ) -> Result<(), LoggerError> {
        if !self.enabled(level) {
            return Ok(());
        }

        let command = Command::Event {
            level,
            message: message.to_string(),
            context,
        };
        self.tx
            .send(command)
            .await
            .map_err(|_| LoggerError::Worker("logger worker has stopped".to_string()))?;
        self.stats.inc_queued();
        observability::record_event_logged(level);
        Ok(())
    }

    #[track_caller]
    pub fn trace(&self, message: &str) {
        self.try_log(LogLevel::Trace, message);
    }

    #[track_caller]
    pub fn debug(&self, message: &str) {
        self.try_log(LogLevel::Debug, message);
    }

    #[track_caller]
    pub fn info(&self, message: &str) {
        self.try_log(LogLevel::Info, message);
    }

    #[track_caller]
    pub fn warn(&self, message: &str) {
        self.try_log(LogLevel::Warn, message);
    }

    #[track_caller]
    pub fn error(&self, message: &str) {
        self.try_log(LogLevel::Error, message);
    }

    #[track_caller]
    pub fn critical(&self, message: &str) {
        self.try_log(LogLevel::Critical, message);
    }

    /// Ask the worker to flush the tree after the events queued so far.
    ///
    /// Returns false if the request could not be queued.
    pub fn flush(&self) -> bool {
        self.tx.try_send(Command::Flush).is_ok()
    }

    pub fn stats(&self) -> &Arc<LoggerStats> {
        &self.stats
    }

    /// Tree dump taken when the worker was spawned
    pub fn describe(&self) -> &str {
        &self.description
    }

    /// Stop accepting events, deliver what is queued, then close the tree
    #[instrument(name = "async_logger_shutdown", skip(self))]
    pub async fn shutdown(self) -> Result<(), LoggerError> {
        // Dropping the only sender ends the worker's receive loop
        drop(self.tx);
        let _ = self.stop_tx.send(());

        let result = match self.worker_handle.await {
            Ok(result) => result.map_err(LoggerError::from),
            Err(e) => {
                error!(error = ?e, "Logger worker panicked");
                Err(LoggerError::Worker(e.to_string()))
            }
        };
        if result.is_err() {
            observability::record_close_failure();
        }
        debug!(
            delivered = self.stats.delivered(),
            dropped = self.stats.dropped(),
            failed_sinks = self.stats.failures().len(),
            "AsyncLogger shutdown complete"
        );
        result
    }
}

/// Worker task that owns the tree
#[instrument(name = "logger_worker_loop", skip(root, rx, stop_rx, stats))]
async fn logger_worker(
    mut root: Dispatcher,
    mut rx: mpsc::Receiver<Command>,
    mut stop_rx: oneshot::Receiver<()>,
    stats: Arc<LoggerStats>,
    pacing: Pacing,
) -> Result<(), DispatcherError> {
    debug!("Logger worker started");

    match pacing {
        Pacing::Immediate => {
            while let Some(command) = rx.recv().await {
                apply(&mut root, command, &stats);
            }
        }
        Pacing::Interval(period) => {
            let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    // Err means the handle was dropped without shutdown
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        if !release_one(&mut root, &mut rx, &stats) {
                            break;
                        }
                    }
                }
            }
            // Shutdown: deliver everything still queued
            while let Some(command) = rx.recv().await {
                apply(&mut root, command, &stats);
            }
        }
    }

    let result = root.close();
    if let Err(e) = &result {
        error!(error = %e, "Close failed on shutdown");
    }
    debug!("Logger worker stopped");
    result
}

/// Apply queued commands up to and including the next event.
///
/// Returns false once the queue is empty and every sender is gone.
fn release_one(
    root: &mut Dispatcher,
    rx: &mut mpsc::Receiver<Command>,
    stats: &LoggerStats,
) -> bool {
    loop {
        match rx.try_recv() {
            Ok(command @ Command::Flush) => apply(root, command, stats),
            Ok(command) => {
                apply(root, command, stats);
                return true;
            }
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

fn apply(root: &mut Dispatcher, command: Command, stats: &LoggerStats) {
    match command {
        Command::Event {
            level,
            message,
            context,
        } => {
            let started = Instant::now();
            root.dispatch(&message, level, &context, &mut |err| {
                if let DispatcherError::Write { sink_name, .. } = &err {
                    stats.record_failure(sink_name);
                }
                report_delivery_error(err);
            });
            stats.inc_delivered();
            observability::record_dispatch_latency_us(started.elapsed().as_secs_f64() * 1e6);
        }
        Command::Flush => root.flush(),
    }
}
