//! `emit` command implementation.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use dispatcher::MetricsSnapshot;
use logger::{build_logger, Logger, LoggerStats};
use observability::DeliveryAggregator;
use tracing::{info, warn};

use crate::cli::EmitArgs;
use crate::error::CliError;

/// Execute the `emit` command
pub async fn run_emit(args: &EmitArgs) -> Result<()> {
    let config = super::load_config(&args.config)?;

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let logger = build_logger(&config).context("Failed to build logger")?;
    info!(
        mode = ?logger.mode(),
        level = %args.level,
        messages = args.messages.len(),
        repeat = args.repeat,
        "Emitting messages"
    );

    let mut aggregator = DeliveryAggregator::new();
    for _ in 0..args.repeat {
        for message in &args.messages {
            let started = Instant::now();
            logger.log(args.level, message);
            aggregator.record_dispatch(started.elapsed().as_secs_f64() * 1e6);
        }
    }

    let counters = CounterSource::of(&logger);
    logger
        .shutdown()
        .await
        .map_err(|e| CliError::shutdown(e.to_string()))?;
    // Async workers only settle their counters once the queue is drained
    counters.fold_into(&mut aggregator);

    if args.stats {
        print!("{}", aggregator.summary());
    }
    Ok(())
}

/// Where the logger keeps its delivery counters
enum CounterSource {
    Sync(Vec<(String, MetricsSnapshot)>),
    Async(Arc<LoggerStats>),
}

impl CounterSource {
    fn of(logger: &Logger) -> Self {
        match logger {
            Logger::Sync(sync) => CounterSource::Sync(sync.metrics()),
            Logger::Async(async_logger) => CounterSource::Async(Arc::clone(async_logger.stats())),
        }
    }

    /// Fold the logger's own counters into the summary
    fn fold_into(self, aggregator: &mut DeliveryAggregator) {
        match self {
            CounterSource::Sync(metrics) => {
                for (sink, snapshot) in metrics {
                    for _ in 0..snapshot.failure_count {
                        aggregator.record_failure(&sink);
                    }
                }
            }
            CounterSource::Async(stats) => {
                let dropped = stats.dropped();
                if dropped > 0 {
                    warn!(dropped, "Some messages were dropped");
                }
                for _ in 0..dropped {
                    aggregator.record_dropped();
                }
                for (sink, count) in stats.failures() {
                    for _ in 0..count {
                        aggregator.record_failure(&sink);
                    }
                }
            }
        }
    }
}
