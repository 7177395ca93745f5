//! Delivery metrics
//!
//! Counters go through the `metrics` facade (exported by Prometheus when
//! installed); `DeliveryAggregator` keeps an in-memory summary for reports.

use std::collections::HashMap;

use contracts::LogLevel;
use metrics::{counter, histogram};

/// Record one event accepted by a logger
pub fn record_event_logged(level: LogLevel) {
    counter!("logtree_events_logged_total", "level" => level.as_str()).increment(1);
}

/// Record a failed write to one sink
pub fn record_write_failure(sink_name: &str) {
    counter!(
        "logtree_write_failures_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record a failed teardown
pub fn record_close_failure() {
    counter!("logtree_close_failures_total").increment(1);
}

/// Record an event dropped before reaching the tree (queue full)
pub fn record_event_dropped() {
    counter!("logtree_events_dropped_total").increment(1);
}

/// Record how long one dispatch through the tree took
pub fn record_dispatch_latency_us(latency_us: f64) {
    histogram!("logtree_dispatch_latency_us").record(latency_us);
}

/// In-memory delivery aggregator
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// Events dispatched into the tree
    pub total_events: u64,

    /// Events dropped before dispatch
    pub total_dropped: u64,

    /// Failed writes per sink
    pub failures: HashMap<String, u64>,

    /// Dispatch latency (microseconds)
    pub latency_stats: RunningStats,
}

impl DeliveryAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one dispatched event and its latency
    pub fn record_dispatch(&mut self, latency_us: f64) {
        self.total_events += 1;
        self.latency_stats.push(latency_us);
    }

    /// Count one failed write
    pub fn record_failure(&mut self, sink_name: &str) {
        *self.failures.entry(sink_name.to_string()).or_insert(0) += 1;
    }

    /// Count one dropped event
    pub fn record_dropped(&mut self) {
        self.total_dropped += 1;
    }

    /// Generate summary report
    pub fn summary(&self) -> DeliverySummary {
        let total_failures = self.failures.values().sum();
        DeliverySummary {
            total_events: self.total_events,
            total_dropped: self.total_dropped,
            total_failures,
            drop_rate: if self.total_events + self.total_dropped > 0 {
                self.total_dropped as f64 / (self.total_events + self.total_dropped) as f64
                    * 100.0
            } else {
                0.0
            },
            latency_us: StatsSummary::from(&self.latency_stats),
            sink_failures: self.failures.clone(),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Delivery summary
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub total_events: u64,
    pub total_dropped: u64,
    pub total_failures: u64,
    pub drop_rate: f64,
    pub latency_us: StatsSummary,
    pub sink_failures: HashMap<String, u64>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Events dispatched: {}", self.total_events)?;
        writeln!(
            f,
            "Events dropped: {} ({:.2}%)",
            self.total_dropped, self.drop_rate
        )?;
        writeln!(f, "Write failures: {}", self.total_failures)?;
        writeln!(f, "Dispatch latency (us): {}", self.latency_us)?;

        if !self.sink_failures.is_empty() {
            let mut sinks: Vec<_> = self.sink_failures.iter().collect();
            sinks.sort();
            writeln!(f, "Failures per sink:")?;
            for (sink, count) in sinks {
                writeln!(f, "  {}: {}", sink, count)?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_summary() {
        let mut aggregator = DeliveryAggregator::new();
        aggregator.record_dispatch(10.0);
        aggregator.record_dispatch(30.0);
        aggregator.record_dropped();
        aggregator.record_dropped();
        aggregator.record_failure("file:a.log");
        aggregator.record_failure("file:a.log");
        aggregator.record_failure("udp:1.2.3.4:9");

        let summary = aggregator.summary();
        assert_eq!(summary.total_events, 2);
        assert_eq!(summary.total_failures, 3);
        assert!((summary.drop_rate - 50.0).abs() < 1e-10);
        assert!((summary.latency_us.mean - 20.0).abs() < 1e-10);

        let output = summary.to_string();
        assert!(output.contains("Events dispatched: 2"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("  file:a.log: 2"));
    }

    #[test]
    fn test_facade_calls_without_recorder() {
        record_event_logged(LogLevel::Info);
        record_write_failure("nowhere");
        record_event_dropped();
        record_close_failure();
        record_dispatch_latency_us(1.5);
    }
}
