//! Operation timing side channel.
//!
//! Every client operation runs inside an [`OperationTimer`]. The timer
//! reports `(operation, elapsed, outcome)` to an [`OperationMetrics`] sink
//! when it is finished, or when it is dropped mid-flight because the caller
//! abandoned the future. Metrics never influence the result of an operation.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::debug;

/// How a timed operation ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Success => "success",
            Outcome::Failure => "failure",
            Outcome::Cancelled => "cancelled",
        })
    }
}

/// Receiver of operation timings.
pub trait OperationMetrics: Send + Sync {
    fn record(&self, operation: &'static str, elapsed: Duration, outcome: Outcome);
}

/// Emits each timing as a `tracing` event on the `payload_client::metrics` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingMetrics;

impl OperationMetrics for TracingMetrics {
    fn record(&self, operation: &'static str, elapsed: Duration, outcome: Outcome) {
        debug!(
            target: "payload_client::metrics",
            operation,
            elapsed_ms = elapsed.as_millis() as u64,
            %outcome,
            "operation timed"
        );
    }
}

/// One recorded timing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationSample {
    pub operation: &'static str,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

/// Keeps every timing in memory. Useful for tests and diagnostics.
///
/// A recorder panicking mid-push does not lose the samples already kept.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    samples: Mutex<Vec<OperationSample>>,
}

impl RecordingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<OperationSample> {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of samples recorded for `operation`.
    pub fn count(&self, operation: &str) -> usize {
        self.samples()
            .iter()
            .filter(|s| s.operation == operation)
            .count()
    }
}

impl OperationMetrics for RecordingMetrics {
    fn record(&self, operation: &'static str, elapsed: Duration, outcome: Outcome) {
        self.samples
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(OperationSample {
                operation,
                elapsed,
                outcome,
            });
    }
}

/// Scoped timing region for one operation.
pub struct OperationTimer {
    metrics: Arc<dyn OperationMetrics>,
    operation: &'static str,
    started: Instant,
    reported: bool,
}

impl OperationTimer {
    pub fn start(metrics: Arc<dyn OperationMetrics>, operation: &'static str) -> Self {
        Self {
            metrics,
            operation,
            started: Instant::now(),
            reported: false,
        }
    }

    /// Report the timing with the given outcome.
    pub fn finish(mut self, outcome: Outcome) {
        self.report(outcome);
    }

    fn report(&mut self, outcome: Outcome) {
        if !self.reported {
            self.reported = true;
            self.metrics
                .record(self.operation, self.started.elapsed(), outcome);
        }
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        // Dropped without finish(): the caller abandoned the operation.
        self.report(Outcome::Cancelled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_records_once() {
        let metrics = Arc::new(RecordingMetrics::new());
        let timer = OperationTimer::start(metrics.clone(), "read_payload_data");
        timer.finish(Outcome::Success);

        let samples = metrics.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].operation, "read_payload_data");
        assert_eq!(samples[0].outcome, Outcome::Success);
    }

    #[test]
    fn dropped_timer_reports_cancelled() {
        let metrics = Arc::new(RecordingMetrics::new());
        {
            let _timer = OperationTimer::start(metrics.clone(), "create_payload");
        }
        let samples = metrics.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].outcome, Outcome::Cancelled);
    }

    #[test]
    fn count_filters_by_operation() {
        let metrics = RecordingMetrics::new();
        metrics.record("a", Duration::from_millis(1), Outcome::Success);
        metrics.record("b", Duration::from_millis(2), Outcome::Failure);
        metrics.record("a", Duration::from_millis(3), Outcome::Success);
        assert_eq!(metrics.count("a"), 2);
        assert_eq!(metrics.count("b"), 1);
        assert_eq!(metrics.count("c"), 0);
    }

    #[test]
    fn poisoned_recorder_keeps_recording() {
        let metrics = Arc::new(RecordingMetrics::new());
        metrics.record("before", Duration::ZERO, Outcome::Success);

        let poisoner = Arc::clone(&metrics);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.samples.lock().unwrap();
            panic!("recorder died holding the lock");
        })
        .join();

        metrics.record("after", Duration::ZERO, Outcome::Failure);
        assert_eq!(metrics.count("before"), 1);
        assert_eq!(metrics.count("after"), 1);
    }

    #[test]
    fn tracing_metrics_is_side_effect_free() {
        TracingMetrics.record("noop", Duration::ZERO, Outcome::Failure);
    }
}
