//! Dispatch metrics for observability
//!
//! Sink failures never reach the log call site. These counters are the
//! diagnostic channel through which they stay observable.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing dispatch and delivery health
///
/// # Example
///
/// ```
/// use rust_log_facade::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
///
/// metrics.record_dispatched();
/// metrics.record_delivered();
/// metrics.record_failure();
///
/// assert_eq!(metrics.dispatched(), 1);
/// assert_eq!(metrics.delivered(), 1);
/// assert_eq!(metrics.sink_failures(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Messages that passed the level gate and were fanned out
    dispatched: AtomicU64,

    /// Successful output invocations
    delivered: AtomicU64,

    /// Output invocations that returned an error
    sink_failures: AtomicU64,

    /// Output invocations that panicked
    sink_panics: AtomicU64,

    /// Messages discarded before delivery (full background queue)
    dropped: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            sink_failures: AtomicU64::new(0),
            sink_panics: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_failures(&self) -> u64 {
        self.sink_failures.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn sink_panics(&self) -> u64 {
        self.sink_panics.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Failures of any kind: errors plus panics
    pub fn total_failures(&self) -> u64 {
        self.sink_failures() + self.sink_panics()
    }

    /// Record a fanned-out message, returning the previous count
    #[inline]
    pub fn record_dispatched(&self) -> u64 {
        self.dispatched.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_delivered(&self) -> u64 {
        self.delivered.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failure(&self) -> u64 {
        self.sink_failures.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_panic(&self) -> u64 {
        self.sink_panics.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_dropped(&self) -> u64 {
        self.dropped.fetch_add(1, Ordering::Relaxed)
    }

    /// Failed deliveries as a percentage (0.0 - 100.0) of all attempts
    ///
    /// Returns 0.0 if nothing has been delivered or attempted.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.total_failures() as f64;
        let total = self.delivered() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.dispatched.store(0, Ordering::Relaxed);
        self.delivered.store(0, Ordering::Relaxed);
        self.sink_failures.store(0, Ordering::Relaxed);
        self.sink_panics.store(0, Ordering::Relaxed);
        self.dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            dispatched: AtomicU64::new(self.dispatched()),
            delivered: AtomicU64::new(self.delivered()),
            sink_failures: AtomicU64::new(self.sink_failures()),
            sink_panics: AtomicU64::new(self.sink_panics()),
            dropped: AtomicU64::new(self.dropped()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.delivered(), 0);
        assert_eq!(metrics.sink_failures(), 0);
        assert_eq!(metrics.sink_panics(), 0);
        assert_eq!(metrics.dropped(), 0);
    }

    #[test]
    fn test_record_returns_previous() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_failure(), 0);
        assert_eq!(metrics.record_failure(), 1);
        assert_eq!(metrics.sink_failures(), 2);
    }

    #[test]
    fn test_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_delivered();
        }
        for _ in 0..5 {
            metrics.record_failure();
            metrics.record_panic();
        }

        let rate = metrics.failure_rate();
        assert!((9.9..=10.1).contains(&rate), "Failure rate was {}", rate);
    }

    #[test]
    fn test_reset_and_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_dispatched();
        metrics.record_dropped();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.dispatched(), 0);
        assert_eq!(metrics.dropped(), 0);
        assert_eq!(snapshot.dispatched(), 1);
        assert_eq!(snapshot.dropped(), 1);
    }
}
