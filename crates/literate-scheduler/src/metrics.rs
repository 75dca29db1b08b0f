//! Counters for scheduler activity

use serde::Serialize;

/// Counters collected by the scheduler's owner task
///
/// Published with every snapshot and logged on shutdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerMetrics {
    /// Extraction and correction requests sent to the client
    pub requests_issued: u64,

    /// Completions merged into the collection
    pub results_applied: u64,

    /// Completions dropped because a newer request had been issued
    pub stale_discarded: u64,

    /// Failures reported to the presentation layer
    pub errors_surfaced: u64,

    /// Timer expiries that found the text unchanged since the last merge
    pub duplicates_skipped: u64,

    /// Edits that arrived while the quiet-period timer was already running
    pub timer_restarts: u64,
}

impl SchedulerMetrics {
    /// Create new empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request sent to the client
    pub fn record_request(&mut self) {
        self.requests_issued += 1;
    }

    /// Record a merged completion
    pub fn record_applied(&mut self) {
        self.results_applied += 1;
    }

    /// Record a discarded stale completion
    pub fn record_stale(&mut self) {
        self.stale_discarded += 1;
    }

    /// Record a surfaced failure
    pub fn record_error(&mut self) {
        self.errors_surfaced += 1;
    }

    /// Record a skipped duplicate snapshot
    pub fn record_duplicate(&mut self) {
        self.duplicates_skipped += 1;
    }

    /// Record a timer restart
    pub fn record_timer_restart(&mut self) {
        self.timer_restarts += 1;
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Generate a summary report of metrics
    pub fn summary(&self) -> String {
        [
            "Scheduler Metrics Summary".to_string(),
            "=========================".to_string(),
            format!("Requests issued: {}", self.requests_issued),
            format!("Results applied: {}", self.results_applied),
            format!("Stale discarded: {}", self.stale_discarded),
            format!("Errors surfaced: {}", self.errors_surfaced),
            format!("Duplicates skipped: {}", self.duplicates_skipped),
            format!("Timer restarts: {}", self.timer_restarts),
        ]
        .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = SchedulerMetrics::new();
        assert_eq!(metrics.requests_issued, 0);
        assert_eq!(metrics.results_applied, 0);
        assert_eq!(metrics.stale_discarded, 0);
    }

    #[test]
    fn test_record_and_reset() {
        let mut metrics = SchedulerMetrics::new();
        metrics.record_request();
        metrics.record_request();
        metrics.record_applied();
        metrics.record_stale();
        metrics.record_error();
        metrics.record_duplicate();
        metrics.record_timer_restart();

        assert_eq!(metrics.requests_issued, 2);
        assert_eq!(metrics.results_applied, 1);
        assert_eq!(metrics.stale_discarded, 1);
        assert_eq!(metrics.errors_surfaced, 1);
        assert_eq!(metrics.duplicates_skipped, 1);
        assert_eq!(metrics.timer_restarts, 1);

        metrics.reset();
        assert_eq!(metrics, SchedulerMetrics::default());
    }

    #[test]
    fn test_summary() {
        let mut metrics = SchedulerMetrics::new();
        metrics.record_request();
        metrics.record_stale();

        let summary = metrics.summary();
        assert!(summary.contains("Requests issued: 1"));
        assert!(summary.contains("Stale discarded: 1"));
        assert!(summary.contains("Results applied: 0"));
    }
}
