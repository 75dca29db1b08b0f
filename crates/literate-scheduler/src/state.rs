//! What the scheduler publishes to the presentation layer

use crate::metrics::SchedulerMetrics;
use literate_domain::{ErrorKind, ExtractionError, MergeSummary, ObjectCollection};
use serde::Serialize;

/// Progress of the request pipeline
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestState {
    /// An edit is waiting for the quiet period to elapse
    pub pending: bool,

    /// Sequence of the newest request still awaiting its completion
    pub in_flight: Option<u64>,

    /// Highest sequence number handed out
    pub latest_issued: u64,

    /// Sequence of the last completion merged into the collection
    pub latest_applied: u64,

    /// Failure from the newest request, cleared by the next merge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ExtractionError>,
}

impl RequestState {
    /// True if nothing is pending or in flight
    pub fn is_idle(&self) -> bool {
        !self.pending && self.in_flight.is_none()
    }

    /// Short label for status lines
    pub fn label(&self) -> &'static str {
        match (self.pending, self.in_flight, &self.last_error) {
            (_, Some(_), _) => "extracting",
            (true, None, _) => "waiting",
            (false, None, Some(_)) => "error",
            (false, None, None) => "idle",
        }
    }
}

/// Immutable view handed to readers on every change
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    /// Current objects in display order
    pub objects: ObjectCollection,

    /// Request pipeline progress
    pub request: RequestState,

    /// Counters so far
    pub metrics: SchedulerMetrics,
}

/// Notifications emitted by the owner task
///
/// Stale completions never produce an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// A request was sent to the extraction client
    RequestIssued {
        /// Sequence number of the request
        sequence: u64,
    },

    /// A full extraction result was merged
    Applied {
        /// Sequence number of the merged request
        sequence: u64,
        /// What changed
        summary: MergeSummary,
    },

    /// A correction was merged
    Corrected {
        /// Sequence number of the correction request
        sequence: u64,
        /// Name the correction was requested for
        target: String,
        /// What changed; empty when the service offered nothing
        summary: MergeSummary,
    },

    /// The timer fired but the text matched the last merged snapshot
    DuplicateSkipped,

    /// The newest request failed
    Error {
        /// Transport or schema
        kind: ErrorKind,
        /// Human-readable detail
        message: String,
        /// Sequence number of the failed request
        sequence: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = RequestState::default();
        assert!(state.is_idle());
        assert_eq!(state.label(), "idle");
    }

    #[test]
    fn test_labels() {
        let mut state = RequestState {
            pending: true,
            ..Default::default()
        };
        assert_eq!(state.label(), "waiting");

        state.in_flight = Some(3);
        assert_eq!(state.label(), "extracting");
        assert!(!state.is_idle());

        state.pending = false;
        state.in_flight = None;
        state.last_error = Some(ExtractionError::Transport("refused".into()));
        assert_eq!(state.label(), "error");
        assert!(state.is_idle());
    }
}
