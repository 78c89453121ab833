//! # Progress events delivered to the report sink.
//!
//! A run emits exactly one [`ProgressEvent`] per job it accounts for. Each
//! event carries the running tally (`completed`, `fraction`) and the job's
//! [`JobOutcome`].
//!
//! ## Progress accounting
//! - `completed` starts at 1 for the first event and grows by exactly 1 per event;
//! - `fraction = completed / total`, so it grows by `1/total` per event and the
//!   last event of a full run carries exactly `1.0`;
//! - failed jobs are accounted for as well (they produce an event).
//!
//! ## Example
//! ```rust
//! use runvisor::{JobOutcome, JobResult, ProgressEvent, RunId};
//!
//! let ev = ProgressEvent::new(
//!     RunId::from_raw(7),
//!     5,
//!     20,
//!     JobOutcome::Completed(JobResult { index: 5, value: 120 }),
//! );
//! assert_eq!(ev.fraction, 0.25);
//! assert_eq!(ev.index(), 5);
//! assert_eq!(ev.value(), Some(120));
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

/// Global counter for run identifiers.
static RUN_SEQ: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier of a run (unique per process).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u64);

impl RunId {
    /// Allocates the next identifier.
    pub(crate) fn next() -> Self {
        RunId(RUN_SEQ.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// Wraps a raw value (mostly useful in tests and custom sinks).
    pub fn from_raw(raw: u64) -> Self {
        RunId(raw)
    }

    /// Raw numeric value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

/// Value computed for one index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct JobResult {
    /// Job index (`1..=total`).
    pub index: usize,
    /// Computed value.
    pub value: u128,
}

/// What happened to one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Job produced a value.
    Completed(JobResult),
    /// Job failed; see [`JobError`](crate::JobError).
    Failed {
        /// Job index.
        index: usize,
        /// Rendered error.
        error: Arc<str>,
    },
}

/// One unit of observable run output.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressEvent {
    /// Run that produced the event.
    pub run: RunId,
    /// Number of events delivered so far in this run, including this one.
    pub completed: usize,
    /// Number of jobs in the run.
    pub total: usize,
    /// `completed / total`, in `(0, 1]`.
    pub fraction: f64,
    /// Job result or failure.
    pub outcome: JobOutcome,
}

impl ProgressEvent {
    /// Builds an event and derives `fraction` from `completed` and `total`.
    pub fn new(run: RunId, completed: usize, total: usize, outcome: JobOutcome) -> Self {
        let fraction = if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        };
        Self {
            run,
            completed,
            total,
            fraction,
            outcome,
        }
    }

    /// Index of the job this event reports.
    pub fn index(&self) -> usize {
        match &self.outcome {
            JobOutcome::Completed(r) => r.index,
            JobOutcome::Failed { index, .. } => *index,
        }
    }

    /// Computed value, if the job succeeded.
    pub fn value(&self) -> Option<u128> {
        match &self.outcome {
            JobOutcome::Completed(r) => Some(r.value),
            JobOutcome::Failed { .. } => None,
        }
    }

    /// True for the event that completes the run.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.completed == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_reaches_one_exactly_at_last_event() {
        let total = 7;
        let run = RunId::from_raw(1);
        let mut prev = 0.0;
        for completed in 1..=total {
            let ev = ProgressEvent::new(
                run,
                completed,
                total,
                JobOutcome::Failed {
                    index: completed,
                    error: "x".into(),
                },
            );
            assert!(ev.fraction > prev);
            assert_eq!(ev.is_last(), ev.fraction == 1.0);
            prev = ev.fraction;
        }
        assert_eq!(prev, 1.0);
    }

    #[test]
    fn run_ids_are_unique() {
        let a = RunId::next();
        let b = RunId::next();
        assert_ne!(a, b);
        assert_eq!(format!("{}", RunId::from_raw(3)), "run-3");
    }
}
