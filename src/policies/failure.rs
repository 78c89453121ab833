//! # Failure policies for runs.
//!
//! [`FailurePolicy`] decides what a run does after a job returns a
//! [`JobError`](crate::JobError). In both cases the failure itself is reported
//! to the sink as a [`JobOutcome::Failed`](crate::JobOutcome::Failed) event and
//! counts toward progress.
//!
//! ```text
//! FailurePolicy::Continue  → report failure, keep scheduling (default)
//! FailurePolicy::Abort     → report failure, stop scheduling, RunOutcome::Aborted
//! ```

/// Policy controlling whether a run keeps going after a failed job.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure and keep going (default).
    #[default]
    Continue,
    /// Report the failure and stop scheduling further jobs.
    Abort,
}

impl FailurePolicy {
    /// True if a failure ends the run.
    #[inline]
    pub fn aborts(&self) -> bool {
        matches!(self, FailurePolicy::Abort)
    }
}
