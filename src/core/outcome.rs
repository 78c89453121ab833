/// Terminal state of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every job was reported and no cancellation was observed.
    Completed,
    /// Cancellation was observed (explicit cancel, superseding start, shutdown
    /// or a failed sink delivery). Events already delivered stay valid.
    Cancelled,
    /// A job failed under [`FailurePolicy::Abort`](crate::FailurePolicy::Abort).
    Aborted {
        /// Index of the failed job.
        index: usize,
    },
}

impl RunOutcome {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunOutcome::Completed => "completed",
            RunOutcome::Cancelled => "cancelled",
            RunOutcome::Aborted { .. } => "aborted",
        }
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}
