//! Error types used by the runvisor runtime, jobs and sinks.
//!
//! This module defines three error enums:
//!
//! - [`JobError`]: a job failed to compute its value.
//! - [`SinkError`]: a progress event could not be delivered to the sink.
//! - [`ControllerError`]: a run could not be started.
//!
//! Cancellation is **not** an error: a cancelled run ends with
//! [`RunOutcome::Cancelled`](crate::RunOutcome::Cancelled).
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by job computation.
///
/// The reference factorial job only fails on overflow; pluggable jobs may
/// return [`JobError::Fail`] for anything else.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// Job returned a domain error.
    #[error("job failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Result does not fit into the value type.
    #[error("value for index {index} overflows u128")]
    Overflow {
        /// Index whose value overflowed.
        index: usize,
    },

    /// Job panicked (or its blocking worker was torn down).
    #[error("job panicked: {reason}")]
    Panicked {
        /// Panic payload or join error text.
        reason: String,
    },
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use runvisor::JobError;
    ///
    /// let err = JobError::Overflow { index: 40 };
    /// assert_eq!(err.as_label(), "job_overflow");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Fail { .. } => "job_failed",
            JobError::Overflow { .. } => "job_overflow",
            JobError::Panicked { .. } => "job_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Fail { error } => format!("error: {error}"),
            JobError::Overflow { index } => format!("overflow at index {index}"),
            JobError::Panicked { reason } => format!("panic: {reason}"),
        }
    }
}

/// # Errors produced while delivering progress to a sink.
///
/// Any of these is fatal to the run that hit it: the run is logged, its token
/// is cancelled and it ends as [`RunOutcome::Cancelled`](crate::RunOutcome::Cancelled).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The consumer side of the reporting channel is gone.
    #[error("reporting channel closed")]
    Closed,

    /// Sink refused the event.
    #[error("sink rejected event: {reason}")]
    Rejected {
        /// Reason given by the sink.
        reason: String,
    },

    /// Sink panicked while handling the event.
    #[error("sink panicked: {reason}")]
    Panicked {
        /// Panic payload.
        reason: String,
    },
}

impl SinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SinkError::Closed => "sink_closed",
            SinkError::Rejected { .. } => "sink_rejected",
            SinkError::Panicked { .. } => "sink_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SinkError::Closed => "reporting channel closed".to_string(),
            SinkError::Rejected { reason } => format!("rejected: {reason}"),
            SinkError::Panicked { reason } => format!("panic: {reason}"),
        }
    }
}

/// # Errors returned by [`RunController::start`](crate::RunController::start).
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    /// A run needs at least one job.
    #[error("run must contain at least one job")]
    EmptyRun,

    /// Controller was shut down; no further runs are accepted.
    #[error("controller is shut down")]
    ShutDown,
}

impl ControllerError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControllerError::EmptyRun => "controller_empty_run",
            ControllerError::ShutDown => "controller_shut_down",
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(JobError::Fail { error: "x".into() }.as_label(), "job_failed");
        assert_eq!(
            JobError::Panicked { reason: "x".into() }.as_label(),
            "job_panicked"
        );
        assert_eq!(SinkError::Closed.as_label(), "sink_closed");
        assert_eq!(ControllerError::EmptyRun.as_label(), "controller_empty_run");
    }

    #[test]
    fn panic_message_downcasts_common_payloads() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");

        let owned: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(owned.as_ref()), "bang");

        let other: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
