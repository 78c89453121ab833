//! # Lifecycle events emitted by the controller and scheduler.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: run lifecycle (started, cancel requested, terminal outcome)
//! - **Job events**: per-job flow (starting, completed, failed, step delay)
//! - **Delivery events**: sink and subscriber problems
//!
//! The [`Event`] struct carries metadata such as timestamps, run id, job index
//! and reasons. Progress itself is delivered separately, see
//! [`ProgressEvent`](crate::ProgressEvent).
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use runvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::JobFailed)
//!     .with_run(3)
//!     .with_index(7)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::JobFailed);
//! assert_eq!(ev.index, Some(7));
//! assert_eq!(ev.reason.as_deref(), Some("boom"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run events ===
    /// Controller spawned a new run.
    ///
    /// Sets: `run`, `total`, `policy`.
    RunStarted,

    /// Cancellation was signalled for a run (superseded or explicit cancel).
    ///
    /// Sets: `run`, `reason` (`"superseded"`, `"cancel_active"`, `"shutdown"`).
    CancelRequested,

    /// Run delivered every event without observing cancellation.
    ///
    /// Sets: `run`, `completed`, `total`.
    RunCompleted,

    /// Run stopped early because of cancellation or a sink failure.
    ///
    /// Sets: `run`, `completed`, `total`.
    RunCancelled,

    /// Run stopped after a failed job under `FailurePolicy::Abort`.
    ///
    /// Sets: `run`, `index`, `completed`, `total`.
    RunAborted,

    // === Job events ===
    /// Job is about to be computed (sequential runs only).
    ///
    /// Sets: `run`, `index`.
    JobStarting,

    /// Job result was delivered to the sink.
    ///
    /// Sets: `run`, `index`, `completed`, `total`.
    JobCompleted,

    /// Job failure was delivered to the sink.
    ///
    /// Sets: `run`, `index`, `completed`, `total`, `reason`.
    JobFailed,

    /// Sequential run is pausing before its next job.
    ///
    /// Sets: `run`, `index` (the job just reported), `delay_ms`.
    StepDelayScheduled,

    // === Delivery events ===
    /// Sink failed to accept a progress event; the run is cancelled.
    ///
    /// Sets: `run`, `index`, `reason`.
    SinkFailed,

    /// Subscriber panicked during event processing.
    ///
    /// Sets: `reason` (subscriber name and panic message).
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets: `reason` (subscriber name and cause).
    SubscriberOverflow,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Run identifier (raw value of [`RunId`](crate::RunId)).
    pub run: Option<u64>,
    /// Job index.
    pub index: Option<usize>,
    /// Events delivered so far in the run.
    pub completed: Option<usize>,
    /// Jobs in the run.
    pub total: Option<usize>,
    /// Run policy label (`"parallel"` / `"sequential"`).
    pub policy: Option<&'static str>,
    /// Step delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, cancel source, overflow details).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            run: None,
            index: None,
            completed: None,
            total: None,
            policy: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a run id.
    #[inline]
    pub fn with_run(mut self, run: u64) -> Self {
        self.run = Some(run);
        self
    }

    /// Attaches a job index.
    #[inline]
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attaches the progress tally.
    #[inline]
    pub fn with_progress(mut self, completed: usize, total: usize) -> Self {
        self.completed = Some(completed);
        self.total = Some(total);
        self
    }

    /// Attaches the policy label.
    #[inline]
    pub fn with_policy(mut self, policy: &'static str) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Attaches a step delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} panic={info}"))
    }

    /// True for a subscriber overflow report.
    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }

    /// True for a subscriber panic report.
    #[inline]
    pub fn is_subscriber_panic(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberPanicked)
    }

    /// True for events the subscriber fan-out reports about itself.
    ///
    /// Problems while handling these are logged but never published again.
    #[inline]
    pub fn is_subscriber_event(&self) -> bool {
        self.is_subscriber_overflow() || self.is_subscriber_panic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::new(EventKind::RunStarted);
        let b = Event::new(EventKind::RunStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn subscriber_reports_are_classified() {
        assert!(Event::subscriber_panicked("s", "boom".into()).is_subscriber_event());
        assert!(Event::subscriber_overflow("s", "full").is_subscriber_event());
        assert!(!Event::new(EventKind::JobFailed).is_subscriber_event());
    }

    #[test]
    fn delay_is_clamped_to_u32_millis() {
        let ev = Event::new(EventKind::StepDelayScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));

        let ev = Event::new(EventKind::StepDelayScheduled).with_delay(Duration::from_millis(500));
        assert_eq!(ev.delay_ms, Some(500));
    }
}
