//! Run events: progress payloads, lifecycle events and the broadcast bus.
//!
//! This module groups two separate streams:
//!
//! - **Progress** ([`ProgressEvent`], [`JobOutcome`], [`JobResult`]): the
//!   user-facing output of a run, delivered to exactly one
//!   [`ReportSink`](crate::ReportSink) through the run's reporter. Never lossy.
//! - **Lifecycle** ([`Event`], [`EventKind`]): observability records published
//!   on the [`Bus`] and fanned out to [`Subscribe`](crate::Subscribe)rs.
//!   Fire-and-forget; slow subscribers may skip events.
//!
//! ## Quick reference
//! - **Publishers**: `RunController` (start/cancel), `Scheduler` loops,
//!   `Reporter` (per delivery), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the controller's listener task, which forwards the bus to
//!   its `SubscriberSet`.

mod bus;
mod event;
mod progress;

pub use bus::Bus;
pub use event::{Event, EventKind};
pub use progress::{JobOutcome, JobResult, ProgressEvent, RunId};
