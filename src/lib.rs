//! # runvisor
//!
//! **runvisor** runs a fixed batch of independent, indexed jobs under a
//! selectable execution policy, reports per-job progress to a sink, and
//! cancels the in-flight run whenever a new one is requested.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   presentation shell (UI, CLI, test)
//!        │ start(total, RunPolicy)         ▲ ProgressEvent (one at a time)
//!        │ cancel_active()                 │
//!        ▼                                 │
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  RunController                                                   │
//! │  - active-run slot (at most one RunHandle)                       │
//! │  - root CancellationToken → child token per run                  │
//! │  - Reporter chain (run N+1 delivers only after run N closed)     │
//! └──────┬───────────────────────────────────────────────────────────┘
//!        ▼ tokio::spawn
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Scheduler                                                       │
//! │  - Parallel:   JoinSet of spawn_blocking(job.compute(i))         │
//! │  - Sequential: compute(i) → deliver → sleep(delay), cancellable  │
//! └──────┬──────────────────────────────────────┬────────────────────┘
//!        ▼                                      ▼
//!   Reporter ──► ReportSink::on_progress    Bus ──► SubscriberSet ──► LogWriter, ...
//! ```
//!
//! ### Run lifecycle
//! ```text
//! start() ──► RunStarted
//!   ├─ Parallel:   all jobs submitted; results delivered in completion order
//!   ├─ Sequential: jobs 1..=N in order, delay after each delivered result
//!   │
//!   ├─ cancellation observed (new start / cancel_active / shutdown / sink failure)
//!   │     └─► already-produced results delivered, nothing new started ─► Cancelled
//!   ├─ job failure: reported as JobOutcome::Failed
//!   │     └─► FailurePolicy::Abort ─► Aborted { index }
//!   └─ all N delivered ─► Completed
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Jobs**          | Pure per-index computations.                             | [`Job`], [`JobFn`], [`Factorial`]       |
//! | **Policies**      | Parallel or sequential runs, failure handling.           | [`RunPolicy`], [`FailurePolicy`]        |
//! | **Control**       | Start, supersede and cancel runs.                        | [`RunController`], [`RunHandle`]        |
//! | **Progress**      | Ordered, serialized delivery to the presentation side.   | [`ReportSink`], [`ProgressEvent`]       |
//! | **Observability** | Lifecycle events, structured logging via `tracing`.      | [`Subscribe`], [`Event`], [`LogWriter`] |
//! | **Errors**        | Typed errors for jobs, sinks and the controller.         | [`JobError`], [`SinkError`]             |
//! | **Configuration** | Centralized runtime settings.                            | [`Config`]                              |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use runvisor::{ChannelSink, Factorial, LogWriter, RunController, RunOutcome, RunPolicy};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let (sink, mut progress) = ChannelSink::new();
//!     let controller = RunController::builder(Arc::new(Factorial), Arc::new(sink))
//!         .with_subscribers(vec![Arc::new(LogWriter)])
//!         .build();
//!
//!     // A slow sequential run, superseded by a parallel one.
//!     let first = controller
//!         .start(20, RunPolicy::sequential(Duration::from_millis(500)))
//!         .unwrap();
//!     let second = controller.start(20, RunPolicy::Parallel).unwrap();
//!
//!     assert_eq!(first.outcome().await, RunOutcome::Cancelled);
//!     assert_eq!(second.outcome().await, RunOutcome::Completed);
//!
//!     while let Ok(ev) = progress.try_recv() {
//!         if ev.index() == 20 {
//!             assert_eq!(ev.value(), Some(2_432_902_008_176_640_000));
//!         }
//!     }
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod jobs;
mod policies;
mod sink;
mod subscribers;

// ---- Public re-exports ----

pub use config::Config;
pub use core::{RunController, RunControllerBuilder, RunHandle, RunOutcome, Scheduler};
pub use error::{ControllerError, JobError, SinkError};
pub use events::{Bus, Event, EventKind, JobOutcome, JobResult, ProgressEvent, RunId};
pub use jobs::{Factorial, Job, JobFn, JobRef};
pub use policies::{DEFAULT_STEP_DELAY, FailurePolicy, RunPolicy};
pub use sink::{ChannelSink, ReportSink, SinkRef};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
