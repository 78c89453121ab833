//! # Logging subscriber.
//!
//! [`LogWriter`] renders lifecycle events as structured [`tracing`] records.
//! Install any `tracing` subscriber (e.g. `tracing_subscriber::fmt`) to see them.
//!
//! ## Output (fmt subscriber)
//! ```text
//! INFO run=4 policy="parallel" total=20 run started
//! DEBUG run=4 index=7 completed=3 total=20 job completed
//! WARN run=4 index=9 reason="job failed: nope" job failed
//! INFO run=4 reason="superseded" cancel requested
//! INFO run=4 completed=11 total=20 run cancelled
//! ```

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Structured logging subscriber backed by `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::RunStarted => {
                info!(run = e.run, policy = e.policy, total = e.total, "run started");
            }
            EventKind::CancelRequested => {
                info!(run = e.run, reason, "cancel requested");
            }
            EventKind::RunCompleted => {
                info!(run = e.run, completed = e.completed, total = e.total, "run completed");
            }
            EventKind::RunCancelled => {
                info!(run = e.run, completed = e.completed, total = e.total, "run cancelled");
            }
            EventKind::RunAborted => {
                warn!(run = e.run, index = e.index, completed = e.completed, "run aborted");
            }
            EventKind::JobStarting => {
                debug!(run = e.run, index = e.index, "job starting");
            }
            EventKind::JobCompleted => {
                debug!(
                    run = e.run,
                    index = e.index,
                    completed = e.completed,
                    total = e.total,
                    "job completed"
                );
            }
            EventKind::JobFailed => {
                warn!(run = e.run, index = e.index, reason, "job failed");
            }
            EventKind::StepDelayScheduled => {
                debug!(run = e.run, after = e.index, delay_ms = e.delay_ms, "step delay");
            }
            EventKind::SinkFailed => {
                warn!(run = e.run, index = e.index, reason, "sink failed");
            }
            EventKind::SubscriberPanicked | EventKind::SubscriberOverflow => {
                warn!(kind = ?e.kind, reason, "subscriber problem");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log-writer"
    }
}
