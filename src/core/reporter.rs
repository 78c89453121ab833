//! # Reporter: the single delivery context of a run.
//!
//! Every [`ProgressEvent`] of a run goes through its [`Reporter`]. It owns the
//! progress counter (single writer), calls the sink one event at a time and
//! publishes the matching lifecycle events.
//!
//! ## Hand-off between runs
//! ```text
//! run A reporter ── closed: watch<bool> ──┐
//!                                         ▼
//! run B reporter: first deliver() waits until A is closed
//! ```
//! A reporter is closed when its run returns (or the reporter is dropped).
//! Because a superseded run closes right after draining already-produced
//! results, the next run starts delivering within bounded time and the sink
//! never sees events of two runs interleaved.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::sync::watch;
use tracing::error;

use crate::core::RunOutcome;
use crate::error::{JobError, SinkError, panic_message};
use crate::events::{Bus, Event, EventKind, JobOutcome, JobResult, ProgressEvent, RunId};
use crate::sink::SinkRef;

/// Per-run delivery state.
pub(crate) struct Reporter {
    run: RunId,
    total: usize,
    completed: usize,
    sink: SinkRef,
    bus: Bus,
    predecessor: Option<watch::Receiver<bool>>,
    closed: watch::Sender<bool>,
}

impl Reporter {
    /// Creates a reporter; `predecessor` is the closed-signal of the run it supersedes.
    pub(crate) fn new(
        run: RunId,
        total: usize,
        sink: SinkRef,
        bus: Bus,
        predecessor: Option<watch::Receiver<bool>>,
    ) -> Self {
        let (closed, _) = watch::channel(false);
        Self {
            run,
            total,
            completed: 0,
            sink,
            bus,
            predecessor,
            closed,
        }
    }

    /// Signal that flips to `true` once this reporter stops delivering.
    pub(crate) fn closed_signal(&self) -> watch::Receiver<bool> {
        self.closed.subscribe()
    }

    #[inline]
    pub(crate) fn run(&self) -> RunId {
        self.run
    }

    #[inline]
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    #[inline]
    pub(crate) fn completed(&self) -> usize {
        self.completed
    }

    /// Delivers the outcome of job `index` to the sink.
    ///
    /// On `Err` nothing was counted; the caller must end the run.
    pub(crate) async fn deliver(
        &mut self,
        index: usize,
        res: Result<u128, JobError>,
    ) -> Result<(), SinkError> {
        self.wait_turn().await;

        let completed = self.completed + 1;
        let outcome = match &res {
            Ok(value) => JobOutcome::Completed(JobResult {
                index,
                value: *value,
            }),
            Err(e) => JobOutcome::Failed {
                index,
                error: e.to_string().into(),
            },
        };
        let event = ProgressEvent::new(self.run, completed, self.total, outcome);

        let delivered = AssertUnwindSafe(self.sink.on_progress(&event))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| {
                Err(SinkError::Panicked {
                    reason: panic_message(&*panic),
                })
            });

        if let Err(err) = delivered {
            error!(
                run = %self.run,
                index,
                sink = self.sink.name(),
                error = %err,
                "progress delivery failed; cancelling run"
            );
            self.bus.publish(
                Event::new(EventKind::SinkFailed)
                    .with_run(self.run.get())
                    .with_index(index)
                    .with_reason(err.to_string()),
            );
            return Err(err);
        }

        self.completed = completed;
        let ev = match res {
            Ok(_) => Event::new(EventKind::JobCompleted),
            Err(e) => Event::new(EventKind::JobFailed).with_reason(e.to_string()),
        };
        self.bus.publish(
            ev.with_run(self.run.get())
                .with_index(index)
                .with_progress(self.completed, self.total),
        );
        Ok(())
    }

    /// Publishes the terminal lifecycle event and closes the reporter.
    pub(crate) fn finish(&mut self, outcome: RunOutcome) {
        let ev = match outcome {
            RunOutcome::Completed => Event::new(EventKind::RunCompleted),
            RunOutcome::Cancelled => Event::new(EventKind::RunCancelled),
            RunOutcome::Aborted { index } => Event::new(EventKind::RunAborted).with_index(index),
        };
        self.bus.publish(
            ev.with_run(self.run.get())
                .with_progress(self.completed, self.total),
        );
        self.close();
    }

    fn close(&mut self) {
        self.predecessor = None;
        self.closed.send_replace(true);
    }

    /// Waits (once) until the superseded run has stopped delivering.
    async fn wait_turn(&mut self) {
        if let Some(mut prev) = self.predecessor.take() {
            // A dropped sender means the previous run is gone as well.
            let _ = prev.wait_for(|closed| *closed).await;
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.closed.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{ChannelSink, ReportSink};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct Exploding;

    #[async_trait]
    impl ReportSink for Exploding {
        async fn on_progress(&self, _event: &ProgressEvent) -> Result<(), SinkError> {
            panic!("sink exploded");
        }
    }

    #[tokio::test]
    async fn counts_only_delivered_events() {
        let (sink, mut rx) = ChannelSink::new();
        let mut reporter = Reporter::new(RunId::from_raw(1), 2, Arc::new(sink), Bus::new(8), None);

        reporter.deliver(2, Ok(2)).await.unwrap();
        reporter
            .deliver(1, Err(JobError::Fail { error: "nope".into() }))
            .await
            .unwrap();
        assert_eq!(reporter.completed(), 2);

        let first = rx.recv().await.unwrap();
        assert_eq!((first.index(), first.completed, first.fraction), (2, 1, 0.5));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.fraction, 1.0);
        assert!(matches!(second.outcome, JobOutcome::Failed { index: 1, .. }));
    }

    #[tokio::test]
    async fn sink_panic_becomes_error() {
        let bus = Bus::new(8);
        let mut bus_rx = bus.subscribe();
        let mut reporter = Reporter::new(RunId::from_raw(2), 1, Arc::new(Exploding), bus, None);

        let err = reporter.deliver(1, Ok(1)).await.unwrap_err();
        assert!(matches!(err, SinkError::Panicked { ref reason } if reason == "sink exploded"));
        assert_eq!(reporter.completed(), 0);
        assert_eq!(bus_rx.recv().await.unwrap().kind, EventKind::SinkFailed);
    }

    #[tokio::test]
    async fn waits_for_predecessor_to_close() {
        let (sink, mut rx) = ChannelSink::new();
        let sink: SinkRef = Arc::new(sink);
        let bus = Bus::new(8);

        let mut first = Reporter::new(RunId::from_raw(10), 1, Arc::clone(&sink), bus.clone(), None);
        let mut second = Reporter::new(
            RunId::from_raw(11),
            1,
            sink,
            bus,
            Some(first.closed_signal()),
        );

        let pending = tokio::spawn(async move {
            second.deliver(1, Ok(1)).await.unwrap();
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(rx.try_recv().is_err(), "second run delivered before first closed");

        first.deliver(1, Ok(1)).await.unwrap();
        first.finish(RunOutcome::Cancelled);
        pending.await.unwrap();

        assert_eq!(rx.recv().await.unwrap().run, RunId::from_raw(10));
        assert_eq!(rx.recv().await.unwrap().run, RunId::from_raw(11));
    }
}
