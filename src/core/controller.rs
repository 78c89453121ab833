//! # RunController: at most one active run.
//!
//! The controller owns the "currently active run" slot. Starting a run always
//! replaces the previous one:
//!
//! ```text
//! start(total, policy)
//!   ├─► lock slot
//!   ├─► previous run? → publish CancelRequested("superseded"), cancel its token
//!   ├─► new child token of the root token
//!   ├─► new Reporter chained to the previous run's closed-signal
//!   ├─► publish RunStarted, tokio::spawn(Scheduler::run_with(..))
//!   └─► store RunHandle in slot, return it (no waiting)
//!
//! cancel_active()  → take the slot, cancel its token (idempotent, no-op when idle)
//! shutdown()       → cancel the root token; every later start() is rejected
//! ```
//!
//! ## Invariants
//! - The previous run's cancellation is signalled before the new run is spawned,
//!   so it is always visible before the new run's first delivery.
//! - The new run's reporter waits for the previous reporter to close, so the
//!   sink never receives interleaved events from two runs.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::core::{Reporter, RunControllerBuilder, RunOutcome, Scheduler};
use crate::error::ControllerError;
use crate::events::{Bus, Event, EventKind, RunId};
use crate::jobs::JobRef;
use crate::policies::RunPolicy;
use crate::sink::SinkRef;

/// Handle to one run.
///
/// Cheap to clone. Dropping a handle does not cancel the run.
#[derive(Clone, Debug)]
pub struct RunHandle {
    id: RunId,
    policy: RunPolicy,
    total: usize,
    token: CancellationToken,
    outcome: watch::Receiver<Option<RunOutcome>>,
}

impl RunHandle {
    /// Run identifier (matches [`ProgressEvent::run`](crate::ProgressEvent::run)).
    pub fn id(&self) -> RunId {
        self.id
    }

    /// Policy the run was started with.
    pub fn policy(&self) -> RunPolicy {
        self.policy
    }

    /// Number of jobs in the run.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Signals cancellation without waiting.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once cancellation was signalled for this run.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the run has returned.
    pub fn is_finished(&self) -> bool {
        self.outcome.borrow().is_some()
    }

    /// Waits for the run to finish and returns its outcome.
    ///
    /// A run torn down without reporting (e.g. runtime shutdown) counts as `Cancelled`.
    pub async fn outcome(&self) -> RunOutcome {
        let mut rx = self.outcome.clone();
        match rx.wait_for(Option::is_some).await {
            Ok(outcome) => (*outcome).unwrap_or(RunOutcome::Cancelled),
            Err(_closed) => RunOutcome::Cancelled,
        }
    }
}

#[derive(Default)]
struct Slot {
    /// Run most recently started (may already be finished).
    active: Option<RunHandle>,
    /// Closed-signal of the most recently started run's reporter.
    reporting: Option<watch::Receiver<bool>>,
}

/// Starts and cancels runs, keeping at most one active.
pub struct RunController {
    scheduler: Arc<Scheduler>,
    sink: SinkRef,
    bus: Bus,
    root: CancellationToken,
    listener: CancellationToken,
    slot: Mutex<Slot>,
}

impl RunController {
    /// Returns a builder for a controller running `job` and reporting to `sink`.
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use std::sync::Arc;
    /// use runvisor::{ChannelSink, Factorial, RunController, RunOutcome, RunPolicy};
    ///
    /// let (sink, mut rx) = ChannelSink::new();
    /// let controller = RunController::builder(Arc::new(Factorial), Arc::new(sink)).build();
    ///
    /// let run = controller.start(20, RunPolicy::Parallel).unwrap();
    /// assert_eq!(run.outcome().await, RunOutcome::Completed);
    ///
    /// let mut count = 0;
    /// while rx.try_recv().is_ok() {
    ///     count += 1;
    /// }
    /// assert_eq!(count, 20);
    /// # }
    /// ```
    pub fn builder(job: JobRef, sink: SinkRef) -> RunControllerBuilder {
        RunControllerBuilder::new(job, sink)
    }

    pub(crate) fn new_internal(
        scheduler: Scheduler,
        sink: SinkRef,
        bus: Bus,
        listener: CancellationToken,
    ) -> Self {
        Self {
            scheduler: Arc::new(scheduler),
            sink,
            bus,
            root: CancellationToken::new(),
            listener,
            slot: Mutex::new(Slot::default()),
        }
    }

    /// Starts a run of `total` jobs, superseding the active run.
    ///
    /// Returns immediately; must be called inside a tokio runtime.
    ///
    /// # Errors
    /// - [`ControllerError::EmptyRun`] if `total == 0`;
    /// - [`ControllerError::ShutDown`] after [`shutdown`](Self::shutdown).
    pub fn start(&self, total: usize, policy: RunPolicy) -> Result<RunHandle, ControllerError> {
        if total == 0 {
            return Err(ControllerError::EmptyRun);
        }
        if self.root.is_cancelled() {
            return Err(ControllerError::ShutDown);
        }

        let mut slot = self.lock_slot();
        if let Some(prev) = slot.active.take() {
            self.signal_cancel(&prev, "superseded");
        }

        let id = RunId::next();
        let token = self.root.child_token();
        let reporter = Reporter::new(
            id,
            total,
            Arc::clone(&self.sink),
            self.bus.clone(),
            slot.reporting.take(),
        );
        slot.reporting = Some(reporter.closed_signal());

        let (outcome_tx, outcome_rx) = watch::channel(None);
        let handle = RunHandle {
            id,
            policy,
            total,
            token: token.clone(),
            outcome: outcome_rx,
        };

        self.bus.publish(
            Event::new(EventKind::RunStarted)
                .with_run(id.get())
                .with_policy(policy.as_label())
                .with_progress(0, total),
        );

        let scheduler = Arc::clone(&self.scheduler);
        tokio::spawn(async move {
            let outcome = scheduler.run_with(policy, reporter, &token).await;
            outcome_tx.send_replace(Some(outcome));
        });

        slot.active = Some(handle.clone());
        Ok(handle)
    }

    /// Signals cancellation of the active run, if any. Does not wait.
    pub fn cancel_active(&self) {
        let mut slot = self.lock_slot();
        if let Some(active) = slot.active.take() {
            self.signal_cancel(&active, "cancel_active");
        }
    }

    /// Handle of the active run, if one is still running.
    pub fn active(&self) -> Option<RunHandle> {
        self.lock_slot()
            .active
            .as_ref()
            .filter(|h| !h.is_finished())
            .cloned()
    }

    /// Cancels the active run and rejects any further start.
    pub fn shutdown(&self) {
        let mut slot = self.lock_slot();
        if let Some(active) = slot.active.take() {
            self.signal_cancel(&active, "shutdown");
        }
        self.root.cancel();
    }

    /// True after [`shutdown`](Self::shutdown).
    pub fn is_shut_down(&self) -> bool {
        self.root.is_cancelled()
    }

    fn signal_cancel(&self, handle: &RunHandle, reason: &'static str) {
        if !handle.is_cancelled() && !handle.is_finished() {
            self.bus.publish(
                Event::new(EventKind::CancelRequested)
                    .with_run(handle.id.get())
                    .with_reason(reason),
            );
        }
        handle.cancel();
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RunController {
    fn drop(&mut self) {
        self.root.cancel();
        self.listener.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ProgressEvent;
    use crate::jobs::Factorial;
    use crate::sink::ChannelSink;
    use crate::subscribers::Subscribe;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn controller() -> (RunController, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sink, rx) = ChannelSink::new();
        let ctrl = RunController::builder(Arc::new(Factorial), Arc::new(sink)).build();
        (ctrl, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev);
        }
        out
    }

    /// Asserts that once an event of `later` shows up, `earlier` never shows up again.
    fn assert_not_interleaved(events: &[ProgressEvent], earlier: RunId, later: RunId) {
        let first_later = events.iter().position(|e| e.run == later);
        if let Some(pos) = first_later {
            assert!(
                events[pos..].iter().all(|e| e.run != earlier),
                "events of {earlier} delivered after {later} started"
            );
        }
    }

    #[tokio::test]
    async fn start_returns_immediately_and_completes() {
        let (ctrl, mut rx) = controller();
        let run = ctrl
            .start(20, RunPolicy::sequential(Duration::from_millis(5)))
            .unwrap();
        assert!(!run.is_finished());
        assert_eq!(ctrl.active().map(|h| h.id()), Some(run.id()));

        assert_eq!(run.outcome().await, RunOutcome::Completed);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 20);
        assert!(events.iter().all(|e| e.run == run.id()));
        assert!(ctrl.active().is_none());
    }

    #[tokio::test]
    async fn empty_run_is_rejected() {
        let (ctrl, _rx) = controller();
        assert_eq!(
            ctrl.start(0, RunPolicy::Parallel).unwrap_err(),
            ControllerError::EmptyRun
        );
    }

    #[tokio::test]
    async fn new_start_supersedes_active_run() {
        let (ctrl, mut rx) = controller();
        let first = ctrl
            .start(5, RunPolicy::sequential(Duration::from_millis(50)))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().run, first.id());

        let second = ctrl.start(10, RunPolicy::Parallel).unwrap();
        assert!(first.is_cancelled());

        assert_eq!(first.outcome().await, RunOutcome::Cancelled);
        assert_eq!(second.outcome().await, RunOutcome::Completed);

        let rest = drain(&mut rx);
        assert_not_interleaved(&rest, first.id(), second.id());
        assert_eq!(rest.iter().filter(|e| e.run == second.id()).count(), 10);
        assert!(rest.iter().filter(|e| e.run == first.id()).count() <= 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rapid_starts_never_interleave() {
        let (ctrl, mut rx) = controller();
        let slow = RunPolicy::sequential(Duration::from_millis(100));
        let a = ctrl.start(20, slow).unwrap();
        let b = ctrl.start(20, slow).unwrap();
        let c = ctrl.start(20, RunPolicy::Parallel).unwrap();

        assert!(a.is_cancelled() && b.is_cancelled());
        assert_eq!(a.outcome().await, RunOutcome::Cancelled);
        assert_eq!(b.outcome().await, RunOutcome::Cancelled);
        assert_eq!(c.outcome().await, RunOutcome::Completed);

        let events = drain(&mut rx);
        assert_not_interleaved(&events, a.id(), b.id());
        assert_not_interleaved(&events, a.id(), c.id());
        assert_not_interleaved(&events, b.id(), c.id());

        let last: Vec<&ProgressEvent> = events.iter().filter(|e| e.run == c.id()).collect();
        assert_eq!(last.len(), 20);
        assert_eq!(last.last().unwrap().fraction, 1.0);
    }

    #[tokio::test]
    async fn cancel_before_first_job_yields_nothing() {
        let (ctrl, mut rx) = controller();
        let run = ctrl.start(20, RunPolicy::Parallel).unwrap();
        ctrl.cancel_active();

        assert_eq!(run.outcome().await, RunOutcome::Cancelled);
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn cancel_active_is_idempotent() {
        let (ctrl, mut rx) = controller();
        ctrl.cancel_active();

        let run = ctrl
            .start(10, RunPolicy::sequential(Duration::from_millis(200)))
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().index(), 1);

        ctrl.cancel_active();
        ctrl.cancel_active();
        assert_eq!(run.outcome().await, RunOutcome::Cancelled);
        assert!(drain(&mut rx).is_empty());
        assert!(ctrl.active().is_none());
    }

    #[tokio::test]
    async fn shutdown_rejects_new_runs() {
        let (ctrl, _rx) = controller();
        let run = ctrl
            .start(3, RunPolicy::sequential(Duration::from_secs(10)))
            .unwrap();

        ctrl.shutdown();
        assert!(ctrl.is_shut_down());
        assert!(run.is_cancelled());
        assert_eq!(run.outcome().await, RunOutcome::Cancelled);
        assert_eq!(
            ctrl.start(1, RunPolicy::Parallel).unwrap_err(),
            ControllerError::ShutDown
        );
    }

    struct Forward(mpsc::UnboundedSender<EventKind>);

    #[async_trait]
    impl Subscribe for Forward {
        async fn on_event(&self, ev: &Event) {
            let _ = self.0.send(ev.kind);
        }
    }

    #[tokio::test]
    async fn subscribers_observe_run_lifecycle() {
        let (sink, _rx) = ChannelSink::new();
        let (tx, mut kinds) = mpsc::unbounded_channel();
        let ctrl = RunController::builder(Arc::new(Factorial), Arc::new(sink))
            .with_subscribers(vec![Arc::new(Forward(tx))])
            .build();

        let run = ctrl.start(3, RunPolicy::Parallel).unwrap();
        assert_eq!(run.outcome().await, RunOutcome::Completed);

        let seen = tokio::time::timeout(Duration::from_secs(2), async {
            let mut seen = Vec::new();
            while let Some(kind) = kinds.recv().await {
                seen.push(kind);
                if kind == EventKind::RunCompleted {
                    break;
                }
            }
            seen
        })
        .await
        .unwrap();

        assert_eq!(seen.first(), Some(&EventKind::RunStarted));
        assert_eq!(
            seen.iter().filter(|k| **k == EventKind::JobCompleted).count(),
            3
        );
    }

    struct AlwaysPanics(Arc<AtomicUsize>);

    #[async_trait]
    impl Subscribe for AlwaysPanics {
        async fn on_event(&self, _ev: &Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
            panic!("subscriber always fails");
        }
    }

    #[tokio::test]
    async fn panicking_subscriber_is_called_a_bounded_number_of_times() {
        let (sink, _rx) = ChannelSink::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let ctrl = RunController::builder(Arc::new(Factorial), Arc::new(sink))
            .with_subscribers(vec![Arc::new(AlwaysPanics(Arc::clone(&calls)))])
            .build();

        let run = ctrl.start(3, RunPolicy::Parallel).unwrap();
        assert_eq!(run.outcome().await, RunOutcome::Completed);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let settled = calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(calls.load(Ordering::SeqCst), settled, "subscriber calls kept growing");
        // RunStarted + 3 JobCompleted + RunCompleted, each followed by one panic report.
        assert!(settled <= 10, "subscriber invoked {settled} times for a 3-job run");
    }
}
