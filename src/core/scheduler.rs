//! # Scheduler: runs the jobs of one run under a policy.
//!
//! Executes indices `1..=total` of a [`Job`](crate::Job) and reports each
//! result through the run's [`Reporter`].
//!
//! ## Parallel
//! ```text
//! spawn 1..=total ──► JoinSet ──► join_next() (completion order) ──► deliver
//!        │                 (each job: [permit] → spawn_blocking(compute))
//!        └─ cancel observed ──► drain already-finished ──► abort rest ──► Cancelled
//! ```
//!
//! ## Sequential
//! ```text
//! for index in 1..=total {
//!   ├─► cancelled? → Cancelled
//!   ├─► publish JobStarting
//!   ├─► spawn_blocking(compute(index)) → deliver
//!   └─► if not last: publish StepDelayScheduled, sleep(delay) (cancellable)
//! }
//! ```
//!
//! ## Rules
//! - Cancellation is checked before any job starts, before each sequential
//!   step, while waiting (join / step delay) and at the final join.
//! - Results already produced when cancellation is observed are still
//!   reported (drain); no job is started afterwards.
//! - The sink is only called from the reporter, one event at a time.
//! - A failed sink delivery cancels the run token and ends the run as `Cancelled`.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{self, JoinError, JoinSet};
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::Config;
use crate::core::{Reporter, RunOutcome};
use crate::error::{JobError, panic_message};
use crate::events::{Bus, Event, EventKind, RunId};
use crate::jobs::JobRef;
use crate::policies::RunPolicy;
use crate::sink::SinkRef;

type Computed = (usize, Result<u128, JobError>);

/// Executes runs of one job under a [`RunPolicy`].
///
/// A scheduler is stateless between runs; the controller shares one instance
/// across all runs it starts.
#[derive(Clone)]
pub struct Scheduler {
    job: JobRef,
    cfg: Config,
    bus: Bus,
}

impl Scheduler {
    /// Creates a scheduler publishing lifecycle events to `bus`.
    pub fn new(job: JobRef, cfg: Config, bus: Bus) -> Self {
        Self { job, cfg, bus }
    }

    /// Runs jobs `1..=total` under `policy`, reporting to `sink`, until done or cancelled.
    ///
    /// ### Returns
    /// - `Completed` if all `total` events were delivered and `cancel` was never observed;
    /// - `Aborted { index }` if job `index` failed under `FailurePolicy::Abort`;
    /// - `Cancelled` otherwise (including a failed sink delivery, which also cancels `cancel`).
    ///
    /// # Example
    /// ```
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// use std::sync::Arc;
    /// use tokio_util::sync::CancellationToken;
    /// use runvisor::{Bus, ChannelSink, Config, Factorial, RunOutcome, RunPolicy, Scheduler};
    ///
    /// let scheduler = Scheduler::new(Arc::new(Factorial), Config::default(), Bus::new(16));
    /// let (sink, mut rx) = ChannelSink::new();
    ///
    /// let outcome = scheduler
    ///     .run(5, RunPolicy::Parallel, Arc::new(sink), &CancellationToken::new())
    ///     .await;
    /// assert_eq!(outcome, RunOutcome::Completed);
    ///
    /// let mut values = Vec::new();
    /// while let Ok(ev) = rx.try_recv() {
    ///     values.push(ev.value().unwrap());
    /// }
    /// values.sort();
    /// assert_eq!(values, vec![1, 2, 6, 24, 120]);
    /// # }
    /// ```
    pub async fn run(
        &self,
        total: usize,
        policy: RunPolicy,
        sink: SinkRef,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let reporter = Reporter::new(RunId::next(), total, sink, self.bus.clone(), None);
        self.run_with(policy, reporter, cancel).await
    }

    /// Runs with a prepared reporter (used by the controller to chain runs).
    pub(crate) async fn run_with(
        &self,
        policy: RunPolicy,
        mut reporter: Reporter,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let outcome = if cancel.is_cancelled() {
            RunOutcome::Cancelled
        } else {
            match policy {
                RunPolicy::Parallel => self.run_parallel(&mut reporter, cancel).await,
                RunPolicy::Sequential { delay } => {
                    self.run_sequential(&mut reporter, delay, cancel).await
                }
            }
        };
        reporter.finish(outcome);
        outcome
    }

    async fn run_parallel(
        &self,
        reporter: &mut Reporter,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let mut set = JoinSet::new();
        self.spawn_jobs(&mut set, reporter.total(), cancel);

        loop {
            let joined = select! {
                biased;
                _ = cancel.cancelled() => break,
                joined = set.join_next() => joined,
            };
            let Some(joined) = joined else {
                return final_outcome(reporter, cancel);
            };
            let Some((index, res)) = flatten(joined) else {
                continue;
            };
            if let Some(outcome) = self.report(reporter, cancel, index, res).await {
                stop(&mut set).await;
                return outcome;
            }
        }

        // Cancelled: report what already finished, drop the rest.
        while let Some(joined) = set.try_join_next() {
            let Some((index, res)) = flatten(joined) else {
                continue;
            };
            if self.report(reporter, cancel, index, res).await.is_some() {
                break;
            }
        }
        stop(&mut set).await;
        RunOutcome::Cancelled
    }

    /// Spawns one task per index; each waits for a permit (if limited) and
    /// computes on the blocking pool unless cancellation was observed first.
    fn spawn_jobs(
        &self,
        set: &mut JoinSet<Option<Computed>>,
        total: usize,
        cancel: &CancellationToken,
    ) {
        let limiter = self
            .cfg
            .concurrency_limit()
            .map(|n| Arc::new(Semaphore::new(n)));

        for index in 1..=total {
            let job = Arc::clone(&self.job);
            let token = cancel.clone();
            let limiter = limiter.clone();

            set.spawn(async move {
                let _permit = match limiter {
                    Some(sem) => select! {
                        res = sem.acquire_owned() => match res {
                            Ok(permit) => Some(permit),
                            Err(_closed) => return None,
                        },
                        _ = token.cancelled() => return None,
                    },
                    None => None,
                };
                if token.is_cancelled() {
                    return None;
                }
                Some((index, compute(job, index).await))
            });
        }
    }

    async fn run_sequential(
        &self,
        reporter: &mut Reporter,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let total = reporter.total();
        let run = reporter.run().get();

        for index in 1..=total {
            if cancel.is_cancelled() {
                return RunOutcome::Cancelled;
            }

            self.bus.publish(
                Event::new(EventKind::JobStarting)
                    .with_run(run)
                    .with_index(index),
            );
            let res = compute(Arc::clone(&self.job), index).await;
            if let Some(outcome) = self.report(reporter, cancel, index, res).await {
                return outcome;
            }

            if index == total {
                break;
            }
            self.bus.publish(
                Event::new(EventKind::StepDelayScheduled)
                    .with_run(run)
                    .with_index(index)
                    .with_delay(delay),
            );
            let sleep = time::sleep(delay);
            tokio::pin!(sleep);
            select! {
                biased;
                _ = cancel.cancelled() => return RunOutcome::Cancelled,
                _ = &mut sleep => {}
            }
        }

        final_outcome(reporter, cancel)
    }

    /// Delivers one result; returns the outcome that ends the run, if any.
    async fn report(
        &self,
        reporter: &mut Reporter,
        cancel: &CancellationToken,
        index: usize,
        res: Result<u128, JobError>,
    ) -> Option<RunOutcome> {
        let failed = res.is_err();
        if reporter.deliver(index, res).await.is_err() {
            cancel.cancel();
            return Some(RunOutcome::Cancelled);
        }
        if failed && self.cfg.failure.aborts() {
            return Some(RunOutcome::Aborted { index });
        }
        None
    }
}

/// Computes one index on the blocking pool; panics become `JobError::Panicked`.
async fn compute(job: JobRef, index: usize) -> Result<u128, JobError> {
    match task::spawn_blocking(move || job.compute(index)).await {
        Ok(res) => res,
        Err(err) if err.is_panic() => Err(JobError::Panicked {
            reason: panic_message(&*err.into_panic()),
        }),
        Err(err) => Err(JobError::Panicked {
            reason: err.to_string(),
        }),
    }
}

fn flatten(joined: Result<Option<Computed>, JoinError>) -> Option<Computed> {
    match joined {
        Ok(computed) => computed,
        Err(err) => {
            if !err.is_cancelled() {
                warn!(error = %err, "parallel job task failed");
            }
            None
        }
    }
}

fn final_outcome(reporter: &Reporter, cancel: &CancellationToken) -> RunOutcome {
    if !cancel.is_cancelled() && reporter.completed() == reporter.total() {
        RunOutcome::Completed
    } else {
        RunOutcome::Cancelled
    }
}

/// Aborts outstanding job tasks and waits until they are gone.
///
/// Computations already running on the blocking pool finish in the background;
/// their results are discarded.
async fn stop(set: &mut JoinSet<Option<Computed>>) {
    set.abort_all();
    while set.join_next().await.is_some() {}
}
