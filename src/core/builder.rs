//! # Builder for [`RunController`].
//!
//! Wires a job, a sink, the runtime [`Config`] and optional lifecycle
//! subscribers into a controller.
//!
//! ```text
//! RunControllerBuilder::new(job, sink)
//!   ├─ with_config(cfg)
//!   ├─ with_subscribers(vec![..])
//!   └─ build()
//!        ├─► Bus::new(cfg.bus_capacity)
//!        ├─► SubscriberSet + listener task (bus → subscribers), if any
//!        └─► Scheduler + RunController
//! ```

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::{
    config::Config,
    core::{RunController, Scheduler},
    events::Bus,
    jobs::JobRef,
    sink::SinkRef,
    subscribers::{Subscribe, SubscriberSet},
};

/// Builder for constructing a [`RunController`].
pub struct RunControllerBuilder {
    job: JobRef,
    sink: SinkRef,
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl RunControllerBuilder {
    /// Creates a new builder with default configuration and no subscribers.
    pub fn new(job: JobRef, sink: SinkRef) -> Self {
        Self {
            job,
            sink,
            cfg: Config::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the runtime configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets lifecycle event subscribers (e.g. [`LogWriter`](crate::LogWriter)).
    ///
    /// Subscribers receive events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the controller.
    ///
    /// With subscribers configured this spawns their workers and the bus
    /// listener, so it must be called inside a tokio runtime.
    pub fn build(self) -> RunController {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let listener = CancellationToken::new();
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            subscriber_listener(&bus, subs, listener.clone());
        }

        let scheduler = Scheduler::new(self.job, self.cfg, bus.clone());
        RunController::new_internal(scheduler, self.sink, bus, listener)
    }
}

/// Forwards bus events to the subscriber set until the controller is dropped.
fn subscriber_listener(bus: &Bus, subs: SubscriberSet, stop: CancellationToken) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let received = tokio::select! {
                _ = stop.cancelled() => break,
                received = rx.recv() => received,
            };
            match received {
                Ok(ev) => subs.emit(&ev),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "lifecycle listener lagged behind the bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
