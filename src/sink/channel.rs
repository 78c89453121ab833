//! # Channel-backed sink.
//!
//! [`ChannelSink`] hands every event to an unbounded tokio channel, so the
//! consumer can live on any task (a UI loop, a test, a logger). Dropping the
//! receiver makes further deliveries fail with [`SinkError::Closed`].
//!
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use runvisor::{ChannelSink, JobOutcome, JobResult, ProgressEvent, ReportSink, RunId};
//!
//! let (sink, mut rx) = ChannelSink::new();
//! let ev = ProgressEvent::new(
//!     RunId::from_raw(1), 1, 1,
//!     JobOutcome::Completed(JobResult { index: 1, value: 1 }),
//! );
//! sink.on_progress(&ev).await.unwrap();
//! assert_eq!(rx.recv().await, Some(ev));
//! # }
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::events::ProgressEvent;
use crate::sink::ReportSink;

/// Sink forwarding events into an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    /// Creates a sink together with the receiving end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl ReportSink for ChannelSink {
    async fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError> {
        self.tx.send(event.clone()).map_err(|_| SinkError::Closed)
    }

    fn name(&self) -> &'static str {
        "channel-sink"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{JobOutcome, JobResult, RunId};

    #[tokio::test]
    async fn closed_receiver_is_reported() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);

        let ev = ProgressEvent::new(
            RunId::from_raw(1),
            1,
            2,
            JobOutcome::Completed(JobResult { index: 2, value: 2 }),
        );
        assert_eq!(sink.on_progress(&ev).await, Err(SinkError::Closed));
    }
}
