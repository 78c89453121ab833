//! # Progress sinks.
//!
//! - [`ReportSink`] - consumer of [`ProgressEvent`](crate::ProgressEvent)s (the presentation side)
//! - [`ChannelSink`] - forwards events into an unbounded tokio channel
//!
//! A run invokes its sink from a single reporting context: calls never
//! overlap, neither within one run nor across runs of the same controller.

mod channel;
mod report;

pub use channel::ChannelSink;
pub use report::{ReportSink, SinkRef};
