//! # Report sink trait.
//!
//! The sink is the presentation side of a run: it receives one
//! [`ProgressEvent`] per accounted job. It does not need to be re-entrant; the
//! reporter guarantees that `on_progress` is never called concurrently.
//!
//! Returning `Err` means the reporting channel is unavailable. That is fatal to
//! the current run: the failure is logged, the run is cancelled and ends as
//! [`RunOutcome::Cancelled`](crate::RunOutcome::Cancelled). A panic inside
//! `on_progress` is treated the same way.
//!
//! # Example
//! ```
//! use runvisor::{ProgressEvent, ReportSink, SinkError};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl ReportSink for Printer {
//!     async fn on_progress(&self, ev: &ProgressEvent) -> Result<(), SinkError> {
//!         println!("{:>5.1}% #{} = {:?}", ev.fraction * 100.0, ev.index(), ev.value());
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::events::ProgressEvent;

/// Shared handle to a sink.
pub type SinkRef = Arc<dyn ReportSink>;

/// Consumer of progress events.
///
/// Implementations should return quickly; the run waits for each call before
/// delivering the next event.
#[async_trait]
pub trait ReportSink: Send + Sync + 'static {
    /// Handle one progress event.
    async fn on_progress(&self, event: &ProgressEvent) -> Result<(), SinkError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
