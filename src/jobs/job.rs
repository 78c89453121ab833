//! # Job abstraction.
//!
//! A [`Job`] maps an index (`1..=total`) to a value. Implementations must be
//! pure and deterministic: the scheduler may call `compute` for different
//! indices on different threads at the same time, and never more than once
//! per index within a run.
//!
//! `compute` is synchronous on purpose. It may be arbitrarily CPU-bound, so the
//! scheduler runs it on tokio's blocking pool rather than on a reactor thread.

use std::sync::Arc;

use crate::error::JobError;

/// Shared handle to a job.
pub type JobRef = Arc<dyn Job>;

/// # Pure, possibly expensive, per-index computation.
///
/// # Example
/// ```
/// use runvisor::{Job, JobError};
///
/// struct Square;
///
/// impl Job for Square {
///     fn name(&self) -> &str { "square" }
///
///     fn compute(&self, index: usize) -> Result<u128, JobError> {
///         let i = index as u128;
///         Ok(i * i)
///     }
/// }
///
/// assert_eq!(Square.compute(12), Ok(144));
/// ```
pub trait Job: Send + Sync + 'static {
    /// Returns a stable, human-readable job name.
    fn name(&self) -> &str;

    /// Computes the value for `index`.
    fn compute(&self, index: usize) -> Result<u128, JobError>;
}
