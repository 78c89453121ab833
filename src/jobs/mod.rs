//! # Job abstractions.
//!
//! This module provides the per-index computation run by the scheduler:
//! - [`Job`] - trait for a pure `index -> value` computation
//! - [`JobFn`] - closure-backed job implementation
//! - [`JobRef`] - shared reference to a job (`Arc<dyn Job>`)
//! - [`Factorial`] - reference job computing `index!`

mod factorial;
mod job;
mod job_fn;

pub use factorial::Factorial;
pub use job::{Job, JobRef};
pub use job_fn::JobFn;
