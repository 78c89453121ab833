//! # Function-backed job (`JobFn`)
//!
//! [`JobFn`] wraps a closure `F: Fn(usize) -> Result<u128, JobError>`.
//! The closure must not rely on hidden mutable state; if it needs shared data,
//! capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use runvisor::{JobError, JobFn, JobRef};
//!
//! let double: JobRef = JobFn::arc("double", |i: usize| Ok::<_, JobError>(2 * i as u128));
//!
//! assert_eq!(double.name(), "double");
//! assert_eq!(double.compute(21), Ok(42));
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::JobError;
use crate::jobs::job::Job;

/// Function-backed job implementation.
#[derive(Debug)]
pub struct JobFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> JobFn<F> {
    /// Creates a new function-backed job.
    ///
    /// Prefer [`JobFn::arc`] when you immediately need a [`JobRef`](crate::JobRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the job and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Job for JobFn<F>
where
    F: Fn(usize) -> Result<u128, JobError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn compute(&self, index: usize) -> Result<u128, JobError> {
        (self.f)(index)
    }
}
