//! Execution and failure policies.
//!
//! This module groups the knobs that control **how** a run schedules its jobs
//! and **what happens** when one of them fails.
//!
//! ## Contents
//! - [`RunPolicy`] parallel fan-out or ordered sequential steps with a delay
//! - [`FailurePolicy`] keep going or stop scheduling after a failed job
//!
//! ## Quick wiring
//! ```text
//! RunController::start(total, RunPolicy)
//!      └─► core::scheduler::Scheduler uses:
//!           - RunPolicy to pick the parallel or sequential loop
//!           - Config::failure to decide continue/abort on JobError
//! ```
//!
//! ## Defaults
//! - `RunPolicy::default()` → `Parallel`.
//! - `FailurePolicy::default()` → `Continue`.

mod failure;
mod run;

pub use failure::FailurePolicy;
pub use run::{DEFAULT_STEP_DELAY, RunPolicy};
