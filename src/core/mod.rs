//! Runtime core: scheduling, reporting and run control.
//!
//! Public API from this module: [`RunController`] (with [`RunHandle`] and its
//! builder), [`Scheduler`] for driving a single run directly, and [`RunOutcome`].
//!
//! Internal modules:
//! - [`scheduler`]: parallel and sequential loops, cancellation checks;
//! - [`reporter`]: serialized sink delivery, progress counter, run hand-off;
//! - [`controller`]: active-run slot, start/cancel/shutdown;
//! - [`builder`]: controller construction and subscriber wiring.

mod builder;
mod controller;
mod outcome;
mod reporter;
mod scheduler;

pub use builder::RunControllerBuilder;
pub use controller::{RunController, RunHandle};
pub use outcome::RunOutcome;
pub use scheduler::Scheduler;

pub(crate) use reporter::Reporter;
