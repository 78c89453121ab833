//! # Lifecycle event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Scheduler/Reporter ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                  │
//!                                                      ┌───────────┼──────────┐
//!                                                      ▼           ▼          ▼
//!                                                  LogWriter    Metrics    Custom
//! ```
//!
//! Subscribers only see lifecycle [`Event`](crate::Event)s. Progress goes to the
//! [`ReportSink`](crate::ReportSink) and is never dropped; lifecycle events may be.

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
