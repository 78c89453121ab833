//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the run controller.
//!
//! Config is used in two ways:
//! 1. **Controller creation**: `RunController::builder(job, sink).with_config(cfg)`
//! 2. **Policy defaults**: `RunPolicy::sequential_default(&cfg)`
//!
//! ## Sentinel values
//! - `max_concurrent = 0` → unlimited parallel fan-out (no semaphore created)
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use crate::policies::{DEFAULT_STEP_DELAY, FailurePolicy};

/// Global configuration for runs started by a controller.
///
/// ## Field semantics
/// - `step_delay`: Default pause between sequential steps
/// - `max_concurrent`: Parallel job limit (`0` = unlimited)
/// - `bus_capacity`: Lifecycle event bus ring buffer size (min 1)
/// - `failure`: What a run does after a failed job
#[derive(Clone, Debug)]
pub struct Config {
    /// Default pause after each sequential step.
    ///
    /// Only used through [`RunPolicy::sequential_default`](crate::RunPolicy::sequential_default);
    /// an explicit `RunPolicy::Sequential { delay }` wins.
    pub step_delay: Duration,

    /// Maximum number of parallel jobs computing at once.
    ///
    /// - `0` = unlimited (every job is submitted immediately)
    /// - `n > 0` = at most `n` jobs hold a permit simultaneously
    pub max_concurrent: usize,

    /// Capacity of the lifecycle event bus broadcast channel.
    ///
    /// Slow subscribers that lag behind more than `bus_capacity` events skip
    /// older items. Progress events never go through the bus.
    pub bus_capacity: usize,

    /// Failure handling for job errors.
    pub failure: FailurePolicy,
}

impl Config {
    /// Returns the parallel concurrency limit as an `Option`.
    ///
    /// - `None` → unlimited
    /// - `Some(n)` → at most `n` concurrent jobs
    #[inline]
    pub fn concurrency_limit(&self) -> Option<usize> {
        if self.max_concurrent == 0 {
            None
        } else {
            Some(self.max_concurrent)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `step_delay = 500ms`
    /// - `max_concurrent = 0` (unlimited)
    /// - `bus_capacity = 1024`
    /// - `failure = FailurePolicy::Continue`
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            max_concurrent: 0,
            bus_capacity: 1024,
            failure: FailurePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels() {
        let mut cfg = Config::default();
        assert_eq!(cfg.concurrency_limit(), None);
        assert_eq!(cfg.step_delay, Duration::from_millis(500));

        cfg.max_concurrent = 3;
        cfg.bus_capacity = 0;
        assert_eq!(cfg.concurrency_limit(), Some(3));
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }
}
