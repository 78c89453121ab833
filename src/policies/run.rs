//! # Run policies.
//!
//! [`RunPolicy`] selects the execution strategy of a run:
//!
//! - [`RunPolicy::Parallel`] every job is submitted at once; results are reported
//!   in completion order.
//! - [`RunPolicy::Sequential`] jobs run one by one in index order, with a fixed
//!   pause after each reported result.
//!
//! ```text
//! Parallel:    [1] [2] [3] ... [N]   ──► report as they finish
//! Sequential:  [1] ─delay─► [2] ─delay─► ... ─► [N]
//! ```

use std::time::Duration;

use crate::config::Config;

/// Pause between sequential steps unless configured otherwise.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

/// Policy controlling how the jobs of a run are scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunPolicy {
    /// Submit all jobs concurrently (default).
    #[default]
    Parallel,
    /// Run jobs strictly in index order.
    ///   - `delay`: pause after each reported result, before the next job starts.
    Sequential { delay: Duration },
}

impl RunPolicy {
    /// Sequential policy with an explicit delay.
    #[inline]
    pub fn sequential(delay: Duration) -> Self {
        RunPolicy::Sequential { delay }
    }

    /// Sequential policy using [`Config::step_delay`].
    #[inline]
    pub fn sequential_default(cfg: &Config) -> Self {
        RunPolicy::Sequential {
            delay: cfg.step_delay,
        }
    }

    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RunPolicy::Parallel => "parallel",
            RunPolicy::Sequential { .. } => "sequential",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_default_uses_config_delay() {
        let mut cfg = Config::default();
        assert_eq!(
            RunPolicy::sequential_default(&cfg),
            RunPolicy::sequential(DEFAULT_STEP_DELAY)
        );

        cfg.step_delay = Duration::from_millis(20);
        assert_eq!(
            RunPolicy::sequential_default(&cfg),
            RunPolicy::Sequential {
                delay: Duration::from_millis(20)
            }
        );
    }

    #[test]
    fn labels() {
        assert_eq!(RunPolicy::default().as_label(), "parallel");
        assert_eq!(
            RunPolicy::sequential(Duration::ZERO).as_label(),
            "sequential"
        );
    }
}
