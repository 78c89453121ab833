//! # Factorial job.
//!
//! Reference job: `compute(i) = i!`. Values up to `34!` fit in `u128`; larger
//! indices fail with [`JobError::Overflow`] instead of wrapping.

use crate::error::JobError;
use crate::jobs::job::Job;

/// Computes `index!` with overflow detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct Factorial;

impl Job for Factorial {
    fn name(&self) -> &str {
        "factorial"
    }

    fn compute(&self, index: usize) -> Result<u128, JobError> {
        (1..=index as u128)
            .try_fold(1u128, |acc, k| acc.checked_mul(k))
            .ok_or(JobError::Overflow { index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        assert_eq!(Factorial.compute(0), Ok(1));
        assert_eq!(Factorial.compute(1), Ok(1));
        assert_eq!(Factorial.compute(5), Ok(120));
        assert_eq!(Factorial.compute(20), Ok(2_432_902_008_176_640_000));
    }

    #[test]
    fn largest_representable() {
        assert!(Factorial.compute(34).is_ok());
        assert_eq!(Factorial.compute(35), Err(JobError::Overflow { index: 35 }));
    }
}
