//! Customer demand generation.
//!
//! The external customer's weekly order quantities are precomputed into a
//! schedule at game start, so every role-facing code path sees demand as
//! plain data and the only consumer of randomness is schedule construction.

use crate::rng::SeededRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by demand pattern validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DemandError {
    #[error("random demand bounds invalid: min {min} > max {max}")]
    InvalidBounds { min: u32, max: u32 },

    #[error("step week {step_week} is not a valid week (1-based)")]
    InvalidStepWeek { step_week: u32 },
}

/// How the external customer orders week by week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemandPattern {
    /// The same quantity every week.
    Constant { level: u32 },

    /// `initial` until `step_week`, `increased` from `step_week` onward.
    /// The classic bullwhip trigger.
    Step {
        initial: u32,
        increased: u32,
        step_week: u32,
    },

    /// Uniform in `[min, max]`, drawn from the seeded generator.
    Random { min: u32, max: u32 },
}

impl DemandPattern {
    pub fn validate(&self) -> Result<(), DemandError> {
        match *self {
            DemandPattern::Constant { .. } => Ok(()),
            DemandPattern::Step { step_week, .. } => {
                if step_week == 0 {
                    Err(DemandError::InvalidStepWeek { step_week })
                } else {
                    Ok(())
                }
            }
            DemandPattern::Random { min, max } => {
                if min > max {
                    Err(DemandError::InvalidBounds { min, max })
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Default for DemandPattern {
    /// The textbook setup: 4 units a week.
    fn default() -> Self {
        DemandPattern::Constant { level: 4 }
    }
}

/// Precompute the demand for weeks `1..=weeks`.
///
/// Index 0 of the returned schedule is week 1. The generator is advanced
/// once per week only for the `Random` pattern, so deterministic patterns
/// leave the stream untouched.
pub fn build_schedule(
    pattern: DemandPattern,
    weeks: u32,
    rng: &mut SeededRng,
) -> Result<Vec<u32>, DemandError> {
    pattern.validate()?;

    let schedule = (1..=weeks)
        .map(|week| match pattern {
            DemandPattern::Constant { level } => level,
            DemandPattern::Step {
                initial,
                increased,
                step_week,
            } => {
                if week >= step_week {
                    increased
                } else {
                    initial
                }
            }
            DemandPattern::Random { min, max } => {
                if min == max {
                    min
                } else {
                    rng.range_u32(min, max + 1)
                }
            }
        })
        .collect();

    Ok(schedule)
}
