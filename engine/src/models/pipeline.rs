//! Fixed-delay pipeline for goods and orders in transit.
//!
//! A pipeline is a bounded shift buffer of quantities indexed by remaining
//! weeks until arrival. Bucket 0 means "available this week". Each simulated
//! week the engine drains bucket 0 and then shifts the remainder down by one
//! position.
//!
//! # Invariant
//!
//! Units are conserved: after `advance()`, the sum of all buckets equals the
//! sum before minus the drained amount.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by pipeline operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Requested delay does not fit in the buffer.
    #[error("delay {delay} exceeds pipeline capacity {capacity}")]
    DelayOutOfRange { delay: usize, capacity: usize },
}

/// A fixed-capacity delay queue of unit quantities.
///
/// Capacity is `max(configured_delay, 1) + 1` buckets so that a mid-game
/// delay reconfiguration of ±1 week cannot overflow the buffer.
///
/// # Example
/// ```
/// use beergame_simulator_core_rs::models::pipeline::Pipeline;
///
/// let mut pipe = Pipeline::new(2);
/// pipe.place(8, 2).unwrap();
/// assert_eq!(pipe.advance(), 0); // one week out
/// assert_eq!(pipe.advance(), 0); // arriving next advance
/// assert_eq!(pipe.advance(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Quantity per remaining-weeks bucket; index 0 is due now.
    buckets: Vec<u32>,
    /// Delay the pipeline was configured with (informational).
    configured_delay: usize,
}

impl Pipeline {
    /// Create a pipeline sized for the given transit delay in weeks.
    pub fn new(configured_delay: usize) -> Self {
        let capacity = configured_delay.max(1) + 1;
        Self {
            buckets: vec![0; capacity],
            configured_delay,
        }
    }

    /// Add `amount` units arriving in `delay_weeks` weeks.
    ///
    /// Bucket 0 ("this week") is legal and is used by zero-delay
    /// configurations; callers draining within the same cycle use
    /// [`take_due`](Self::take_due).
    pub fn place(&mut self, amount: u32, delay_weeks: usize) -> Result<(), PipelineError> {
        if delay_weeks >= self.buckets.len() {
            return Err(PipelineError::DelayOutOfRange {
                delay: delay_weeks,
                capacity: self.buckets.len(),
            });
        }
        self.buckets[delay_weeks] += amount;
        Ok(())
    }

    /// Extract the quantity due this week without shifting the buffer.
    ///
    /// Used by the weekly cycle, which consumes arrivals at the start of the
    /// week and shifts all pipelines in a single later sub-step.
    pub fn take_due(&mut self) -> u32 {
        std::mem::take(&mut self.buckets[0])
    }

    /// Peek at the quantity due this week.
    pub fn due(&self) -> u32 {
        self.buckets[0]
    }

    /// Shift every bucket down one week and return the departing bucket 0.
    ///
    /// A zero is written into the newly opened tail bucket.
    pub fn advance(&mut self) -> u32 {
        let departing = self.buckets[0];
        self.buckets.rotate_left(1);
        let last = self.buckets.len() - 1;
        self.buckets[last] = 0;
        departing
    }

    /// Total units currently in transit.
    pub fn in_transit(&self) -> u32 {
        self.buckets.iter().sum()
    }

    /// Number of buckets (capacity).
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The delay this pipeline was configured for.
    pub fn configured_delay(&self) -> usize {
        self.configured_delay
    }
}
