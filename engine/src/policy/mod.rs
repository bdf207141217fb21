//! Ordering policies for computer-controlled roles.
//!
//! A policy is a pure function from a state snapshot to a non-negative order
//! quantity. The engine assembles the snapshot (including the demand series
//! the configured visibility mode allows the role to see) and the policy
//! carries no hidden mutable state, so it is independently testable.
//!
//! # Policy Interface
//!
//! All policies implement the `OrderPolicy` trait:
//! ```rust
//! use beergame_simulator_core_rs::policy::{OrderPolicy, PolicyInputs};
//!
//! struct OrderNothing;
//!
//! impl OrderPolicy for OrderNothing {
//!     fn order_quantity(&self, _inputs: &PolicyInputs<'_>) -> u32 {
//!         0
//!     }
//! }
//! ```

mod base_stock;

pub use base_stock::BaseStockPolicy;

use serde::{Deserialize, Serialize};

/// Which demand signals a role's forecast may observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Visibility {
    /// Only the orders this role itself received, week by week.
    Traditional,
    /// Each observation blended 50/50 with the end-customer demand of the
    /// same week. Sharing the point-of-sale signal upstream is the classic
    /// bullwhip dampener.
    DemandSharing,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Traditional
    }
}

/// Snapshot of everything a policy may look at.
#[derive(Debug, Clone, Copy)]
pub struct PolicyInputs<'a> {
    pub inventory: u32,
    pub backlog: u32,
    /// Units already ordered upstream and still in transit.
    pub supply_line: u32,
    /// Demand observations, oldest first, already filtered by visibility.
    pub observed_demand: &'a [u32],
}

/// An ordering rule. Implementations must be deterministic in their inputs.
pub trait OrderPolicy {
    fn order_quantity(&self, inputs: &PolicyInputs<'_>) -> u32;
}

/// Blend one week's own incoming order with the customer demand of the same
/// week, rounding half up. Used by [`Visibility::DemandSharing`].
pub fn blend_observation(own_incoming: u32, customer_demand: u32) -> u32 {
    (own_incoming + customer_demand + 1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_rounds_half_up() {
        assert_eq!(blend_observation(4, 4), 4);
        assert_eq!(blend_observation(5, 4), 5);
        assert_eq!(blend_observation(0, 8), 4);
    }
}
