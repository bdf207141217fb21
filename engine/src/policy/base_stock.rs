//! Base-stock ("order-up-to") ordering policy.
//!
//! Each week the policy forecasts demand as the average of a trailing
//! observation window, computes a target stock level, and orders whatever is
//! needed to bring the inventory position up to that target:
//!
//! ```text
//! target = avg_demand * forecast_horizon + safety_factor * avg_demand
//! order  = max(0, target - inventory + backlog - supply_line)
//! ```
//!
//! Accounting for the supply line (orders already in transit) is what keeps
//! this a stable policy; ignoring it is one of the drivers of the bullwhip
//! effect.

use crate::policy::{OrderPolicy, PolicyInputs};
use serde::{Deserialize, Serialize};

/// Modified base-stock policy parameters.
///
/// # Example
/// ```
/// use beergame_simulator_core_rs::policy::{BaseStockPolicy, OrderPolicy, PolicyInputs};
///
/// let policy = BaseStockPolicy::new(4, 0.5, 4);
/// let inputs = PolicyInputs {
///     inventory: 12,
///     backlog: 0,
///     supply_line: 0,
///     observed_demand: &[4, 4, 4, 4],
/// };
/// // target = 4*4 + 0.5*4 = 18, order = 18 - 12 = 6
/// assert_eq!(policy.order_quantity(&inputs), 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStockPolicy {
    /// Weeks of forecast demand to cover.
    pub forecast_horizon: u32,
    /// Extra buffer as a fraction of one week's average demand.
    pub safety_factor: f64,
    /// Trailing observations used for the demand forecast.
    pub window: usize,
}

impl BaseStockPolicy {
    pub fn new(forecast_horizon: u32, safety_factor: f64, window: usize) -> Self {
        Self {
            forecast_horizon,
            safety_factor,
            window,
        }
    }

    /// Average over the trailing window, 0.0 with no observations yet.
    fn forecast(&self, observed: &[u32]) -> f64 {
        let start = observed.len().saturating_sub(self.window.max(1));
        let window = &observed[start..];
        if window.is_empty() {
            return 0.0;
        }
        window.iter().map(|&d| d as f64).sum::<f64>() / window.len() as f64
    }
}

impl Default for BaseStockPolicy {
    fn default() -> Self {
        Self::new(4, 0.5, 4)
    }
}

impl OrderPolicy for BaseStockPolicy {
    fn order_quantity(&self, inputs: &PolicyInputs<'_>) -> u32 {
        let avg = self.forecast(inputs.observed_demand);
        let target = avg * self.forecast_horizon as f64 + self.safety_factor * avg;
        let position =
            inputs.inventory as f64 - inputs.backlog as f64 + inputs.supply_line as f64;
        (target - position).max(0.0).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(inventory: u32, backlog: u32, supply_line: u32, observed: &[u32]) -> PolicyInputs {
        PolicyInputs {
            inventory,
            backlog,
            supply_line,
            observed_demand: observed,
        }
    }

    #[test]
    fn test_textbook_target_arithmetic() {
        let policy = BaseStockPolicy::new(4, 0.5, 4);
        assert_eq!(policy.order_quantity(&inputs(12, 0, 0, &[4, 4, 4, 4])), 6);
    }

    #[test]
    fn test_order_never_negative() {
        let policy = BaseStockPolicy::new(2, 0.0, 4);
        // Inventory far above target.
        assert_eq!(policy.order_quantity(&inputs(100, 0, 0, &[4, 4])), 0);
    }

    #[test]
    fn test_backlog_raises_and_supply_line_lowers_order() {
        let policy = BaseStockPolicy::new(4, 0.5, 4);
        let base = policy.order_quantity(&inputs(12, 0, 0, &[4, 4, 4, 4]));
        assert_eq!(
            policy.order_quantity(&inputs(12, 3, 0, &[4, 4, 4, 4])),
            base + 3
        );
        assert_eq!(
            policy.order_quantity(&inputs(12, 0, 4, &[4, 4, 4, 4])),
            base - 4
        );
    }

    #[test]
    fn test_empty_observation_window_orders_nothing_with_stock() {
        let policy = BaseStockPolicy::default();
        assert_eq!(policy.order_quantity(&inputs(12, 0, 0, &[])), 0);
    }

    #[test]
    fn test_forecast_uses_trailing_window_only() {
        let policy = BaseStockPolicy::new(1, 0.0, 2);
        // Only the last two observations (8, 8) count: target = 8.
        let q = policy.order_quantity(&inputs(0, 0, 0, &[1, 1, 1, 8, 8]));
        assert_eq!(q, 8);
    }

    #[test]
    fn test_pure_function_same_inputs_same_output() {
        let policy = BaseStockPolicy::default();
        let i = inputs(7, 2, 5, &[3, 5, 4, 4]);
        assert_eq!(policy.order_quantity(&i), policy.order_quantity(&i));
    }
}
