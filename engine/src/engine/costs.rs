//! Weekly cost accrual.
//!
//! Each role pays a holding cost per unit in inventory and a backorder cost
//! per unit of backlog, charged once per week on closing positions. Costs
//! only accumulate; a week can add zero but never subtract.

use serde::{Deserialize, Serialize};

/// Per-unit per-week cost rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRates {
    pub holding_per_unit: f64,
    pub backorder_per_unit: f64,
}

impl Default for CostRates {
    /// The textbook rates: backorders twice as painful as stock.
    fn default() -> Self {
        Self {
            holding_per_unit: 1.0,
            backorder_per_unit: 2.0,
        }
    }
}

/// One week's charge for one role, split by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub holding: f64,
    pub backorder: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.holding + self.backorder
    }
}

/// Running cost totals for a single role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostAccumulator {
    holding_total: f64,
    backorder_total: f64,
}

impl CostAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Charge one week's closing positions and return the week's breakdown.
    pub fn charge_week(
        &mut self,
        inventory: u32,
        backlog: u32,
        rates: &CostRates,
    ) -> CostBreakdown {
        let breakdown = CostBreakdown {
            holding: inventory as f64 * rates.holding_per_unit,
            backorder: backlog as f64 * rates.backorder_per_unit,
        };
        self.holding_total += breakdown.holding;
        self.backorder_total += breakdown.backorder;
        breakdown
    }

    pub fn holding_total(&self) -> f64 {
        self.holding_total
    }

    pub fn backorder_total(&self) -> f64 {
        self.backorder_total
    }

    pub fn total(&self) -> f64 {
        self.holding_total + self.backorder_total
    }

    /// Restore accumulated totals from a snapshot.
    pub fn from_totals(holding_total: f64, backorder_total: f64) -> Self {
        Self {
            holding_total,
            backorder_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_week_uses_both_rates() {
        let mut acc = CostAccumulator::new();
        let rates = CostRates::default();

        let week1 = acc.charge_week(8, 0, &rates);
        assert_eq!(week1.total(), 8.0);

        let week2 = acc.charge_week(2, 3, &rates);
        assert_eq!(week2.holding, 2.0);
        assert_eq!(week2.backorder, 6.0);

        assert_eq!(acc.total(), 16.0);
        assert_eq!(acc.holding_total(), 10.0);
        assert_eq!(acc.backorder_total(), 6.0);
    }

    #[test]
    fn test_totals_never_decrease() {
        let mut acc = CostAccumulator::new();
        let rates = CostRates::default();
        let mut last = 0.0;
        for week in 0..20u32 {
            acc.charge_week(week % 5, (week + 1) % 3, &rates);
            assert!(acc.total() >= last);
            last = acc.total();
        }
    }

    #[test]
    fn test_empty_positions_charge_nothing() {
        let mut acc = CostAccumulator::new();
        let breakdown = acc.charge_week(0, 0, &CostRates::default());
        assert_eq!(breakdown.total(), 0.0);
        assert_eq!(acc.total(), 0.0);
    }
}
