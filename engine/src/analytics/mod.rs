//! Bullwhip analytics over per-week history.
//!
//! Pure, read-only aggregation: same history in, same report out, computable
//! at any point during a game and frozen at completion. The headline metric
//! is demand amplification, the ratio of a tier's order variance to the
//! variance of the tier immediately downstream, anchored at the end
//! customer. Variance of an empty or single-element series is defined as 0,
//! and a zero-variance denominator yields an amplification of 0 rather than
//! infinity, so constant-demand games produce clean numbers.

use crate::models::role::{Role, RoleMap};
use crate::models::week::WeekState;
use serde::{Deserialize, Serialize};

/// Population variance; 0 for series shorter than two elements.
pub fn variance(series: &[u32]) -> f64 {
    if series.len() <= 1 {
        return 0.0;
    }
    let n = series.len() as f64;
    let mean = series.iter().map(|&v| v as f64).sum::<f64>() / n;
    series
        .iter()
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n
}

pub fn std_dev(series: &[u32]) -> f64 {
    variance(series).sqrt()
}

/// Aggregates for one role over the whole history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleSummary {
    pub total_cost: f64,
    pub average_inventory: f64,
    pub average_backlog: f64,
    pub order_std_dev: f64,
    /// Order variance over the immediately-downstream tier's variance;
    /// 0 when the downstream variance is 0.
    pub demand_amplification: f64,
}

/// Full analytics report for a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub weeks: u32,
    pub total_cost: f64,
    pub customer_demand_variance: f64,
    pub roles: RoleMap<RoleSummary>,
}

fn outgoing_series(history: &[WeekState], role: Role) -> Vec<u32> {
    history.iter().map(|w| w.record(role).outgoing_order).collect()
}

fn average(series: impl Iterator<Item = u32>, weeks: usize) -> f64 {
    if weeks == 0 {
        return 0.0;
    }
    series.map(|v| v as f64).sum::<f64>() / weeks as f64
}

/// Compute the full report over a game's history.
pub fn analyze(history: &[WeekState]) -> AnalyticsReport {
    let weeks = history.len();
    let demand_series: Vec<u32> = history.iter().map(|w| w.customer_demand).collect();
    let customer_demand_variance = variance(&demand_series);

    let roles = RoleMap::new(|role| {
        let orders = outgoing_series(history, role);
        let downstream_variance = match role.downstream() {
            Some(downstream) => variance(&outgoing_series(history, downstream)),
            None => customer_demand_variance,
        };
        let order_variance = variance(&orders);
        let demand_amplification = if downstream_variance == 0.0 {
            0.0
        } else {
            order_variance / downstream_variance
        };

        RoleSummary {
            total_cost: history
                .last()
                .map(|w| w.record(role).cumulative_cost)
                .unwrap_or(0.0),
            average_inventory: average(history.iter().map(|w| w.record(role).inventory), weeks),
            average_backlog: average(history.iter().map(|w| w.record(role).backlog), weeks),
            order_std_dev: std_dev(&orders),
            demand_amplification,
        }
    });

    AnalyticsReport {
        weeks: weeks as u32,
        total_cost: Role::ALL
            .iter()
            .map(|&role| roles[role].total_cost)
            .sum(),
        customer_demand_variance,
        roles,
    }
}
