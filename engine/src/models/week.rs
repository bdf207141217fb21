//! Per-week state records.
//!
//! One `WeekState` is appended to the game history per simulated week. A
//! snapshot is immutable once the following week begins; the next week's
//! working state is seeded from its closing inventory and backlog with all
//! flow counters reset.

use crate::models::role::{Role, RoleMap};
use serde::{Deserialize, Serialize};

/// Working and historical state for a single role within one week.
///
/// Inventory is never negative: shortfalls become backlog instead, so both
/// fields are unsigned by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleWeekRecord {
    pub inventory: u32,
    pub backlog: u32,
    /// Demand that became visible to this role this week.
    pub incoming_order: u32,
    /// Order this role placed upstream this week (production run for the
    /// Factory).
    pub outgoing_order: u32,
    pub shipment_received: u32,
    pub shipment_sent: u32,
    /// Units ordered upstream that have not yet arrived.
    pub supply_line: u32,
    /// Holding + backorder cost accumulated since week 1. Strictly
    /// non-decreasing across weeks.
    pub cumulative_cost: f64,
}

impl RoleWeekRecord {
    /// Seed the next week's working record: carry stock positions, reset
    /// flow counters.
    pub fn carry_forward(&self) -> Self {
        Self {
            inventory: self.inventory,
            backlog: self.backlog,
            incoming_order: 0,
            outgoing_order: 0,
            shipment_received: 0,
            shipment_sent: 0,
            supply_line: self.supply_line,
            cumulative_cost: self.cumulative_cost,
        }
    }
}

/// What a participant is expected to do this week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Choose this week's upstream order quantity.
    PlaceOrder,
}

/// A required participant action with its completion flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAction {
    pub participant: String,
    pub role: Role,
    pub kind: ActionKind,
    pub completed: bool,
    /// The submitted quantity, once completed.
    pub quantity: Option<u32>,
}

impl PendingAction {
    pub fn place_order(participant: &str, role: Role) -> Self {
        Self {
            participant: participant.to_string(),
            role,
            kind: ActionKind::PlaceOrder,
            completed: false,
            quantity: None,
        }
    }
}

/// Immutable snapshot of one game-week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekState {
    pub week: u32,
    pub customer_demand: u32,
    pub roles: RoleMap<RoleWeekRecord>,
    /// The actions that were required this week, with completion flags.
    pub actions: Vec<PendingAction>,
}

impl WeekState {
    pub fn record(&self, role: Role) -> &RoleWeekRecord {
        &self.roles[role]
    }
}

/// True when every required action has been completed.
pub fn all_actions_complete(actions: &[PendingAction]) -> bool {
    actions.iter().all(|a| a.completed)
}

/// Roles whose required action is still outstanding.
pub fn incomplete_roles(actions: &[PendingAction]) -> Vec<Role> {
    actions
        .iter()
        .filter(|a| !a.completed)
        .map(|a| a.role)
        .collect()
}
