//! Boundary contract for the external ledger service.
//!
//! The ledger is an independently operated, eventually-confirmed audit
//! layer. The core talks to it through the narrow `LedgerClient` trait and
//! must function with no client attached at all (ledger-disabled games).
//!
//! `RecordingLedger` is the in-memory implementation used by tests: it
//! records every submitted action, hands out sequential external references,
//! and can be switched into a failing mode to exercise the retry and
//! reconciliation paths.

use crate::models::role::{OrderParty, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// None of these may interrupt gameplay: the local write has already
/// committed by the time a submission runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger unavailable: {0}")]
    Unavailable(String),

    #[error("ledger rejected action: {0}")]
    Rejected(String),

    #[error("not found on ledger: {0}")]
    NotFound(String),
}

/// A mutating action mirrored to the ledger.
///
/// `correlation_id` is the local order id, carried end-to-end so inbound
/// confirmations can be matched by identity instead of by shape whenever the
/// submission succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LedgerAction {
    RegisterGame {
        game_id: String,
    },
    PlaceOrder {
        game_id: String,
        week: u32,
        sender: OrderParty,
        recipient: Role,
        quantity: u32,
        correlation_id: String,
    },
    ShipOrder {
        game_id: String,
        week: u32,
        order_ref: String,
        quantity: u32,
    },
    DeliverOrder {
        game_id: String,
        week: u32,
        order_ref: String,
    },
    AdvanceWeek {
        game_id: String,
        week: u32,
        total_cost: f64,
    },
}

impl LedgerAction {
    /// Short tag for event logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerAction::RegisterGame { .. } => "RegisterGame",
            LedgerAction::PlaceOrder { .. } => "PlaceOrder",
            LedgerAction::ShipOrder { .. } => "ShipOrder",
            LedgerAction::DeliverOrder { .. } => "DeliverOrder",
            LedgerAction::AdvanceWeek { .. } => "AdvanceWeek",
        }
    }
}

/// Acknowledgment of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub external_ref: String,
}

/// Typed confirmation event pushed by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEventKind {
    OrderPlaced,
    OrderShipped,
    OrderDelivered,
    WeekAdvanced,
    InventoryUpdated,
}

/// An inbound ledger event. Fields beyond the kind are optional because the
/// ledger only populates what the event concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEvent {
    pub kind: LedgerEventKind,
    pub game_id: String,
    pub week: u32,
    pub sender: Option<OrderParty>,
    pub recipient: Option<Role>,
    pub quantity: Option<u32>,
    pub external_ref: Option<String>,
}

/// Order status as the ledger sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerOrderStatus {
    Placed,
    Shipped,
    Delivered,
}

/// Authoritative read of one order, used by the reconciliation pull path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerOrderView {
    pub external_ref: String,
    pub status: LedgerOrderStatus,
    pub week: u32,
}

/// The narrow RPC-like interface to the ledger service.
pub trait LedgerClient {
    /// Mirror a mutating action. Must not be retried internally; the caller
    /// owns retry policy.
    fn submit(&mut self, action: &LedgerAction) -> Result<LedgerReceipt, LedgerError>;

    /// Authoritative read of one order by its external reference.
    fn fetch_order(&self, game_id: &str, external_ref: &str)
        -> Result<LedgerOrderView, LedgerError>;

    /// The last week the ledger has recorded for a game.
    fn fetch_week(&self, game_id: &str) -> Result<u32, LedgerError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

/// In-memory ledger that records everything submitted to it.
///
/// Available in all builds (not just tests) so downstream integrations can
/// use it as a stand-in service. `set_failing(true)` makes every `submit`
/// return `Unavailable` until switched back, for exercising retry paths.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    submitted: Vec<LedgerAction>,
    orders: HashMap<String, LedgerOrderView>,
    weeks: HashMap<String, u32>,
    next_ref: u64,
    failing: bool,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Every action accepted so far, in submission order.
    pub fn submitted(&self) -> &[LedgerAction] {
        &self.submitted
    }

    pub fn submitted_count(&self) -> usize {
        self.submitted.len()
    }

    fn allocate_ref(&mut self) -> String {
        self.next_ref += 1;
        format!("LGR-{:06}", self.next_ref)
    }
}

impl LedgerClient for RecordingLedger {
    fn submit(&mut self, action: &LedgerAction) -> Result<LedgerReceipt, LedgerError> {
        if self.failing {
            return Err(LedgerError::Unavailable("injected failure".to_string()));
        }
        let external_ref = self.allocate_ref();
        match action {
            LedgerAction::PlaceOrder { game_id: _, week, .. } => {
                self.orders.insert(
                    external_ref.clone(),
                    LedgerOrderView {
                        external_ref: external_ref.clone(),
                        status: LedgerOrderStatus::Placed,
                        week: *week,
                    },
                );
            }
            LedgerAction::ShipOrder { order_ref, week, .. } => {
                if let Some(view) = self.orders.get_mut(order_ref) {
                    view.status = LedgerOrderStatus::Shipped;
                    view.week = *week;
                }
            }
            LedgerAction::DeliverOrder { order_ref, week, .. } => {
                if let Some(view) = self.orders.get_mut(order_ref) {
                    view.status = LedgerOrderStatus::Delivered;
                    view.week = *week;
                }
            }
            LedgerAction::AdvanceWeek { game_id, week, .. } => {
                self.weeks.insert(game_id.clone(), *week);
            }
            LedgerAction::RegisterGame { game_id } => {
                self.weeks.insert(game_id.clone(), 0);
            }
        }
        self.submitted.push(action.clone());
        Ok(LedgerReceipt { external_ref })
    }

    fn fetch_order(
        &self,
        _game_id: &str,
        external_ref: &str,
    ) -> Result<LedgerOrderView, LedgerError> {
        if self.failing {
            return Err(LedgerError::Unavailable("injected failure".to_string()));
        }
        self.orders
            .get(external_ref)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(external_ref.to_string()))
    }

    fn fetch_week(&self, game_id: &str) -> Result<u32, LedgerError> {
        if self.failing {
            return Err(LedgerError::Unavailable("injected failure".to_string()));
        }
        self.weeks
            .get(game_id)
            .copied()
            .ok_or_else(|| LedgerError::NotFound(game_id.to_string()))
    }
}

/// Externally advance a recorded order's status, simulating contract-side
/// progress that arrived without a push event. Test helper.
impl RecordingLedger {
    pub fn force_order_status(&mut self, external_ref: &str, status: LedgerOrderStatus, week: u32) {
        if let Some(view) = self.orders.get_mut(external_ref) {
            view.status = status;
            view.week = week;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(game: &str, week: u32, qty: u32) -> LedgerAction {
        LedgerAction::PlaceOrder {
            game_id: game.to_string(),
            week,
            sender: OrderParty::Customer,
            recipient: Role::Retailer,
            quantity: qty,
            correlation_id: "local-1".to_string(),
        }
    }

    #[test]
    fn test_submit_records_and_assigns_refs() {
        let mut ledger = RecordingLedger::new();
        let r1 = ledger.submit(&place("g", 1, 4)).unwrap();
        let r2 = ledger.submit(&place("g", 2, 4)).unwrap();
        assert_ne!(r1.external_ref, r2.external_ref);
        assert_eq!(ledger.submitted_count(), 2);

        let view = ledger.fetch_order("g", &r1.external_ref).unwrap();
        assert_eq!(view.status, LedgerOrderStatus::Placed);
    }

    #[test]
    fn test_failing_mode_rejects_everything() {
        let mut ledger = RecordingLedger::new();
        ledger.set_failing(true);
        assert!(matches!(
            ledger.submit(&place("g", 1, 4)),
            Err(LedgerError::Unavailable(_))
        ));
        assert_eq!(ledger.submitted_count(), 0);

        ledger.set_failing(false);
        assert!(ledger.submit(&place("g", 1, 4)).is_ok());
    }

    #[test]
    fn test_ship_and_deliver_advance_the_view() {
        let mut ledger = RecordingLedger::new();
        let receipt = ledger.submit(&place("g", 1, 4)).unwrap();
        ledger
            .submit(&LedgerAction::ShipOrder {
                game_id: "g".to_string(),
                week: 2,
                order_ref: receipt.external_ref.clone(),
                quantity: 4,
            })
            .unwrap();

        let view = ledger.fetch_order("g", &receipt.external_ref).unwrap();
        assert_eq!(view.status, LedgerOrderStatus::Shipped);
        assert_eq!(view.week, 2);
    }
}
