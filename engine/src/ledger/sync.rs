//! Dual-write synchronization between the simulation and the ledger.
//!
//! The simulation is authoritative. Every mirrored write happens strictly
//! after the local commit; a ledger failure increments the order's
//! sync-attempt counter and is left for the reconciliation pass, never
//! surfaced to the gameplay caller. Inbound confirmations are matched by
//! external reference when one exists and by (week, role pair, quantity)
//! shape otherwise, oldest first.
//!
//! All handlers are idempotent: confirmations may arrive duplicated or out
//! of order, and re-applying one to an already-advanced order changes
//! nothing.

use crate::ledger::client::{
    LedgerAction, LedgerClient, LedgerEvent, LedgerEventKind, LedgerOrderStatus,
};
use crate::models::event::Event;
use crate::models::game::Game;
use crate::models::order::OrderBook;

/// Mirrors local mutations to a `LedgerClient` and applies its confirmations
/// back onto the `OrderBook`.
pub struct LedgerSync {
    client: Box<dyn LedgerClient>,
}

impl LedgerSync {
    pub fn new(client: Box<dyn LedgerClient>) -> Self {
        Self { client }
    }

    pub fn client_mut(&mut self) -> &mut dyn LedgerClient {
        &mut *self.client
    }

    /// Register the game's mirror contract. On success the contract
    /// reference is stored on the game.
    pub fn register_game(&mut self, game: &mut Game, week: u32) -> Event {
        let action = LedgerAction::RegisterGame {
            game_id: game.id().to_string(),
        };
        match self.client.submit(&action) {
            Ok(receipt) => {
                game.ledger_contract = Some(receipt.external_ref.clone());
                Event::LedgerSubmitted {
                    week,
                    action: action.kind().to_string(),
                    external_ref: receipt.external_ref,
                }
            }
            Err(_) => Event::LedgerSubmitFailed {
                week,
                action: action.kind().to_string(),
                attempts: 1,
            },
        }
    }

    /// Fire-and-forget tracked submission.
    ///
    /// `order_id`, when given, names the local order whose ledger metadata
    /// absorbs the outcome: a success stores the external reference, a
    /// failure bumps `sync_attempts`. Returns the event to log either way;
    /// the caller's local state is already committed and is never rolled
    /// back here.
    pub fn submit(
        &mut self,
        action: LedgerAction,
        order_id: Option<&str>,
        book: &mut OrderBook,
        week: u32,
    ) -> Event {
        match self.client.submit(&action) {
            Ok(receipt) => {
                if let Some(order) = order_id.and_then(|id| book.get_mut(id)) {
                    order.ledger.external_id = Some(receipt.external_ref.clone());
                }
                Event::LedgerSubmitted {
                    week,
                    action: action.kind().to_string(),
                    external_ref: receipt.external_ref,
                }
            }
            Err(_) => {
                let attempts = match order_id.and_then(|id| book.get_mut(id)) {
                    Some(order) => {
                        order.ledger.sync_attempts += 1;
                        order.ledger.sync_attempts
                    }
                    None => 1,
                };
                Event::LedgerSubmitFailed {
                    week,
                    action: action.kind().to_string(),
                    attempts,
                }
            }
        }
    }

    /// Apply an inbound confirmation event to the local book.
    ///
    /// Matching prefers the external reference; without one the oldest
    /// unconfirmed order of identical shape is chosen and an
    /// `AmbiguousLedgerMatch` is logged when more than one candidate shares
    /// that shape. An event that matches nothing at all is reported as a
    /// divergence rather than dropped.
    pub fn on_ledger_event(
        &mut self,
        event: &LedgerEvent,
        book: &mut OrderBook,
        local_week: u32,
    ) -> Vec<Event> {
        match event.kind {
            LedgerEventKind::WeekAdvanced | LedgerEventKind::InventoryUpdated => {
                // Informational; the simulation is authoritative for both.
                Vec::new()
            }
            LedgerEventKind::OrderPlaced
            | LedgerEventKind::OrderShipped
            | LedgerEventKind::OrderDelivered => self.apply_order_event(event, book, local_week),
        }
    }

    fn apply_order_event(
        &mut self,
        event: &LedgerEvent,
        book: &mut OrderBook,
        local_week: u32,
    ) -> Vec<Event> {
        let mut logged = Vec::new();

        let matched_id = match &event.external_ref {
            Some(external_ref) => book
                .find_by_external_ref(external_ref)
                .map(|o| o.id().to_string()),
            None => None,
        };

        let matched_id = match matched_id {
            Some(id) => Some(id),
            None => {
                // No foreign key: fall back to shape matching.
                let (sender, recipient, quantity) =
                    match (event.sender, event.recipient, event.quantity) {
                        (Some(s), Some(r), Some(q)) => (s, r, q),
                        _ => {
                            logged.push(Event::ReconciliationDivergence {
                                week: local_week,
                                detail: format!(
                                    "unmatched ledger event {:?}: no reference and incomplete shape",
                                    event.kind
                                ),
                            });
                            return logged;
                        }
                    };
                let (candidate, count) =
                    book.oldest_shape_match(event.week, sender, recipient, quantity);
                if count > 1 {
                    if let Some(id) = &candidate {
                        logged.push(Event::AmbiguousLedgerMatch {
                            week: local_week,
                            order_id: id.clone(),
                            candidates: count,
                        });
                    }
                }
                candidate
            }
        };

        let Some(order_id) = matched_id else {
            logged.push(Event::ReconciliationDivergence {
                week: local_week,
                detail: format!("ledger event {:?} matched no local order", event.kind),
            });
            return logged;
        };

        if let Some(order) = book.get_mut(&order_id) {
            order.ledger.confirmed = true;
            if order.ledger.external_id.is_none() {
                order.ledger.external_id = event.external_ref.clone();
            }
            // Forward-only transitions make duplicates no-ops.
            match event.kind {
                LedgerEventKind::OrderShipped => order.mark_shipped(event.week),
                LedgerEventKind::OrderDelivered => order.mark_delivered(event.week),
                _ => {}
            }
            logged.push(Event::LedgerEventMatched {
                week: local_week,
                order_id,
                kind: format!("{:?}", event.kind),
            });
        }

        logged
    }

    /// Pull the ledger's authoritative view of one order and fold any
    /// forward progress into the local book. Used by reconciliation.
    pub fn pull_order(
        &mut self,
        game_id: &str,
        order_id: &str,
        book: &mut OrderBook,
        local_week: u32,
    ) -> Option<Event> {
        let external_ref = book.get(order_id)?.ledger.external_id.clone()?;
        match self.client.fetch_order(game_id, &external_ref) {
            Ok(view) => {
                let order = book.get_mut(order_id)?;
                order.ledger.confirmed = true;
                match view.status {
                    LedgerOrderStatus::Placed => {}
                    LedgerOrderStatus::Shipped => order.mark_shipped(view.week),
                    LedgerOrderStatus::Delivered => order.mark_delivered(view.week),
                }
                Some(Event::LedgerEventMatched {
                    week: local_week,
                    order_id: order_id.to_string(),
                    kind: format!("Pull{:?}", view.status),
                })
            }
            Err(err) => Some(Event::ReconciliationDivergence {
                week: local_week,
                detail: format!("pull of order {} failed: {}", order_id, err),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::client::RecordingLedger;
    use crate::models::order::Order;
    use crate::models::role::{OrderParty, Role};

    fn book_with_order(qty: u32, week: u32) -> (OrderBook, String) {
        let mut book = OrderBook::new();
        let id = book.place(
            Order::new(OrderParty::Role(Role::Retailer), Role::Wholesaler, qty, week, 2).unwrap(),
        );
        (book, id)
    }

    fn placed_event(week: u32, qty: u32, external_ref: Option<&str>) -> LedgerEvent {
        LedgerEvent {
            kind: LedgerEventKind::OrderPlaced,
            game_id: "g".to_string(),
            week,
            sender: Some(OrderParty::Role(Role::Retailer)),
            recipient: Some(Role::Wholesaler),
            quantity: Some(qty),
            external_ref: external_ref.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_failed_submit_increments_attempts_and_keeps_local_state() {
        let mut ledger = RecordingLedger::new();
        ledger.set_failing(true);
        let mut sync = LedgerSync::new(Box::new(ledger));
        let (mut book, id) = book_with_order(4, 1);

        let action = LedgerAction::PlaceOrder {
            game_id: "g".to_string(),
            week: 1,
            sender: OrderParty::Role(Role::Retailer),
            recipient: Role::Wholesaler,
            quantity: 4,
            correlation_id: id.clone(),
        };
        let event = sync.submit(action, Some(&id), &mut book, 1);

        assert!(matches!(event, Event::LedgerSubmitFailed { attempts: 1, .. }));
        let order = book.get(&id).unwrap();
        assert_eq!(order.ledger.sync_attempts, 1);
        assert!(order.ledger.external_id.is_none());
        assert!(order.is_pending());
    }

    #[test]
    fn test_shape_match_confirms_and_adopts_reference() {
        let mut sync = LedgerSync::new(Box::new(RecordingLedger::new()));
        let (mut book, id) = book_with_order(4, 1);

        let events = sync.on_ledger_event(&placed_event(1, 4, Some("LGR-9")), &mut book, 1);
        assert!(events
            .iter()
            .any(|e| e.event_type() == "LedgerEventMatched"));

        let order = book.get(&id).unwrap();
        assert!(order.ledger.confirmed);
        assert_eq!(order.ledger.external_id.as_deref(), Some("LGR-9"));
    }

    #[test]
    fn test_duplicate_delivered_confirmation_is_a_no_op() {
        let mut sync = LedgerSync::new(Box::new(RecordingLedger::new()));
        let (mut book, id) = book_with_order(4, 1);

        let delivered = LedgerEvent {
            kind: LedgerEventKind::OrderDelivered,
            external_ref: None,
            ..placed_event(1, 4, None)
        };
        sync.on_ledger_event(&delivered, &mut book, 3);
        let after_first = book.get(&id).unwrap().clone();

        sync.on_ledger_event(&delivered, &mut book, 4);
        assert_eq!(book.get(&id).unwrap(), &after_first);
    }

    #[test]
    fn test_ambiguous_shape_is_flagged_and_resolved_fifo() {
        let mut sync = LedgerSync::new(Box::new(RecordingLedger::new()));
        let mut book = OrderBook::new();
        let first = book.place(
            Order::new(OrderParty::Role(Role::Retailer), Role::Wholesaler, 4, 1, 2).unwrap(),
        );
        let second = book.place(
            Order::new(OrderParty::Role(Role::Retailer), Role::Wholesaler, 4, 1, 2).unwrap(),
        );

        let events = sync.on_ledger_event(&placed_event(1, 4, None), &mut book, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::AmbiguousLedgerMatch { candidates: 2, .. })));
        assert!(book.get(&first).unwrap().ledger.confirmed);
        assert!(!book.get(&second).unwrap().ledger.confirmed);
    }

    #[test]
    fn test_unmatched_event_reports_divergence() {
        let mut sync = LedgerSync::new(Box::new(RecordingLedger::new()));
        let mut book = OrderBook::new();

        let events = sync.on_ledger_event(&placed_event(1, 4, None), &mut book, 1);
        assert!(events
            .iter()
            .any(|e| e.event_type() == "ReconciliationDivergence"));
    }
}
