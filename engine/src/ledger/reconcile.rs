//! Periodic reconciliation between local state and the ledger.
//!
//! This is the failure-recovery path for dropped confirmations and failed
//! submissions. It pulls instead of waiting for pushes: orders stuck in
//! Pending past a staleness threshold are re-queried directly, failed
//! submissions are retried, and a week mismatch is recorded as divergence.
//! Divergence is detected, never prevented; the local state always wins for
//! gameplay.
//!
//! The pass is idempotent: running it twice against an unchanged ledger
//! repairs nothing new the second time.

use crate::ledger::client::LedgerAction;
use crate::ledger::sync::LedgerSync;
use crate::models::event::Event;
use crate::models::game::Game;
use crate::models::order::OrderBook;
use serde::{Deserialize, Serialize};

/// When the reconciliation job fires, in weeks of game time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileSchedule {
    pub start_week: u32,
    pub interval_weeks: u32,
}

impl ReconcileSchedule {
    pub fn should_run(&self, week: u32) -> bool {
        week >= self.start_week && (week - self.start_week) % self.interval_weeks.max(1) == 0
    }
}

impl Default for ReconcileSchedule {
    fn default() -> Self {
        Self {
            start_week: 2,
            interval_weeks: 2,
        }
    }
}

/// Tunables for a reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcilePolicy {
    /// An order still Pending this many weeks after placement gets pulled.
    pub staleness_weeks: u32,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self { staleness_weeks: 2 }
    }
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Pass skipped because another one was already in progress.
    pub skipped: bool,
    /// Stale orders whose ledger view was pulled.
    pub pulled: usize,
    /// Failed submissions retried (successfully or not).
    pub resubmitted: usize,
    /// Divergences recorded during the pass.
    pub divergences: usize,
}

/// Run one reconciliation pass over a game's order book.
///
/// Returns the report plus the events to log. The caller holds the per-game
/// in-progress guard; this function assumes it runs alone for its game.
pub fn run_pass(
    sync: &mut LedgerSync,
    game: &Game,
    book: &mut OrderBook,
    current_week: u32,
    policy: &ReconcilePolicy,
) -> (ReconcileReport, Vec<Event>) {
    let mut report = ReconcileReport::default();
    let mut events = Vec::new();

    // Week-level comparison against the ledger's authoritative read. The
    // ledger trails by at most the in-flight week; anything further apart is
    // a divergence worth recording.
    match sync.client_mut().fetch_week(game.id()) {
        Ok(ledger_week) => {
            let completed = current_week.saturating_sub(1);
            if ledger_week != completed && ledger_week + 1 != completed {
                report.divergences += 1;
                events.push(Event::ReconciliationDivergence {
                    week: current_week,
                    detail: format!(
                        "ledger at week {}, local completed week {}",
                        ledger_week, completed
                    ),
                });
            }
        }
        Err(err) => {
            report.divergences += 1;
            events.push(Event::ReconciliationDivergence {
                week: current_week,
                detail: format!("week fetch failed: {}", err),
            });
        }
    }

    let stale: Vec<(String, bool, u32)> = book
        .iter()
        .filter(|o| {
            o.is_pending() && o.placed_week() + policy.staleness_weeks <= current_week
        })
        .map(|o| (o.id().to_string(), o.ledger.external_id.is_some(), o.quantity()))
        .collect();

    for (order_id, has_ref, quantity) in stale {
        if has_ref {
            report.pulled += 1;
            if let Some(event) = sync.pull_order(game.id(), &order_id, book, current_week) {
                if event.event_type() == "ReconciliationDivergence" {
                    report.divergences += 1;
                }
                events.push(event);
            }
        } else {
            // The original submission never landed; retry it now.
            let (sender, recipient, week) = match book.get(&order_id) {
                Some(o) => (o.sender(), o.recipient(), o.placed_week()),
                None => continue,
            };
            report.resubmitted += 1;
            let action = LedgerAction::PlaceOrder {
                game_id: game.id().to_string(),
                week,
                sender,
                recipient,
                quantity,
                correlation_id: order_id.clone(),
            };
            let event = sync.submit(action, Some(&order_id), book, current_week);
            if event.event_type() == "LedgerSubmitFailed" {
                report.divergences += 1;
            }
            events.push(event);
        }
    }

    (report, events)
}
