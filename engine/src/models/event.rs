//! Domain event log.
//!
//! Every significant state change is recorded as a structured `Event`. The
//! log is the audit trail of a game and the feed for any external push layer:
//! a `NotificationSink` attached to the engine receives each event as it is
//! logged, and the core neither knows nor cares whether anyone is listening.

use crate::models::role::{OrderParty, Role};
use serde::{Deserialize, Serialize};

/// A state change worth auditing, in the order it occurred.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// A week finished simulating.
    WeekAdvanced { week: u32, total_cost: f64 },

    /// An order entered the book.
    OrderPlaced {
        week: u32,
        order_id: String,
        sender: OrderParty,
        recipient: Role,
        quantity: u32,
    },

    /// An order was fully shipped by its recipient.
    OrderShipped {
        week: u32,
        order_id: String,
        quantity: u32,
    },

    /// Shipped goods arrived at the ordering party.
    OrderDelivered { week: u32, order_id: String },

    /// The game reached its configured final week.
    GameCompleted { week: u32, total_cost: f64 },

    /// A mutation was mirrored to the ledger successfully.
    LedgerSubmitted {
        week: u32,
        action: String,
        external_ref: String,
    },

    /// A ledger submission failed; the local write stands and the
    /// reconciliation job will retry.
    LedgerSubmitFailed {
        week: u32,
        action: String,
        attempts: u32,
    },

    /// An inbound ledger event was matched to a local order.
    LedgerEventMatched {
        week: u32,
        order_id: String,
        kind: String,
    },

    /// Multiple unconfirmed orders shared the shape of an inbound ledger
    /// event; the oldest was chosen. Logged rather than silently dropped.
    AmbiguousLedgerMatch {
        week: u32,
        order_id: String,
        candidates: usize,
    },

    /// Local and ledger state disagree, or the ledger was unreachable.
    ReconciliationDivergence { week: u32, detail: String },

    /// An internal arithmetic invariant was violated and clamped. A bug
    /// signal, never silent.
    InvariantClamped {
        week: u32,
        role: Role,
        detail: String,
    },
}

impl Event {
    /// Week the event occurred in.
    pub fn week(&self) -> u32 {
        match self {
            Event::WeekAdvanced { week, .. } => *week,
            Event::OrderPlaced { week, .. } => *week,
            Event::OrderShipped { week, .. } => *week,
            Event::OrderDelivered { week, .. } => *week,
            Event::GameCompleted { week, .. } => *week,
            Event::LedgerSubmitted { week, .. } => *week,
            Event::LedgerSubmitFailed { week, .. } => *week,
            Event::LedgerEventMatched { week, .. } => *week,
            Event::AmbiguousLedgerMatch { week, .. } => *week,
            Event::ReconciliationDivergence { week, .. } => *week,
            Event::InvariantClamped { week, .. } => *week,
        }
    }

    /// Short type tag for filtering.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::WeekAdvanced { .. } => "WeekAdvanced",
            Event::OrderPlaced { .. } => "OrderPlaced",
            Event::OrderShipped { .. } => "OrderShipped",
            Event::OrderDelivered { .. } => "OrderDelivered",
            Event::GameCompleted { .. } => "GameCompleted",
            Event::LedgerSubmitted { .. } => "LedgerSubmitted",
            Event::LedgerSubmitFailed { .. } => "LedgerSubmitFailed",
            Event::LedgerEventMatched { .. } => "LedgerEventMatched",
            Event::AmbiguousLedgerMatch { .. } => "AmbiguousLedgerMatch",
            Event::ReconciliationDivergence { .. } => "ReconciliationDivergence",
            Event::InvariantClamped { .. } => "InvariantClamped",
        }
    }
}

/// Receiver for domain events. The push/notification boundary: the engine
/// calls `deliver` once per logged event, and a failing or absent sink never
/// affects game state.
pub trait NotificationSink {
    fn deliver(&mut self, event: &Event);
}

/// Ordered in-memory event log with query helpers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Events carrying the given type tag, in log order.
    pub fn of_type<'a>(&'a self, event_type: &'a str) -> impl Iterator<Item = &'a Event> {
        self.events
            .iter()
            .filter(move |e| e.event_type() == event_type)
    }

    pub fn count_of_type(&self, event_type: &str) -> usize {
        self.of_type(event_type).count()
    }
}
