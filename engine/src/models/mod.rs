//! Domain models for the supply chain game.

pub mod event;
pub mod game;
pub mod order;
pub mod pipeline;
pub mod role;
pub mod week;

// Re-exports
pub use event::{Event, EventLog, NotificationSink};
pub use game::{Game, GameStatus, Roster, RosterError};
pub use order::{Order, OrderBook, OrderError, OrderStatus};
pub use pipeline::{Pipeline, PipelineError};
pub use role::{validate_order_flow, InvalidFlow, OrderParty, Role, RoleMap};
pub use week::{
    all_actions_complete, incomplete_roles, ActionKind, PendingAction, RoleWeekRecord, WeekState,
};
