//! Beer Game Simulator Core - Rust Engine
//!
//! Turn-based supply chain simulation with deterministic execution and
//! optional ledger mirroring.
//!
//! # Architecture
//!
//! - **models**: Domain types (Role, Order, Pipeline, Game, WeekState, Event)
//! - **demand**: Customer demand schedule generation
//! - **engine**: Weekly cycle engine, cost accrual, checkpoints
//! - **policy**: Ordering policies for computer-controlled roles
//! - **ledger**: Dual-write mirroring and reconciliation against an
//!   external ledger
//! - **analytics**: Bullwhip metrics over per-week history
//! - **rng**: Deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. All quantities are u32; shortfalls become backlog, never negative stock
//! 2. Costs are cumulative and strictly non-decreasing
//! 3. All randomness is deterministic (seeded RNG)
//! 4. The simulation is authoritative; ledger failures never block gameplay

// Module declarations
pub mod analytics;
pub mod demand;
pub mod engine;
pub mod ledger;
pub mod models;
pub mod policy;
pub mod rng;

// Re-exports for convenience
pub use analytics::{analyze, AnalyticsReport, RoleSummary};
pub use demand::{build_schedule, DemandError, DemandPattern};
pub use engine::{
    AutoplayConfig, CheckpointError, Controller, ControllerConfig, CostAccumulator,
    CostBreakdown, CostRates, EngineSnapshot, GameConfig, GameEngine, GameError, WeekReport,
};
pub use ledger::{
    LedgerAction, LedgerClient, LedgerError, LedgerEvent, LedgerEventKind, LedgerOrderStatus,
    LedgerOrderView, LedgerReceipt, LedgerSync, ReconcilePolicy, ReconcileReport,
    ReconcileSchedule, RecordingLedger,
};
pub use models::{
    event::{Event, EventLog, NotificationSink},
    game::{Game, GameStatus, Roster, RosterError},
    order::{Order, OrderBook, OrderError, OrderStatus},
    pipeline::{Pipeline, PipelineError},
    role::{OrderParty, Role, RoleMap},
    week::{PendingAction, RoleWeekRecord, WeekState},
};
pub use policy::{BaseStockPolicy, OrderPolicy, PolicyInputs, Visibility};
pub use rng::SeededRng;
