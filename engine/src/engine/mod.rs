//! The weekly cycle engine and its supporting pieces.

pub mod checkpoint;
pub mod costs;
pub mod cycle;

pub use checkpoint::{config_hash, CheckpointError, EngineSnapshot, SNAPSHOT_FORMAT_VERSION};
pub use costs::{CostAccumulator, CostBreakdown, CostRates};
pub use cycle::{
    AutoplayConfig, Controller, ControllerConfig, GameConfig, GameEngine, GameError, WeekReport,
    DECISION_ROLES, PRODUCTION_LEAD_WEEKS,
};
