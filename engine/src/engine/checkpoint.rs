//! Engine snapshots for persistence and restore.
//!
//! A snapshot is a plain serde value holding the complete engine state, so
//! an external store can append it without knowing anything about the
//! simulation. Restoring validates a SHA-256 hash of the configuration the
//! snapshot was taken under: resuming a game under a different configuration
//! would silently change its semantics, so it is rejected instead.
//!
//! Ledger clients and notification sinks are process-local and are not part
//! of a snapshot; callers re-attach them after restore.

use crate::engine::costs::CostAccumulator;
use crate::engine::cycle::{GameConfig, GameEngine};
use crate::models::event::EventLog;
use crate::models::game::{Game, GameStatus, Roster};
use crate::models::order::OrderBook;
use crate::models::pipeline::Pipeline;
use crate::models::role::RoleMap;
use crate::models::week::{PendingAction, RoleWeekRecord, WeekState};
use crate::rng::SeededRng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Snapshot format version, bumped on incompatible layout changes.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Errors raised while taking or restoring snapshots.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("snapshot format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("configuration hash mismatch: snapshot {snapshot}, provided {provided}")]
    ConfigHashMismatch { snapshot: String, provided: String },

    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
}

/// Complete serializable engine state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub format_version: u32,
    pub config: GameConfig,
    /// SHA-256 over the canonical JSON form of `config`.
    pub config_hash: String,
    pub game_id: String,
    pub status: GameStatus,
    pub current_week: u32,
    pub roster: Roster,
    pub ledger_contract: Option<String>,
    pub rng_state: u64,
    pub demand_schedule: Vec<u32>,
    pub roles: RoleMap<RoleWeekRecord>,
    pub order_pipes: RoleMap<Pipeline>,
    pub shipment_pipes: RoleMap<Pipeline>,
    pub production_pipe: Pipeline,
    pub orders: OrderBook,
    pub costs: RoleMap<CostAccumulator>,
    pub history: Vec<WeekState>,
    pub pending: Vec<PendingAction>,
    pub event_log: EventLog,
}

/// Hash a configuration into the snapshot fingerprint.
pub fn config_hash(config: &GameConfig) -> Result<String, CheckpointError> {
    let canonical = serde_json::to_vec(config)?;
    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

impl EngineSnapshot {
    pub fn to_json(&self) -> Result<String, CheckpointError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Structural sanity checks, run before restore.
    fn validate(&self) -> Result<(), CheckpointError> {
        if self.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        if self.current_week == 0 {
            return Err(CheckpointError::Corrupt("current week is zero".to_string()));
        }
        for (i, week) in self.history.iter().enumerate() {
            if week.week != i as u32 + 1 {
                return Err(CheckpointError::Corrupt(format!(
                    "history week {} found at position {}",
                    week.week, i
                )));
            }
        }
        match self.status {
            GameStatus::Active => {
                if self.history.len() as u32 + 1 != self.current_week {
                    return Err(CheckpointError::Corrupt(format!(
                        "active game at week {} with {} history entries",
                        self.current_week,
                        self.history.len()
                    )));
                }
            }
            GameStatus::Completed => {
                if self.history.len() as u32 != self.current_week {
                    return Err(CheckpointError::Corrupt(
                        "completed game history does not reach its final week".to_string(),
                    ));
                }
            }
            GameStatus::Setup => {
                if !self.history.is_empty() {
                    return Err(CheckpointError::Corrupt(
                        "setup game with history".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl GameEngine {
    /// Capture the complete engine state.
    pub fn snapshot(&self) -> Result<EngineSnapshot, CheckpointError> {
        Ok(EngineSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            config_hash: config_hash(&self.config)?,
            config: self.config.clone(),
            game_id: self.game.id().to_string(),
            status: self.game.status,
            current_week: self.game.current_week,
            roster: self.game.roster.clone(),
            ledger_contract: self.game.ledger_contract.clone(),
            rng_state: self.rng.state(),
            demand_schedule: self.demand_schedule.clone(),
            roles: self.roles.clone(),
            order_pipes: self.order_pipes.clone(),
            shipment_pipes: self.shipment_pipes.clone(),
            production_pipe: self.production_pipe.clone(),
            orders: self.orders.clone(),
            costs: self.costs.clone(),
            history: self.history.clone(),
            pending: self.pending.clone(),
            event_log: self.event_log.clone(),
        })
    }

    /// Rebuild an engine from a snapshot taken under `expected_config`.
    ///
    /// The configuration hash must match; ledger client and notification
    /// sink are not restored and may be re-attached afterwards.
    pub fn from_snapshot(
        snapshot: EngineSnapshot,
        expected_config: &GameConfig,
    ) -> Result<Self, CheckpointError> {
        snapshot.validate()?;
        let provided = config_hash(expected_config)?;
        if provided != snapshot.config_hash {
            return Err(CheckpointError::ConfigHashMismatch {
                snapshot: snapshot.config_hash,
                provided,
            });
        }

        Ok(GameEngine {
            game: Game::from_parts(
                snapshot.game_id,
                snapshot.status,
                snapshot.current_week,
                snapshot.roster,
                snapshot.ledger_contract,
            ),
            config: snapshot.config,
            demand_schedule: snapshot.demand_schedule,
            rng: SeededRng::from_state(snapshot.rng_state),
            roles: snapshot.roles,
            order_pipes: snapshot.order_pipes,
            shipment_pipes: snapshot.shipment_pipes,
            production_pipe: snapshot.production_pipe,
            orders: snapshot.orders,
            costs: snapshot.costs,
            history: snapshot.history,
            pending: snapshot.pending,
            event_log: snapshot.event_log,
            sink: None,
            ledger: None,
            reconcile_in_progress: false,
        })
    }
}
