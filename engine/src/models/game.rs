//! Game identity, lifecycle status, and the participant roster.

use crate::models::role::Role;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of a game. Setup → Active → Completed, forward-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Roles may still be assigned; no weeks have run.
    Setup,
    /// Weeks are advancing.
    Active,
    /// Max weeks reached; state is frozen and analytics are final.
    Completed,
}

/// Errors raised by roster operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("role {0} is already taken")]
    RoleTaken(Role),

    #[error("participant {0} is already assigned to a role")]
    ParticipantAssigned(String),
}

/// Mapping of participants to roles. Each role is assigned at most once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    assignments: Vec<(String, Role)>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a participant to a role.
    pub fn assign(&mut self, participant: &str, role: Role) -> Result<(), RosterError> {
        if self.assignments.iter().any(|(_, r)| *r == role) {
            return Err(RosterError::RoleTaken(role));
        }
        if self.assignments.iter().any(|(p, _)| p == participant) {
            return Err(RosterError::ParticipantAssigned(participant.to_string()));
        }
        self.assignments.push((participant.to_string(), role));
        Ok(())
    }

    pub fn participant_for(&self, role: Role) -> Option<&str> {
        self.assignments
            .iter()
            .find(|(_, r)| *r == role)
            .map(|(p, _)| p.as_str())
    }

    pub fn role_of(&self, participant: &str) -> Option<Role> {
        self.assignments
            .iter()
            .find(|(p, _)| p == participant)
            .map(|(_, r)| *r)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Role)> {
        self.assignments.iter().map(|(p, r)| (p.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// A single game instance.
///
/// History (`WeekState`) and orders reference the game by id rather than
/// being embedded, so the append-only history stays independently queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    id: String,
    pub status: GameStatus,
    /// The week currently being played (1-based).
    pub current_week: u32,
    pub roster: Roster,
    /// Reference to the on-ledger contract mirroring this game, if any.
    pub ledger_contract: Option<String>,
}

impl Game {
    pub fn new() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            status: GameStatus::Setup,
            current_week: 1,
            roster: Roster::new(),
            ledger_contract: None,
        }
    }

    /// Restore a game from snapshot fields.
    pub fn from_parts(
        id: String,
        status: GameStatus,
        current_week: u32,
        roster: Roster,
        ledger_contract: Option<String>,
    ) -> Self {
        Self {
            id,
            status,
            current_week,
            roster,
            ledger_contract,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
