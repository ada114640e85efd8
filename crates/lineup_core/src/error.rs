use crate::models::{Formation, ManagerId, Period, PlayerId, PlayerRecord, Position};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Which requirement a roster failed to meet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "position", rename_all = "snake_case")]
pub enum Requirement {
    Position(Position),
    TotalPlayers,
    /// Enough outfield players in total, but not enough that fit the per-position maxima.
    OutfieldPlayers,
}

/// A single unmet roster requirement, e.g. "only 2 defenders available, need ≥3".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Shortfall {
    pub requirement: Requirement,
    pub available: usize,
    pub needed: usize,
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.requirement {
            Requirement::Position(position) => write!(
                f,
                "only {} {} available, need ≥{}",
                self.available,
                position.plural(),
                self.needed
            ),
            Requirement::TotalPlayers => {
                write!(f, "only {} players available, need ≥{}", self.available, self.needed)
            }
            Requirement::OutfieldPlayers => write!(
                f,
                "only {} outfield players fit a legal formation, need {}",
                self.available, self.needed
            ),
        }
    }
}

fn join_shortfalls(shortfalls: &[Shortfall]) -> String {
    shortfalls.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

#[derive(Error, Debug)]
pub enum LineupError {
    #[error("Empty roster: manager {manager_id} has no players in period {period}")]
    EmptyRoster { manager_id: ManagerId, period: Period },

    #[error(
        "Insufficient roster for manager {} in period {}: {}",
        .manager_id, .period, join_shortfalls(.shortfalls)
    )]
    InsufficientRoster { manager_id: ManagerId, period: Period, shortfalls: Vec<Shortfall> },

    #[error("Period {period} roster belongs to manager {found}, expected {expected}")]
    ManagerMismatch { expected: ManagerId, found: ManagerId, period: Period },

    #[error("Lineup sweep cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schema version mismatch: found {found}, expected {expected}")]
    SchemaVersion { found: u8, expected: u8 },
}

impl LineupError {
    /// Errors that only invalidate a single period. Season and league sweeps record these
    /// instead of propagating them.
    pub fn is_period_local(&self) -> bool {
        matches!(self, LineupError::EmptyRoster { .. } | LineupError::InsufficientRoster { .. })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{position} range is empty: min {min} > max {max}")]
    EmptyRange { position: Position, min: u8, max: u8 },

    #[error("A {starters}-player lineup leaves no outfield slots")]
    NoOutfieldSlots { starters: u8 },

    #[error("Outfield slots {outfield} unreachable: position minima sum to {min_sum}, maxima to {max_sum}")]
    UnreachableOutfield { outfield: u8, min_sum: u8, max_sum: u8 },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Non-fatal data problems found while assembling a roster snapshot.
#[derive(Error, Debug, Clone, PartialEq, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RosterIssue {
    #[error(
        "Duplicate record for player {}: kept {} pts (slot {}), discarded {} pts (slot {})",
        .player_id, .kept.points, .kept.squad_slot, .discarded.points, .discarded.squad_slot
    )]
    DuplicatePlayerRecord { player_id: PlayerId, kept: PlayerRecord, discarded: PlayerRecord },

    #[error(
        "Record for player {} belongs to {}/{}, not {}/{}",
        .record.id, .record.manager_id, .record.period, .expected_manager, .expected_period
    )]
    ForeignRecord { expected_manager: ManagerId, expected_period: Period, record: PlayerRecord },
}

/// Why a declared starting eleven is not a legal lineup. Reported as a flag, never an error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeclaredLineupIssue {
    #[error("Declared {found} starters, expected {expected}")]
    WrongStarterCount { found: usize, expected: usize },

    #[error("Declared starter {player_id} is not in the roster")]
    UnknownPlayer { player_id: PlayerId },

    #[error("Declared {found} goalkeepers, expected {expected}")]
    GoalkeeperCount { found: usize, expected: usize },

    #[error("Declared shape {formation} is not a legal formation")]
    IllegalShape { formation: Formation },
}

pub type Result<T> = std::result::Result<T, LineupError>;
