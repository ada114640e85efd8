//! Player records as supplied by the data-loading layer.
//!
//! 한 명의 선수 = 한 라운드(gameweek)의 한 매니저 스쿼드 안의 한 줄.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Squad slots `1..=STARTER_SLOTS` are the manager's declared starters, higher slots are bench.
pub const STARTER_SLOTS: u8 = 11;

/// Stable player identifier (element id in the source dataset).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Manager (fantasy team) identifier. Ordered lexicographically for tie-breaks.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct ManagerId(pub String);

impl ManagerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ManagerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Scoring round identifier.
pub type Period = u16;

/// Fantasy position. Closed set: anything else is rejected at deserialization time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Position {
    #[serde(rename = "GK", alias = "Goalkeeper", alias = "GKP")]
    Goalkeeper,
    #[serde(rename = "DEF", alias = "Defender")]
    Defender,
    #[serde(rename = "MID", alias = "Midfielder")]
    Midfielder,
    #[serde(rename = "FWD", alias = "Forward")]
    Forward,
}

impl Position {
    /// Pitch order: goalkeeper first, forwards last.
    pub const ALL: [Position; 4] =
        [Position::Goalkeeper, Position::Defender, Position::Midfielder, Position::Forward];

    pub const OUTFIELD: [Position; 3] =
        [Position::Defender, Position::Midfielder, Position::Forward];

    /// Short code used by the roster export and on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Position::Goalkeeper => "GK",
            Position::Defender => "DEF",
            Position::Midfielder => "MID",
            Position::Forward => "FWD",
        }
    }

    /// Plural noun used in shortfall messages.
    pub fn plural(self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeepers",
            Position::Defender => "defenders",
            Position::Midfielder => "midfielders",
            Position::Forward => "forwards",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Position::Goalkeeper => 0,
            Position::Defender => 1,
            Position::Midfielder => 2,
            Position::Forward => 3,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One player's line in one manager's squad for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PlayerRecord {
    pub id: PlayerId,
    /// Display only.
    #[serde(default)]
    pub name: String,
    pub position: Position,
    /// Points scored in the period. May be negative.
    pub points: i32,
    pub squad_slot: u8,
    pub period: Period,
    pub manager_id: ManagerId,
}

impl PlayerRecord {
    pub fn new(
        id: u32,
        position: Position,
        points: i32,
        squad_slot: u8,
        period: Period,
        manager_id: impl Into<String>,
    ) -> Self {
        Self {
            id: PlayerId(id),
            name: String::new(),
            position,
            points,
            squad_slot,
            period,
            manager_id: ManagerId(manager_id.into()),
        }
    }

    pub fn is_declared_starter(&self) -> bool {
        (1..=STARTER_SLOTS).contains(&self.squad_slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_codes_match_serde() {
        for position in Position::ALL {
            let json = serde_json::to_string(&position).unwrap();
            assert_eq!(json, format!("\"{}\"", position.code()));
        }
        let parsed: Position = serde_json::from_str("\"GKP\"").unwrap();
        assert_eq!(parsed, Position::Goalkeeper);
    }

    #[test]
    fn test_position_serde_rejects_unknown() {
        let parsed: Position = serde_json::from_str("\"MID\"").unwrap();
        assert_eq!(parsed, Position::Midfielder);
        let parsed: Position = serde_json::from_str("\"Forward\"").unwrap();
        assert_eq!(parsed, Position::Forward);
        assert!(serde_json::from_str::<Position>("\"WINGER\"").is_err());
    }

    #[test]
    fn test_declared_starter_slots() {
        let starter = PlayerRecord::new(1, Position::Defender, 2, 11, 1, "a");
        let bench = PlayerRecord::new(2, Position::Defender, 2, 12, 1, "a");
        let unslotted = PlayerRecord::new(3, Position::Defender, 2, 0, 1, "a");
        assert!(starter.is_declared_starter());
        assert!(!bench.is_declared_starter());
        assert!(!unslotted.is_declared_starter());
    }
}
