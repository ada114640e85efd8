use super::player::Position;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every lineup fields exactly one goalkeeper.
pub const GOALKEEPERS: u8 = 1;

/// Outfield shape of a starting eleven, e.g. 4-4-2.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct Formation {
    pub defenders: u8,
    pub midfielders: u8,
    pub forwards: u8,
}

impl Formation {
    pub const fn new(defenders: u8, midfielders: u8, forwards: u8) -> Self {
        Self { defenders, midfielders, forwards }
    }

    /// Number of starters this shape fields at `position`.
    pub fn count(self, position: Position) -> u8 {
        match position {
            Position::Goalkeeper => GOALKEEPERS,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
        }
    }

    pub fn outfield(self) -> u8 {
        self.defenders + self.midfielders + self.forwards
    }

    pub fn starters(self) -> u8 {
        self.outfield() + GOALKEEPERS
    }
}

impl fmt::Display for Formation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.defenders, self.midfielders, self.forwards)
    }
}
