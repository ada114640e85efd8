use crate::error::ConfigError;
use crate::models::{Formation, Position, GOALKEEPERS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Inclusive starter count bounds for one outfield position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PositionRange {
    pub min: u8,
    pub max: u8,
}

impl PositionRange {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(self, count: u8) -> bool {
        (self.min..=self.max).contains(&count)
    }
}

/// Which starting elevens count as legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FormationRules {
    /// Goalkeeper included.
    pub starters: u8,
    pub defenders: PositionRange,
    pub midfielders: PositionRange,
    pub forwards: PositionRange,
}

impl Default for FormationRules {
    fn default() -> Self {
        Self {
            starters: 11,
            defenders: PositionRange::new(3, 5),
            midfielders: PositionRange::new(3, 5),
            forwards: PositionRange::new(1, 3),
        }
    }
}

impl FormationRules {
    pub fn outfield_slots(&self) -> u8 {
        self.starters.saturating_sub(GOALKEEPERS)
    }

    pub fn range(&self, position: Position) -> PositionRange {
        match position {
            Position::Goalkeeper => PositionRange::new(GOALKEEPERS, GOALKEEPERS),
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
        }
    }

    pub fn is_legal(&self, formation: Formation) -> bool {
        formation.outfield() == self.outfield_slots()
            && Position::OUTFIELD
                .iter()
                .all(|&position| self.range(position).contains(formation.count(position)))
    }

    /// All legal shapes in preference order: most defenders first, then most midfielders.
    pub fn shapes(&self) -> Vec<Formation> {
        let outfield = self.outfield_slots() as i16;
        let mut shapes = Vec::new();

        for defenders in (self.defenders.min..=self.defenders.max).rev() {
            for midfielders in (self.midfielders.min..=self.midfielders.max).rev() {
                let forwards = outfield - defenders as i16 - midfielders as i16;
                if forwards < 0 || forwards > u8::MAX as i16 {
                    continue;
                }
                if self.forwards.contains(forwards as u8) {
                    shapes.push(Formation::new(defenders, midfielders, forwards as u8));
                }
            }
        }

        shapes
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for position in Position::OUTFIELD {
            let range = self.range(position);
            if range.min > range.max {
                return Err(ConfigError::EmptyRange { position, min: range.min, max: range.max });
            }
        }

        if self.starters <= GOALKEEPERS {
            return Err(ConfigError::NoOutfieldSlots { starters: self.starters });
        }

        let outfield = self.outfield_slots();
        let min_sum = self.defenders.min as u16 + self.midfielders.min as u16 + self.forwards.min as u16;
        let max_sum = self.defenders.max as u16 + self.midfielders.max as u16 + self.forwards.max as u16;
        if (outfield as u16) < min_sum || (outfield as u16) > max_sum {
            return Err(ConfigError::UnreachableOutfield {
                outfield,
                min_sum: min_sum.min(u8::MAX as u16) as u8,
                max_sum: max_sum.min(u8::MAX as u16) as u8,
            });
        }

        Ok(())
    }
}
