use super::formation::Formation;
use super::player::{ManagerId, Period, PlayerId, Position};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Points split by position (the dashboard's "points per position" breakdown).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PositionPoints {
    pub goalkeeper: i64,
    pub defenders: i64,
    pub midfielders: i64,
    pub forwards: i64,
}

impl PositionPoints {
    pub fn get(&self, position: Position) -> i64 {
        match position {
            Position::Goalkeeper => self.goalkeeper,
            Position::Defender => self.defenders,
            Position::Midfielder => self.midfielders,
            Position::Forward => self.forwards,
        }
    }

    pub fn add(&mut self, position: Position, points: i32) {
        let points = i64::from(points);
        match position {
            Position::Goalkeeper => self.goalkeeper += points,
            Position::Defender => self.defenders += points,
            Position::Midfielder => self.midfielders += points,
            Position::Forward => self.forwards += points,
        }
    }

    pub fn total(&self) -> i64 {
        self.goalkeeper + self.defenders + self.midfielders + self.forwards
    }
}

/// Maximum-points legal starting eleven for one roster snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OptimalResult {
    pub manager_id: ManagerId,
    pub period: Period,
    pub formation: Formation,
    pub total_points: i64,
    /// Pitch order: goalkeeper, defenders, midfielders, forwards; best first within each.
    pub starters: Vec<PlayerId>,
    /// Everyone left out, in squad slot order.
    pub bench: Vec<PlayerId>,
    pub points_by_position: PositionPoints,
}

impl OptimalResult {
    pub fn starter_set(&self) -> BTreeSet<PlayerId> {
        self.starters.iter().copied().collect()
    }

    pub fn is_starter(&self, id: PlayerId) -> bool {
        self.starters.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_points_accumulate() {
        let mut points = PositionPoints::default();
        points.add(Position::Defender, 6);
        points.add(Position::Defender, -1);
        points.add(Position::Forward, 13);
        assert_eq!(points.get(Position::Defender), 5);
        assert_eq!(points.get(Position::Goalkeeper), 0);
        assert_eq!(points.total(), 18);
    }
}
