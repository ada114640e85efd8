pub mod formation;
pub mod lineup;
pub mod player;
pub mod roster;

#[cfg(test)]
pub mod proptest_gen;

pub use formation::{Formation, GOALKEEPERS};
pub use lineup::{OptimalResult, PositionPoints};
pub use player::{ManagerId, Period, PlayerId, PlayerRecord, Position, STARTER_SLOTS};
pub use roster::{RosterBuild, RosterSnapshot};
