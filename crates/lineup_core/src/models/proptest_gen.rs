//! Property-based test generators and squad builders shared by the optimizer, season and league
//! tests.

use super::{ManagerId, Period, PlayerRecord, Position, RosterSnapshot};
use proptest::prelude::*;
use std::ops::RangeInclusive;

pub const TEST_MANAGER: &str = "Into the SpiderWirtz";

/// Builds a snapshot for [`TEST_MANAGER`]; ids and squad slots follow the slice order from 1.
pub fn roster_from(period: Period, players: &[(Position, i32)]) -> RosterSnapshot {
    roster_for(TEST_MANAGER, period, players)
}

pub fn roster_for(manager: &str, period: Period, players: &[(Position, i32)]) -> RosterSnapshot {
    RosterSnapshot::build(ManagerId::new(manager), period, records_for(manager, period, players))
        .snapshot
}

pub fn records_for(manager: &str, period: Period, players: &[(Position, i32)]) -> Vec<PlayerRecord> {
    players
        .iter()
        .enumerate()
        .map(|(i, &(position, points))| {
            PlayerRecord::new(i as u32 + 1, position, points, i as u8 + 1, period, manager)
        })
        .collect()
}

/// Standard 15-man squad: 2 GK, 5 DEF, 5 MID, 3 FWD, everyone on `points`.
pub fn flat_squad(points: i32) -> Vec<(Position, i32)> {
    let mut squad = vec![(Position::Goalkeeper, points); 2];
    squad.extend(vec![(Position::Defender, points); 5]);
    squad.extend(vec![(Position::Midfielder, points); 5]);
    squad.extend(vec![(Position::Forward, points); 3]);
    squad
}

pub fn points_strategy() -> impl Strategy<Value = i32> {
    -3i32..=24
}

/// Squads that can always field a legal eleven under the standard rules, in shuffled slot order.
pub fn squad_strategy() -> impl Strategy<Value = Vec<(Position, i32)>> {
    squad_with_points(-3..=24)
}

/// Low point spread, so ties between players and between shapes are common.
pub fn tied_squad_strategy() -> impl Strategy<Value = Vec<(Position, i32)>> {
    squad_with_points(0..=2)
}

fn squad_with_points(points: RangeInclusive<i32>) -> impl Strategy<Value = Vec<(Position, i32)>> {
    (1usize..=2, 3usize..=6, 3usize..=6, 1usize..=4)
        .prop_filter("outfield must fill ten slots", |&(_, d, m, f)| {
            d.min(5) + m.min(5) + f.min(3) >= 10
        })
        .prop_flat_map(move |(g, d, m, f)| {
            (
                prop::collection::vec(points.clone(), g),
                prop::collection::vec(points.clone(), d),
                prop::collection::vec(points.clone(), m),
                prop::collection::vec(points.clone(), f),
            )
                .prop_map(|(gk, def, mid, fwd)| {
                    let mut squad = Vec::new();
                    squad.extend(gk.into_iter().map(|p| (Position::Goalkeeper, p)));
                    squad.extend(def.into_iter().map(|p| (Position::Defender, p)));
                    squad.extend(mid.into_iter().map(|p| (Position::Midfielder, p)));
                    squad.extend(fwd.into_iter().map(|p| (Position::Forward, p)));
                    squad
                })
                .prop_shuffle()
        })
}

/// Squads that may or may not satisfy the position floors.
pub fn any_squad_strategy() -> impl Strategy<Value = Vec<(Position, i32)>> {
    prop::collection::vec(
        (
            prop_oneof![
                Just(Position::Goalkeeper),
                Just(Position::Defender),
                Just(Position::Midfielder),
                Just(Position::Forward),
            ],
            points_strategy(),
        ),
        0..=16,
    )
}
