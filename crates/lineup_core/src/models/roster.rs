//! RosterSnapshot: one manager's deduplicated squad for one period.

use super::player::{ManagerId, Period, PlayerId, PlayerRecord, Position};
use crate::error::RosterIssue;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Immutable squad for a single (manager, period) pair.
///
/// Players are unique by id and ordered by squad slot, then id. The only way to build one is
/// [`RosterSnapshot::build`], which reports every record it had to discard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct RosterSnapshot {
    manager_id: ManagerId,
    period: Period,
    players: Vec<PlayerRecord>,
}

/// A snapshot plus the non-fatal problems found while assembling it.
#[derive(Debug, Clone)]
pub struct RosterBuild {
    pub snapshot: RosterSnapshot,
    pub issues: Vec<RosterIssue>,
}

impl RosterSnapshot {
    pub fn build(
        manager_id: ManagerId,
        period: Period,
        records: impl IntoIterator<Item = PlayerRecord>,
    ) -> RosterBuild {
        let mut by_id: BTreeMap<PlayerId, PlayerRecord> = BTreeMap::new();
        let mut issues = Vec::new();

        for record in records {
            if record.manager_id != manager_id || record.period != period {
                warn!(
                    "Excluding player {} ({}/{}) from roster {}/{}",
                    record.id, record.manager_id, record.period, manager_id, period
                );
                issues.push(RosterIssue::ForeignRecord {
                    expected_manager: manager_id.clone(),
                    expected_period: period,
                    record,
                });
                continue;
            }

            match by_id.entry(record.id) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(mut slot) => {
                    let player_id = record.id;
                    let (kept, discarded) = if outranks(&record, slot.get()) {
                        let previous = slot.insert(record);
                        (slot.get().clone(), previous)
                    } else {
                        (slot.get().clone(), record)
                    };
                    let issue = RosterIssue::DuplicatePlayerRecord { player_id, kept, discarded };
                    warn!("Roster {}/{}: {}", manager_id, period, issue);
                    issues.push(issue);
                }
            }
        }

        let mut players: Vec<PlayerRecord> = by_id.into_values().collect();
        players.sort_by_key(|p| (p.squad_slot, p.id));

        RosterBuild { snapshot: RosterSnapshot { manager_id, period, players }, issues }
    }

    pub fn empty(manager_id: ManagerId, period: Period) -> Self {
        Self { manager_id, period, players: Vec::new() }
    }

    pub fn manager_id(&self) -> &ManagerId {
        &self.manager_id
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn by_position(&self, position: Position) -> impl Iterator<Item = &PlayerRecord> {
        self.players.iter().filter(move |p| p.position == position)
    }

    pub fn count(&self, position: Position) -> usize {
        self.by_position(position).count()
    }

    /// Ids in squad slots 1-11.
    pub fn declared_starters(&self) -> BTreeSet<PlayerId> {
        self.players.iter().filter(|p| p.is_declared_starter()).map(|p| p.id).collect()
    }
}

/// Duplicate resolution: more points wins, then the lower squad slot.
fn outranks(candidate: &PlayerRecord, current: &PlayerRecord) -> bool {
    candidate.points > current.points
        || (candidate.points == current.points && candidate.squad_slot < current.squad_slot)
}
