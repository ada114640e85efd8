//! Flat player records -> per-manager, per-period league input.

use crate::error::RosterIssue;
use crate::league::LeagueEntry;
use crate::models::{ManagerId, Period, PlayerRecord, RosterSnapshot};
use crate::season::PeriodInput;
use std::collections::BTreeMap;
use tracing::debug;

/// Result of [`group_records`]: league entries in manager id order plus everything discarded.
#[derive(Debug, Clone, Default)]
pub struct RecordGrouping {
    pub entries: Vec<LeagueEntry>,
    pub issues: Vec<RosterIssue>,
}

/// Splits a flat record dump into one roster per (manager, period). Declared starters come
/// from squad slots 1-11; duplicate player records are resolved by
/// [`RosterSnapshot::build`] and reported in `issues`.
pub fn group_records(records: impl IntoIterator<Item = PlayerRecord>) -> RecordGrouping {
    let mut grouped: BTreeMap<ManagerId, BTreeMap<Period, Vec<PlayerRecord>>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.manager_id.clone())
            .or_default()
            .entry(record.period)
            .or_default()
            .push(record);
    }

    let mut grouping = RecordGrouping::default();
    for (manager_id, periods) in grouped {
        let mut inputs = Vec::with_capacity(periods.len());
        for (period, records) in periods {
            let build = RosterSnapshot::build(manager_id.clone(), period, records);
            grouping.issues.extend(build.issues);
            inputs.push(PeriodInput::from_squad_slots(build.snapshot));
        }
        debug!("Grouped {} periods for {}", inputs.len(), manager_id);
        grouping.entries.push(LeagueEntry::new(manager_id, inputs));
    }
    grouping
}
