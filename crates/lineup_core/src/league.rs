//! LeagueAggregator: 리그 전체 매니저별 시즌 합계 + 순위표
//!
//! Managers are independent, so the sweep fans out over the rayon pool and only the final
//! ranking imposes an order.

use crate::cancel::CancellationToken;
use crate::config::{LineupConfig, ParallelConfig};
use crate::error::{LineupError, Result};
use crate::models::ManagerId;
use crate::season::{gain_pct, PeriodAggregator, PeriodInput, PeriodSummary, SeasonSummary};
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Everything the league sweep needs for one manager.
#[derive(Debug, Clone)]
pub struct LeagueEntry {
    pub manager_id: ManagerId,
    pub periods: Vec<PeriodInput>,
}

impl LeagueEntry {
    pub fn new(manager_id: ManagerId, periods: Vec<PeriodInput>) -> Self {
        Self { manager_id, periods }
    }
}

/// One row of the league table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ManagerStanding {
    /// 1-based, by actual points descending then manager id.
    pub rank: usize,
    pub manager_id: ManagerId,
    pub actual_points: i64,
    pub optimal_points: i64,
    pub gain: i64,
    pub gain_pct: f64,
    pub available_periods: usize,
    pub unavailable_periods: usize,
    pub invalid_declared_periods: usize,
    /// No available period: the zeros above are placeholders, not scores.
    pub insufficient_data: bool,
    /// Set when the manager's season could not be evaluated at all.
    pub error: Option<String>,
    pub periods: Vec<PeriodSummary>,
}

impl ManagerStanding {
    fn from_season(season: SeasonSummary) -> Self {
        let totals = season.totals;
        Self {
            rank: 0,
            manager_id: season.manager_id,
            actual_points: totals.actual_points,
            optimal_points: totals.optimal_points,
            gain: totals.gain,
            gain_pct: totals.gain_pct,
            available_periods: totals.available_periods,
            unavailable_periods: totals.unavailable_periods,
            invalid_declared_periods: totals.invalid_declared_periods,
            insufficient_data: totals.available_periods == 0,
            error: None,
            periods: season.periods,
        }
    }

    fn failed(manager_id: ManagerId, error: &LineupError) -> Self {
        Self {
            rank: 0,
            manager_id,
            actual_points: 0,
            optimal_points: 0,
            gain: 0,
            gain_pct: 0.0,
            available_periods: 0,
            unavailable_periods: 0,
            invalid_declared_periods: 0,
            insufficient_data: true,
            error: Some(error.to_string()),
            periods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LeagueSummary {
    pub standings: Vec<ManagerStanding>,
    pub total_actual_points: i64,
    pub total_optimal_points: i64,
    pub total_gain: i64,
    pub total_gain_pct: f64,
}

impl LeagueSummary {
    fn from_standings(mut standings: Vec<ManagerStanding>) -> Self {
        standings.sort_by(|a, b| {
            Reverse(a.actual_points)
                .cmp(&Reverse(b.actual_points))
                .then_with(|| a.manager_id.cmp(&b.manager_id))
        });
        for (index, standing) in standings.iter_mut().enumerate() {
            standing.rank = index + 1;
        }

        let total_actual_points = standings.iter().map(|s| s.actual_points).sum();
        let total_optimal_points = standings.iter().map(|s| s.optimal_points).sum();
        let total_gain = total_optimal_points - total_actual_points;

        Self {
            standings,
            total_actual_points,
            total_optimal_points,
            total_gain,
            total_gain_pct: gain_pct(total_gain, total_actual_points),
        }
    }

    pub fn standing(&self, manager_id: &ManagerId) -> Option<&ManagerStanding> {
        self.standings.iter().find(|s| &s.manager_id == manager_id)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LeagueAggregator {
    periods: PeriodAggregator,
    parallel: ParallelConfig,
}

impl LeagueAggregator {
    pub fn new(config: &LineupConfig) -> Result<Self> {
        Ok(Self { periods: PeriodAggregator::new(config)?, parallel: config.parallel })
    }

    /// One row per distinct manager; entries sharing a manager id are combined first.
    pub fn league_summary(&self, entries: &[LeagueEntry]) -> LeagueSummary {
        let token = CancellationToken::new();
        LeagueSummary::from_standings(self.standings(entries, &token, &|_: &ManagerStanding| {}))
    }

    /// Like [`league_summary`](Self::league_summary), but gives up between managers and
    /// between periods once `token` is cancelled.
    pub fn league_summary_cancellable(
        &self,
        entries: &[LeagueEntry],
        token: &CancellationToken,
    ) -> Result<LeagueSummary> {
        self.league_summary_observed(entries, token, &|_: &ManagerStanding| {})
    }

    /// Cancellable sweep that calls `on_manager` with each standing as soon as it is
    /// computed. Ranks are not assigned yet at that point.
    pub fn league_summary_observed(
        &self,
        entries: &[LeagueEntry],
        token: &CancellationToken,
        on_manager: &(dyn Fn(&ManagerStanding) + Sync),
    ) -> Result<LeagueSummary> {
        let standings = self.standings(entries, token, on_manager);
        token.check()?;
        Ok(LeagueSummary::from_standings(standings))
    }

    fn standings(
        &self,
        entries: &[LeagueEntry],
        token: &CancellationToken,
        on_manager: &(dyn Fn(&ManagerStanding) + Sync),
    ) -> Vec<ManagerStanding> {
        let entries = combine_entries(entries);
        info!("Evaluating league of {} managers", entries.len());

        let evaluate = |entry: &Cow<'_, LeagueEntry>| -> Option<ManagerStanding> {
            if token.is_cancelled() {
                return None;
            }
            let standing = match self.periods.season_summary_cancellable(
                &entry.manager_id,
                &entry.periods,
                token,
            ) {
                Ok(season) => ManagerStanding::from_season(season),
                Err(LineupError::Cancelled) => return None,
                Err(err) => {
                    warn!("Season for {} could not be evaluated: {}", entry.manager_id, err);
                    ManagerStanding::failed(entry.manager_id.clone(), &err)
                }
            };
            on_manager(&standing);
            Some(standing)
        };

        let standings: Vec<ManagerStanding> = if self.parallel.enabled {
            entries.par_iter().filter_map(evaluate).collect()
        } else {
            entries.iter().filter_map(evaluate).collect()
        };

        info!(
            "League sweep finished: {} of {} managers evaluated",
            standings.len(),
            entries.len()
        );
        standings
    }
}

/// Entries in manager id order, one per manager. Repeated managers get their periods
/// concatenated; repeated periods are then merged by the season sweep.
fn combine_entries(entries: &[LeagueEntry]) -> Vec<Cow<'_, LeagueEntry>> {
    let mut by_manager: BTreeMap<&ManagerId, Vec<&LeagueEntry>> = BTreeMap::new();
    for entry in entries {
        by_manager.entry(&entry.manager_id).or_default().push(entry);
    }

    by_manager
        .into_iter()
        .map(|(manager_id, group)| match group.as_slice() {
            [single] => Cow::Borrowed(*single),
            _ => {
                warn!("Combining {} league entries for {}", group.len(), manager_id);
                let periods = group.iter().flat_map(|entry| entry.periods.iter().cloned()).collect();
                Cow::Owned(LeagueEntry::new(manager_id.clone(), periods))
            }
        })
        .collect()
}

/// [`LeagueAggregator::league_summary`] under the standard configuration.
pub fn league_summary(entries: &[LeagueEntry]) -> LeagueSummary {
    LeagueAggregator::default().league_summary(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proptest_gen::*;
    use crate::models::Position::{
        Defender as DEF, Forward as FWD, Goalkeeper as GK, Midfielder as MID,
    };
    use crate::models::{Position, RosterSnapshot};
    use crate::season::season_summary;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(manager: &str, seasons: &[(u16, Vec<(Position, i32)>)]) -> LeagueEntry {
        let periods = seasons
            .iter()
            .map(|(period, squad)| {
                PeriodInput::from_squad_slots(roster_for(manager, *period, squad))
            })
            .collect();
        LeagueEntry::new(ManagerId::new(manager), periods)
    }

    /// 15-man squad whose declared eleven is the optimum except for one benched forward.
    fn squad(bench_striker: i32) -> Vec<(Position, i32)> {
        vec![
            (GK, 6),
            (DEF, 6),
            (DEF, 5),
            (DEF, 4),
            (DEF, 4),
            (MID, 8),
            (MID, 7),
            (MID, 5),
            (MID, 5),
            (MID, 5),
            (FWD, 2),
            (FWD, bench_striker),
            (GK, 0),
            (DEF, 0),
            (FWD, 0),
        ]
    }

    #[test]
    fn test_ranking_and_totals() {
        let entries = vec![
            entry("Magic FC", &[(1, squad(2)), (2, squad(9))]),
            entry("Blue Lock XI", &[(1, squad(12)), (2, squad(2))]),
            entry("Into the SpiderWirtz", &[(1, flat_squad(5)), (2, flat_squad(6))]),
        ];

        let summary = league_summary(&entries);
        let order: Vec<&str> = summary.standings.iter().map(|s| s.manager_id.as_str()).collect();
        // flat squads declare two keepers but still score 55 + 66
        assert_eq!(order, vec!["Into the SpiderWirtz", "Blue Lock XI", "Magic FC"]);
        assert_eq!(summary.standings[0].rank, 1);
        assert_eq!(summary.standings[2].rank, 3);

        let magic = summary.standing(&ManagerId::new("Magic FC")).unwrap();
        assert_eq!(magic.actual_points, 114);
        assert_eq!(magic.gain, 7);
        assert_eq!(magic.available_periods, 2);
        assert!(!magic.insufficient_data);

        let blue_lock = summary.standing(&ManagerId::new("Blue Lock XI")).unwrap();
        assert_eq!(blue_lock.gain, 10);
        assert_eq!(summary.total_gain, summary.total_optimal_points - summary.total_actual_points);

        let spider = summary.standing(&ManagerId::new("Into the SpiderWirtz")).unwrap();
        assert_eq!(spider.invalid_declared_periods, 2);
    }

    #[test]
    fn test_ties_break_on_manager_id() {
        let entries = vec![
            entry("Zeta", &[(1, squad(2))]),
            entry("Alpha", &[(1, squad(2))]),
            entry("Mid", &[(1, squad(2))]),
        ];
        let summary = league_summary(&entries);
        let order: Vec<&str> = summary.standings.iter().map(|s| s.manager_id.as_str()).collect();
        assert_eq!(order, vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_manager_without_data_is_listed() {
        let entries = vec![
            entry("Magic FC", &[(1, squad(2))]),
            LeagueEntry::new(
                ManagerId::new("Ghost Town"),
                vec![PeriodInput::from_squad_slots(RosterSnapshot::empty(
                    ManagerId::new("Ghost Town"),
                    1,
                ))],
            ),
            LeagueEntry::new(ManagerId::new("No Periods"), Vec::new()),
        ];

        let summary = league_summary(&entries);
        assert_eq!(summary.standings.len(), 3);

        let ghost = summary.standing(&ManagerId::new("Ghost Town")).unwrap();
        assert!(ghost.insufficient_data);
        assert_eq!(ghost.actual_points, 0);
        assert_eq!(ghost.unavailable_periods, 1);
        assert!(ghost.error.is_none());

        let empty = summary.standing(&ManagerId::new("No Periods")).unwrap();
        assert!(empty.insufficient_data);
        assert_eq!(empty.available_periods, 0);
    }

    #[test]
    fn test_failed_manager_is_recorded() {
        let stray = PeriodInput::from_squad_slots(roster_for("Magic FC", 1, &squad(2)));
        let entries = vec![
            entry("Magic FC", &[(1, squad(2))]),
            LeagueEntry::new(ManagerId::new("Blue Lock XI"), vec![stray]),
        ];

        let summary = league_summary(&entries);
        let blue_lock = summary.standing(&ManagerId::new("Blue Lock XI")).unwrap();
        assert!(blue_lock.insufficient_data);
        assert!(blue_lock.error.as_deref().unwrap_or_default().contains("Magic FC"));
        assert_eq!(summary.total_actual_points, 57);
    }

    #[test]
    fn test_cancelled_sweep() {
        let entries = vec![entry("Magic FC", &[(1, squad(2))])];
        let token = CancellationToken::new();
        token.cancel();

        let result = LeagueAggregator::default().league_summary_cancellable(&entries, &token);
        assert!(matches!(result, Err(LineupError::Cancelled)));

        let fresh = CancellationToken::new();
        let summary =
            LeagueAggregator::default().league_summary_cancellable(&entries, &fresh).unwrap();
        assert_eq!(summary.standings.len(), 1);
    }

    #[test]
    fn test_cancel_between_managers() {
        let entries = vec![
            entry("Alpha", &[(1, squad(2))]),
            entry("Beta", &[(1, squad(3))]),
            entry("Gamma", &[(1, squad(4))]),
        ];
        let aggregator = LeagueAggregator::new(&LineupConfig::sequential()).unwrap();
        let token = CancellationToken::new();
        let finished = AtomicUsize::new(0);

        let stop_after_first = |standing: &ManagerStanding| {
            finished.fetch_add(1, Ordering::SeqCst);
            assert_eq!(standing.manager_id.as_str(), "Alpha");
            token.cancel();
        };
        let result = aggregator.league_summary_observed(&entries, &token, &stop_after_first);

        assert!(matches!(result, Err(LineupError::Cancelled)));
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_manager_counted_once() {
        let entries = vec![
            entry("Magic FC", &[(1, flat_squad(2))]),
            entry("Magic FC", &[(1, flat_squad(2))]),
        ];
        let summary = league_summary(&entries);
        assert_eq!(summary.standings.len(), 1);
        assert_eq!(summary.standings[0].actual_points, 22);
        assert_eq!(summary.standings[0].available_periods, 1);
        assert_eq!(summary.total_actual_points, 22);

        let split = vec![
            entry("Magic FC", &[(1, flat_squad(2))]),
            entry("Blue Lock XI", &[(1, flat_squad(1))]),
            entry("Magic FC", &[(2, flat_squad(3))]),
        ];
        let summary = league_summary(&split);
        assert_eq!(summary.standings.len(), 2);
        let magic = summary.standing(&ManagerId::new("Magic FC")).unwrap();
        assert_eq!(magic.available_periods, 2);
        assert_eq!(magic.actual_points, 55);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let entries: Vec<LeagueEntry> = (0..12)
            .map(|i| {
                let name = format!("Manager {:02}", i);
                entry(&name, &[(1, squad(i)), (2, squad(12 - i)), (3, flat_squad(i % 3))])
            })
            .collect();

        let parallel = league_summary(&entries);
        let sequential =
            LeagueAggregator::new(&LineupConfig::sequential()).unwrap().league_summary(&entries);
        assert_eq!(parallel, sequential);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: league rows equal the per-manager season totals, no double counting
        #[test]
        fn prop_league_matches_seasons(
            squads in prop::collection::vec(prop::collection::vec(squad_strategy(), 1..4), 1..5)
        ) {
            let entries: Vec<LeagueEntry> = squads
                .iter()
                .enumerate()
                .map(|(m, seasons)| {
                    let name = format!("M{}", m);
                    let periods: Vec<(u16, Vec<(Position, i32)>)> = seasons
                        .iter()
                        .enumerate()
                        .map(|(p, squad)| (p as u16 + 1, squad.clone()))
                        .collect();
                    entry(&name, &periods)
                })
                .collect();

            let summary = league_summary(&entries);
            let mut actual_sum = 0;
            let mut optimal_sum = 0;
            for entry in &entries {
                let season = season_summary(&entry.manager_id, &entry.periods).unwrap();
                let row = summary.standing(&entry.manager_id).unwrap();
                prop_assert_eq!(row.actual_points, season.totals.actual_points);
                prop_assert_eq!(row.optimal_points, season.totals.optimal_points);
                prop_assert_eq!(row.available_periods, season.totals.available_periods);
                actual_sum += season.totals.actual_points;
                optimal_sum += season.totals.optimal_points;
            }
            prop_assert_eq!(summary.total_actual_points, actual_sum);
            prop_assert_eq!(summary.total_optimal_points, optimal_sum);
            prop_assert_eq!(summary.standings.len(), entries.len());
        }
    }
}
