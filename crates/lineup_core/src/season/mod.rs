//! PeriodAggregator: 선언 라인업 vs 최적 라인업 비교 (라운드별 / 시즌 전체)
//!
//! Actual points always mean the declared starters only, never the whole squad.

use crate::cancel::CancellationToken;
use crate::config::{FormationRules, LineupConfig, ParallelConfig};
use crate::error::{DeclaredLineupIssue, LineupError, Result, Shortfall};
use crate::models::{
    Formation, ManagerId, Period, PlayerId, Position, RosterSnapshot, GOALKEEPERS,
};
use crate::optimizer::LineupOptimizer;
use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};


/// `gain / actual * 100`, or 0 when there is nothing to divide by.
pub fn gain_pct(gain: i64, actual: i64) -> f64 {
    if actual > 0 {
        gain as f64 / actual as f64 * 100.0
    } else {
        0.0
    }
}

/// One period of a manager's season: the squad and the ids they declared as starters.
#[derive(Debug, Clone)]
pub struct PeriodInput {
    pub roster: RosterSnapshot,
    pub declared: BTreeSet<PlayerId>,
}

impl PeriodInput {
    pub fn new(roster: RosterSnapshot, declared: BTreeSet<PlayerId>) -> Self {
        Self { roster, declared }
    }

    /// Declared starters taken from squad slots 1-11.
    pub fn from_squad_slots(roster: RosterSnapshot) -> Self {
        let declared = roster.declared_starters();
        Self { roster, declared }
    }

    pub fn period(&self) -> Period {
        self.roster.period()
    }

    /// One input from several for the same (manager, period): rosters are rebuilt together,
    /// so a player listed twice is deduplicated, and the declared sets are joined.
    fn merge(manager_id: &ManagerId, period: Period, inputs: &[&PeriodInput]) -> Self {
        let records = inputs.iter().flat_map(|input| input.roster.players().iter().cloned());
        let build = RosterSnapshot::build(manager_id.clone(), period, records);
        let declared = inputs.iter().flat_map(|input| input.declared.iter().copied()).collect();
        Self { roster: build.snapshot, declared }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnavailableReason {
    EmptyRoster,
    InsufficientRoster { shortfalls: Vec<Shortfall> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PeriodStatus {
    Computed,
    /// Skipped: every numeric field of the summary is zero and must not be read as a score.
    Unavailable { reason: UnavailableReason },
}

/// Declared vs optimal for one manager in one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PeriodSummary {
    pub period: Period,
    pub status: PeriodStatus,
    pub actual_points: i64,
    pub optimal_points: i64,
    pub gain: i64,
    pub gain_pct: f64,
    pub declared_lineup_invalid: bool,
    #[serde(default)]
    pub declared_issues: Vec<DeclaredLineupIssue>,
    pub optimal_formation: Option<Formation>,
    /// Optimal starters the manager left out.
    #[serde(default)]
    pub brought_in: Vec<PlayerId>,
    /// Declared starters the optimum leaves out.
    #[serde(default)]
    pub benched: Vec<PlayerId>,
}

impl PeriodSummary {
    pub fn is_computed(&self) -> bool {
        self.status == PeriodStatus::Computed
    }

    fn unavailable(period: Period, reason: UnavailableReason) -> Self {
        Self {
            period,
            status: PeriodStatus::Unavailable { reason },
            actual_points: 0,
            optimal_points: 0,
            gain: 0,
            gain_pct: 0.0,
            declared_lineup_invalid: false,
            declared_issues: Vec::new(),
            optimal_formation: None,
            brought_in: Vec::new(),
            benched: Vec::new(),
        }
    }
}

/// Totals over the available periods of a season. Unavailable periods count toward neither sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonTotals {
    pub actual_points: i64,
    pub optimal_points: i64,
    pub gain: i64,
    pub gain_pct: f64,
    pub available_periods: usize,
    pub unavailable_periods: usize,
    pub invalid_declared_periods: usize,
    /// Mean of the per-period gain percentages.
    pub mean_period_gain_pct: f64,
}

impl SeasonTotals {
    pub fn from_periods(periods: &[PeriodSummary]) -> Self {
        let mut totals = SeasonTotals::default();
        let mut pct_sum = 0.0;

        for summary in periods {
            if !summary.is_computed() {
                totals.unavailable_periods += 1;
                continue;
            }
            totals.available_periods += 1;
            totals.actual_points += summary.actual_points;
            totals.optimal_points += summary.optimal_points;
            pct_sum += summary.gain_pct;
            if summary.declared_lineup_invalid {
                totals.invalid_declared_periods += 1;
            }
        }

        totals.gain = totals.optimal_points - totals.actual_points;
        totals.gain_pct = gain_pct(totals.gain, totals.actual_points);
        if totals.available_periods > 0 {
            totals.mean_period_gain_pct = pct_sum / totals.available_periods as f64;
        }
        totals
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeasonSummary {
    pub manager_id: ManagerId,
    /// Ascending period order, one entry per period.
    pub periods: Vec<PeriodSummary>,
    pub totals: SeasonTotals,
    /// Periods that arrived as more than one input and were merged before scoring.
    #[serde(default)]
    pub merged_periods: Vec<Period>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodAggregator {
    optimizer: LineupOptimizer,
    parallel: ParallelConfig,
}

impl PeriodAggregator {
    pub fn new(config: &LineupConfig) -> Result<Self> {
        Ok(Self { optimizer: LineupOptimizer::new(config.rules)?, parallel: config.parallel })
    }

    pub fn rules(&self) -> &FormationRules {
        self.optimizer.rules()
    }

    /// Compares the declared starters against the optimum. Fails only when the optimizer
    /// does; an illegal declared lineup is flagged on the summary instead.
    pub fn period_summary(
        &self,
        roster: &RosterSnapshot,
        declared: &BTreeSet<PlayerId>,
    ) -> Result<PeriodSummary> {
        let optimal = self.optimizer.optimal_lineup(roster)?;

        let actual_points: i64 = roster
            .players()
            .iter()
            .filter(|p| declared.contains(&p.id))
            .map(|p| i64::from(p.points))
            .sum();

        let declared_issues = check_declared(roster, declared, self.rules());
        if !declared_issues.is_empty() {
            let reasons: Vec<String> = declared_issues.iter().map(ToString::to_string).collect();
            warn!(
                "Invalid declared lineup for {}/{}: {}",
                roster.manager_id(),
                roster.period(),
                reasons.join("; ")
            );
        }

        let optimal_set = optimal.starter_set();
        let brought_in = optimal.starters.iter().copied().filter(|id| !declared.contains(id)).collect();
        let benched = declared.iter().copied().filter(|id| !optimal_set.contains(id)).collect();

        let gain = optimal.total_points - actual_points;
        Ok(PeriodSummary {
            period: roster.period(),
            status: PeriodStatus::Computed,
            actual_points,
            optimal_points: optimal.total_points,
            gain,
            gain_pct: gain_pct(gain, actual_points),
            declared_lineup_invalid: !declared_issues.is_empty(),
            declared_issues,
            optimal_formation: Some(optimal.formation),
            brought_in,
            benched,
        })
    }

    pub fn season_summary(
        &self,
        manager_id: &ManagerId,
        periods: &[PeriodInput],
    ) -> Result<SeasonSummary> {
        self.season_summary_cancellable(manager_id, periods, &CancellationToken::new())
    }

    /// Periods are evaluated in any order (in parallel for long seasons) and reported in
    /// ascending period order. Period-local failures become `Unavailable` entries.
    pub fn season_summary_cancellable(
        &self,
        manager_id: &ManagerId,
        periods: &[PeriodInput],
        token: &CancellationToken,
    ) -> Result<SeasonSummary> {
        self.season_summary_observed(manager_id, periods, token, &|_: &PeriodSummary| {})
    }

    /// Like [`season_summary_cancellable`](Self::season_summary_cancellable), calling
    /// `on_period` with each summary as soon as it is computed (completion order).
    pub fn season_summary_observed(
        &self,
        manager_id: &ManagerId,
        periods: &[PeriodInput],
        token: &CancellationToken,
        on_period: &(dyn Fn(&PeriodSummary) + Sync),
    ) -> Result<SeasonSummary> {
        if let Some(foreign) = periods.iter().find(|p| p.roster.manager_id() != manager_id) {
            return Err(LineupError::ManagerMismatch {
                expected: manager_id.clone(),
                found: foreign.roster.manager_id().clone(),
                period: foreign.period(),
            });
        }

        let (ordered, merged_periods) = merge_repeated_periods(manager_id, periods);

        let evaluate = |input: &Cow<'_, PeriodInput>| -> Result<PeriodSummary> {
            token.check()?;
            let summary = self.evaluate_period(input)?;
            on_period(&summary);
            Ok(summary)
        };

        let summaries: Vec<PeriodSummary> = if self.parallel.parallel_periods(ordered.len()) {
            ordered.par_iter().map(evaluate).collect::<Result<_>>()?
        } else {
            ordered.iter().map(evaluate).collect::<Result<_>>()?
        };

        let totals = SeasonTotals::from_periods(&summaries);
        debug!(
            "Season for {}: {} periods ({} unavailable), {} actual vs {} optimal",
            manager_id,
            summaries.len(),
            totals.unavailable_periods,
            totals.actual_points,
            totals.optimal_points
        );

        Ok(SeasonSummary {
            manager_id: manager_id.clone(),
            periods: summaries,
            totals,
            merged_periods,
        })
    }

    fn evaluate_period(&self, input: &PeriodInput) -> Result<PeriodSummary> {
        match self.period_summary(&input.roster, &input.declared) {
            Ok(summary) => Ok(summary),
            Err(err) if err.is_period_local() => {
                warn!("Skipping period {} for {}: {}", input.period(), input.roster.manager_id(), err);
                let reason = match err {
                    LineupError::InsufficientRoster { shortfalls, .. } => {
                        UnavailableReason::InsufficientRoster { shortfalls }
                    }
                    _ => UnavailableReason::EmptyRoster,
                };
                Ok(PeriodSummary::unavailable(input.period(), reason))
            }
            Err(err) => Err(err),
        }
    }
}

/// Inputs in ascending period order with at most one per period, plus the periods that had
/// to be merged.
fn merge_repeated_periods<'a>(
    manager_id: &ManagerId,
    periods: &'a [PeriodInput],
) -> (Vec<Cow<'a, PeriodInput>>, Vec<Period>) {
    let mut by_period: BTreeMap<Period, Vec<&PeriodInput>> = BTreeMap::new();
    for input in periods {
        by_period.entry(input.period()).or_default().push(input);
    }

    let mut merged = Vec::new();
    let mut inputs = Vec::with_capacity(by_period.len());
    for (period, group) in by_period {
        match group.as_slice() {
            [single] => inputs.push(Cow::Borrowed(*single)),
            _ => {
                warn!("Merging {} inputs for {} period {}", group.len(), manager_id, period);
                merged.push(period);
                inputs.push(Cow::Owned(PeriodInput::merge(manager_id, period, &group)));
            }
        }
    }
    (inputs, merged)
}

/// Every reason the declared starters are not a legal lineup under `rules`.
pub fn check_declared(
    roster: &RosterSnapshot,
    declared: &BTreeSet<PlayerId>,
    rules: &FormationRules,
) -> Vec<DeclaredLineupIssue> {
    let mut issues = Vec::new();

    let expected = rules.starters as usize;
    if declared.len() != expected {
        issues.push(DeclaredLineupIssue::WrongStarterCount { found: declared.len(), expected });
    }

    let mut counts = [0usize; 4];
    for &player_id in declared {
        match roster.get(player_id) {
            Some(player) => counts[player.position.index()] += 1,
            None => issues.push(DeclaredLineupIssue::UnknownPlayer { player_id }),
        }
    }

    let keepers = counts[Position::Goalkeeper.index()];
    if keepers != GOALKEEPERS as usize {
        issues.push(DeclaredLineupIssue::GoalkeeperCount {
            found: keepers,
            expected: GOALKEEPERS as usize,
        });
    }

    if issues.is_empty() {
        let clamp = |position: Position| counts[position.index()].min(u8::MAX as usize) as u8;
        let formation = Formation::new(
            clamp(Position::Defender),
            clamp(Position::Midfielder),
            clamp(Position::Forward),
        );
        if !rules.is_legal(formation) {
            issues.push(DeclaredLineupIssue::IllegalShape { formation });
        }
    }

    issues
}

/// [`PeriodAggregator::period_summary`] under the standard configuration.
pub fn period_summary(
    roster: &RosterSnapshot,
    declared: &BTreeSet<PlayerId>,
) -> Result<PeriodSummary> {
    PeriodAggregator::default().period_summary(roster, declared)
}

/// [`PeriodAggregator::season_summary`] under the standard configuration.
pub fn season_summary(manager_id: &ManagerId, periods: &[PeriodInput]) -> Result<SeasonSummary> {
    PeriodAggregator::default().season_summary(manager_id, periods)
}
