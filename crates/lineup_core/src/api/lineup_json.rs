// 라인업 분석 JSON API
//
// Strings in, strings out. Every request carries `schema_version`; records are the flat rows of
// the roster export and are grouped/deduplicated here before anything is scored.
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LineupConfig;
use crate::error::{LineupError, Result, RosterIssue};
use crate::ingest::group_records;
use crate::league::{LeagueAggregator, LeagueEntry, LeagueSummary};
use crate::models::{ManagerId, OptimalResult, Period, PlayerId, PlayerRecord, RosterSnapshot};
use crate::optimizer::LineupOptimizer;
use crate::season::{PeriodAggregator, PeriodInput, SeasonSummary};
use crate::SCHEMA_VERSION;

/// 최적 라인업 요청 - 한 매니저, 한 라운드
#[derive(Debug, Deserialize)]
pub struct OptimalLineupRequest {
    pub schema_version: u8,
    pub manager_id: ManagerId,
    pub period: Period,
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub config: Option<LineupConfig>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct OptimalLineupResponse {
    pub schema_version: u8,
    pub result: OptimalResult,
    pub roster_issues: Vec<RosterIssue>,
}

/// One period of a season request. Without `declared`, squad slots 1-11 are the starters.
#[derive(Debug, Deserialize)]
pub struct PeriodRequest {
    pub period: Period,
    pub players: Vec<PlayerRecord>,
    #[serde(default)]
    pub declared: Option<Vec<PlayerId>>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonSummaryRequest {
    pub schema_version: u8,
    pub manager_id: ManagerId,
    pub periods: Vec<PeriodRequest>,
    #[serde(default)]
    pub config: Option<LineupConfig>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct SeasonSummaryResponse {
    pub schema_version: u8,
    pub season: SeasonSummary,
    pub roster_issues: Vec<RosterIssue>,
}

#[derive(Debug, Deserialize)]
pub struct ManagerSeasonRequest {
    pub manager_id: ManagerId,
    pub periods: Vec<PeriodRequest>,
}

#[derive(Debug, Deserialize)]
pub struct LeagueSummaryRequest {
    pub schema_version: u8,
    pub managers: Vec<ManagerSeasonRequest>,
    #[serde(default)]
    pub config: Option<LineupConfig>,
}

/// 리그 요청 - 매니저/라운드 구분 없는 선수 레코드 덤프
#[derive(Debug, Deserialize)]
pub struct LeagueRecordsRequest {
    pub schema_version: u8,
    pub records: Vec<PlayerRecord>,
    #[serde(default)]
    pub config: Option<LineupConfig>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LeagueSummaryResponse {
    pub schema_version: u8,
    pub league: LeagueSummary,
    pub roster_issues: Vec<RosterIssue>,
}

fn check_schema_version(found: u8) -> Result<()> {
    if found != SCHEMA_VERSION {
        return Err(LineupError::SchemaVersion { found, expected: SCHEMA_VERSION });
    }
    Ok(())
}

fn period_inputs(
    manager_id: &ManagerId,
    periods: Vec<PeriodRequest>,
    issues: &mut Vec<RosterIssue>,
) -> Vec<PeriodInput> {
    periods
        .into_iter()
        .map(|request| {
            let build = RosterSnapshot::build(manager_id.clone(), request.period, request.players);
            issues.extend(build.issues);
            match request.declared {
                Some(declared) => PeriodInput::new(build.snapshot, declared.into_iter().collect()),
                None => PeriodInput::from_squad_slots(build.snapshot),
            }
        })
        .collect()
}

/// Best legal eleven for one roster.
pub fn optimal_lineup_json(request_json: &str) -> Result<String> {
    let request: OptimalLineupRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;

    let config = request.config.unwrap_or_default();
    let optimizer = LineupOptimizer::new(config.rules)?;
    let build = RosterSnapshot::build(request.manager_id, request.period, request.players);
    let result = optimizer.optimal_lineup(&build.snapshot)?;

    let response = OptimalLineupResponse {
        schema_version: SCHEMA_VERSION,
        result,
        roster_issues: build.issues,
    };
    Ok(serde_json::to_string(&response)?)
}

pub fn season_summary_json(request_json: &str) -> Result<String> {
    let request: SeasonSummaryRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;

    let aggregator = PeriodAggregator::new(&request.config.unwrap_or_default())?;
    let mut roster_issues = Vec::new();
    let periods = period_inputs(&request.manager_id, request.periods, &mut roster_issues);
    let season = aggregator.season_summary(&request.manager_id, &periods)?;

    let response = SeasonSummaryResponse { schema_version: SCHEMA_VERSION, season, roster_issues };
    Ok(serde_json::to_string(&response)?)
}

pub fn league_summary_json(request_json: &str) -> Result<String> {
    let request: LeagueSummaryRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;

    let aggregator = LeagueAggregator::new(&request.config.unwrap_or_default())?;
    let mut roster_issues = Vec::new();
    let entries: Vec<LeagueEntry> = request
        .managers
        .into_iter()
        .map(|manager| {
            let periods = period_inputs(&manager.manager_id, manager.periods, &mut roster_issues);
            LeagueEntry::new(manager.manager_id, periods)
        })
        .collect();

    league_response(&aggregator, &entries, roster_issues)
}

/// League table straight from a flat record dump; declared starters are squad slots 1-11.
pub fn league_summary_from_records_json(request_json: &str) -> Result<String> {
    let request: LeagueRecordsRequest = serde_json::from_str(request_json)?;
    check_schema_version(request.schema_version)?;

    let aggregator = LeagueAggregator::new(&request.config.unwrap_or_default())?;
    let grouping = group_records(request.records);
    debug!(
        "Grouped records into {} managers ({} roster issues)",
        grouping.entries.len(),
        grouping.issues.len()
    );

    league_response(&aggregator, &grouping.entries, grouping.issues)
}

fn league_response(
    aggregator: &LeagueAggregator,
    entries: &[LeagueEntry],
    roster_issues: Vec<RosterIssue>,
) -> Result<String> {
    let response = LeagueSummaryResponse {
        schema_version: SCHEMA_VERSION,
        league: aggregator.league_summary(entries),
        roster_issues,
    };
    Ok(serde_json::to_string(&response)?)
}

/// JSON schemas of the three response types, keyed by operation.
pub fn response_schemas_json() -> Result<String> {
    let schemas = serde_json::json!({
        "optimal_lineup": schemars::schema_for!(OptimalLineupResponse),
        "season_summary": schemars::schema_for!(SeasonSummaryResponse),
        "league_summary": schemars::schema_for!(LeagueSummaryResponse),
    });
    Ok(serde_json::to_string_pretty(&schemas)?)
}
