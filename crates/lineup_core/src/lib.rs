//! # lineup_core - Fantasy Football Lineup Optimizer
//!
//! Computes the highest-scoring legal starting eleven for a manager's squad in one scoring
//! period, and compares it against the lineup the manager actually declared.
//!
//! ## Features
//! - Exhaustive search over every legal formation (deterministic tie-breaks)
//! - Declared vs optimal comparison per period, per season and across a league
//! - Parallel league sweeps on the rayon pool, cancellable between managers and periods
//! - JSON API with a versioned request/response schema

pub mod api;
pub mod cancel;
pub mod config;
pub mod error;
pub mod ingest;
pub mod league;
pub mod models;
pub mod optimizer;
pub mod season;

// Re-export main API functions
pub use api::{
    league_summary_from_records_json, league_summary_json, optimal_lineup_json,
    response_schemas_json, season_summary_json,
};
pub use error::{
    ConfigError, DeclaredLineupIssue, LineupError, Requirement, Result, RosterIssue, Shortfall,
};

pub use cancel::CancellationToken;
pub use config::{FormationRules, LineupConfig, ParallelConfig, PositionRange};
pub use ingest::{group_records, RecordGrouping};
pub use league::{league_summary, LeagueAggregator, LeagueEntry, LeagueSummary, ManagerStanding};
pub use models::{
    Formation, ManagerId, OptimalResult, Period, PlayerId, PlayerRecord, Position,
    PositionPoints, RosterSnapshot,
};
pub use optimizer::{optimal_lineup, LineupOptimizer};
pub use season::{
    period_summary, season_summary, PeriodAggregator, PeriodInput, PeriodStatus, PeriodSummary,
    SeasonSummary, SeasonTotals, UnavailableReason,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::proptest_gen::*;

    #[test]
    fn test_record_dump_to_league_table() {
        let mut records = records_for("Magic FC", 1, &flat_squad(4));
        records.extend(records_for("Magic FC", 2, &flat_squad(1)));
        records.extend(records_for(TEST_MANAGER, 1, &flat_squad(2)));

        let grouping = group_records(records);
        let league = league_summary(&grouping.entries);

        assert_eq!(league.standings[0].manager_id, ManagerId::new("Magic FC"));
        assert_eq!(league.standings[0].actual_points, 55);
        assert_eq!(league.standings[1].actual_points, 22);
        assert_eq!(league.total_gain, 0);
    }

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert_eq!(SCHEMA_VERSION, 1);
    }
}
