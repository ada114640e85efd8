pub mod lineup_json;

pub use lineup_json::{
    league_summary_from_records_json, league_summary_json, optimal_lineup_json,
    response_schemas_json, season_summary_json, LeagueRecordsRequest, LeagueSummaryRequest,
    LeagueSummaryResponse, ManagerSeasonRequest, OptimalLineupRequest, OptimalLineupResponse,
    PeriodRequest, SeasonSummaryRequest, SeasonSummaryResponse,
};
