//! League data provider abstractions
//!
//! Defines the LeagueDataProvider trait that the reporting layer reads from.
//! Every call may fail with a transport or decode error; callers never retry.

use crate::error::SourceError;
use crate::models::{LeagueMetadata, PlayerCandidate, ScoreRecord, TeamRoster, TeamStanding};
use async_trait::async_trait;
use std::collections::HashMap;

// Concrete provider implementations
pub mod espn;
pub mod memory;

pub use espn::EspnLeagueProvider;
pub use memory::InMemoryLeagueProvider;

pub type SourceResult<T> = Result<T, SourceError>;

/// Read-only view of one fantasy league.
#[async_trait]
pub trait LeagueDataProvider: Send + Sync {
    /// League settings and the current matchup period.
    async fn fetch_league_metadata(&self) -> SourceResult<LeagueMetadata>;

    /// Team records in source order. `rank` is left at 0.
    async fn fetch_standings(&self) -> SourceResult<Vec<TeamStanding>>;

    /// All matchups for a week, scores rounded to two decimals.
    async fn fetch_scores(&self, week: u32) -> SourceResult<Vec<ScoreRecord>>;

    /// Every player on every fantasy roster for the week.
    async fn fetch_roster_candidates(&self, week: u32) -> SourceResult<Vec<PlayerCandidate>>;

    /// One fantasy team's roster for the week. An unknown team yields an
    /// empty roster.
    async fn fetch_team_roster(&self, team_id: u32, week: u32) -> SourceResult<TeamRoster>;

    /// Pro team id -> bye week.
    async fn fetch_bye_weeks(&self) -> SourceResult<HashMap<u32, u32>>;

    /// Provider name for logging and debugging
    fn provider_name(&self) -> &str;
}
