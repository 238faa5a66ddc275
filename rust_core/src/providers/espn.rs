//! ESPN League Provider
//!
//! Implements the LeagueDataProvider trait over the ESPN fantasy API.
//! Wire responses are converted into the shared models by the pure
//! functions below.

use super::{LeagueDataProvider, SourceResult};
use crate::clients::espn::{
    EspnFantasyClient, LeagueResponse, PlayerPoolEntry, ProScheduleResponse, RosterSlotEntry,
    TeamScore,
};
use crate::models::{
    round2, LeagueMetadata, PlayerCandidate, RosterEntry, ScoreRecord, TeamRoster, TeamStanding,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tracing::debug;

/// Winner value ESPN reports for matchups still in progress.
const UNDECIDED: &str = "UNDECIDED";

const STAT_SOURCE_ACTUAL: u32 = 0;
const STAT_SOURCE_PROJECTED: u32 = 1;

pub struct EspnLeagueProvider {
    client: EspnFantasyClient,
}

impl EspnLeagueProvider {
    pub fn new(client: EspnFantasyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LeagueDataProvider for EspnLeagueProvider {
    async fn fetch_league_metadata(&self) -> SourceResult<LeagueMetadata> {
        let resp = self.client.league_settings().await?;
        Ok(league_metadata(&resp))
    }

    async fn fetch_standings(&self) -> SourceResult<Vec<TeamStanding>> {
        let resp = self.client.league_teams().await?;
        Ok(standings(&resp))
    }

    async fn fetch_scores(&self, week: u32) -> SourceResult<Vec<ScoreRecord>> {
        let resp = self.client.scoreboard(week).await?;
        let records = score_records(&resp);
        debug!("ESPN: {} matchups for week {}", records.len(), week);
        Ok(records)
    }

    async fn fetch_roster_candidates(&self, week: u32) -> SourceResult<Vec<PlayerCandidate>> {
        let resp = self.client.rosters(week).await?;
        Ok(roster_candidates(&resp, week))
    }

    async fn fetch_team_roster(&self, team_id: u32, week: u32) -> SourceResult<TeamRoster> {
        let resp = self.client.rosters(week).await?;
        Ok(team_roster(&resp, team_id, week))
    }

    async fn fetch_bye_weeks(&self) -> SourceResult<HashMap<u32, u32>> {
        let resp = self.client.pro_schedule().await?;
        Ok(bye_weeks(&resp))
    }

    fn provider_name(&self) -> &str {
        "espn"
    }
}

// ============================================================================
// Conversions
// ============================================================================

pub fn league_metadata(resp: &LeagueResponse) -> LeagueMetadata {
    LeagueMetadata {
        league_id: resp.id,
        name: resp.settings.name.clone(),
        current_week: resp.status.current_matchup_period,
        current_scoring_period: resp.scoring_period_id,
        season_id: resp.season_id,
        first_week: resp.status.first_scoring_period,
        last_week: resp.status.final_scoring_period,
        is_active: resp.status.is_active,
        last_updated: Utc::now(),
    }
}

pub fn standings(resp: &LeagueResponse) -> Vec<TeamStanding> {
    resp.teams
        .iter()
        .map(|team| {
            let overall = &team.record.overall;
            TeamStanding {
                rank: 0,
                team_id: team.id,
                name: team.name.clone(),
                abbreviation: team.abbreviation.clone(),
                wins: overall.wins,
                losses: overall.losses,
                ties: overall.ties,
                points_for: overall.points_for,
                points_against: overall.points_against,
                win_percentage: overall.percentage,
                playoff_seed: team.playoff_seed,
            }
        })
        .collect()
}

/// (current, projected), rounded. The live total wins unless it is zero.
fn score_and_projected(score: &TeamScore) -> (f64, f64) {
    let current = if score.total_points_live != 0.0 {
        score.total_points_live
    } else {
        score.total_points
    };
    (round2(current), round2(score.total_projected_points_live))
}

pub fn score_records(resp: &LeagueResponse) -> Vec<ScoreRecord> {
    resp.schedule
        .iter()
        .map(|entry| {
            let (home_score, home_projected) = score_and_projected(&entry.home);
            let (away_score, away_projected) = score_and_projected(&entry.away);
            ScoreRecord {
                match_id: entry.id,
                home_team_id: entry.home.team_id,
                away_team_id: entry.away.team_id,
                home_score,
                away_score,
                home_projected,
                away_projected,
                is_completed: entry.winner != UNDECIDED,
            }
        })
        .collect()
}

/// Points for `week` and whether they are a projection.
pub fn player_points(entry: &PlayerPoolEntry, week: u32) -> (f64, bool) {
    for stat in entry
        .player
        .stats
        .iter()
        .filter(|s| s.scoring_period_id == week)
    {
        match stat.stat_source_id {
            STAT_SOURCE_ACTUAL => return (stat.applied_total, false),
            STAT_SOURCE_PROJECTED => return (stat.applied_total, true),
            _ => {}
        }
    }
    (entry.applied_stat_total, true)
}

fn actual_points(entry: &PlayerPoolEntry, week: u32) -> Option<f64> {
    entry
        .player
        .stats
        .iter()
        .find(|s| s.scoring_period_id == week && s.stat_source_id == STAT_SOURCE_ACTUAL)
        .map(|s| s.applied_total)
}

fn candidate(slot: &RosterSlotEntry, week: u32) -> PlayerCandidate {
    let pool = &slot.player_pool_entry;
    let (points_value, points_are_projected) = player_points(pool, week);
    PlayerCandidate {
        id: pool.id,
        full_name: pool.player.full_name.clone(),
        owned_by_team_id: (pool.on_team_id != 0).then_some(pool.on_team_id),
        position_code: pool.player.default_position_id,
        pro_team_code: pool.player.pro_team_id,
        percent_owned: pool.player.ownership.percent_owned,
        lineup_slot: Some(slot.lineup_slot_id),
        points_value,
        points_are_projected,
        injury_status: pool.player.injury_status.clone(),
    }
}

/// Every rostered player, teams in source order.
pub fn roster_candidates(resp: &LeagueResponse, week: u32) -> Vec<PlayerCandidate> {
    resp.teams
        .iter()
        .flat_map(|team| team.roster.entries.iter())
        .map(|slot| candidate(slot, week))
        .collect()
}

pub fn team_roster(resp: &LeagueResponse, team_id: u32, week: u32) -> TeamRoster {
    let entries = resp
        .teams
        .iter()
        .find(|team| team.id == team_id)
        .map(|team| {
            team.roster
                .entries
                .iter()
                .map(|slot| {
                    let pool = &slot.player_pool_entry;
                    RosterEntry {
                        player_id: pool.id,
                        full_name: pool.player.full_name.clone(),
                        position_code: pool.player.default_position_id,
                        pro_team_code: pool.player.pro_team_id,
                        lineup_slot: slot.lineup_slot_id,
                        injury_status: pool.player.injury_status.clone(),
                        actual_points: actual_points(pool, week),
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    TeamRoster { team_id, entries }
}

pub fn bye_weeks(resp: &ProScheduleResponse) -> HashMap<u32, u32> {
    resp.settings
        .pro_teams
        .iter()
        .filter(|team| team.bye_week > 0)
        .map(|team| (team.id, team.bye_week))
        .collect()
}
