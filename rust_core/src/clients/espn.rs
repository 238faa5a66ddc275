use crate::error::SourceError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const ESPN_FANTASY_BASE_URL: &str = "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl";

/// League coordinates and the private-league cookies.
#[derive(Debug, Clone)]
pub struct EspnCredentials {
    pub year: String,
    pub league_id: String,
    pub swid: String,
    pub espn_s2: String,
}

/// Thin HTTP client for the ESPN fantasy football v3 read API.
#[derive(Clone)]
pub struct EspnFantasyClient {
    client: Client,
    base_url: String,
    credentials: EspnCredentials,
}

impl std::fmt::Debug for EspnFantasyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EspnFantasyClient")
            .field("base_url", &self.base_url)
            .field("year", &self.credentials.year)
            .field("league_id", &self.credentials.league_id)
            .finish()
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueResponse {
    pub id: u64,
    pub scoring_period_id: u32,
    pub season_id: u32,
    pub status: LeagueStatus,
    pub teams: Vec<Team>,
    pub settings: LeagueSettings,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueSettings {
    pub name: String,
    pub size: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeagueStatus {
    pub current_matchup_period: u32,
    pub final_scoring_period: u32,
    pub first_scoring_period: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Team {
    pub id: u32,
    #[serde(rename = "abbrev")]
    pub abbreviation: String,
    pub name: String,
    pub playoff_seed: u32,
    pub roster: Roster,
    pub record: Record,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Roster {
    pub entries: Vec<RosterSlotEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Record {
    pub overall: RecordDetails,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordDetails {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub percentage: f64,
    pub points_for: f64,
    pub points_against: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleEntry {
    pub id: u64,
    pub away: TeamScore,
    pub home: TeamScore,
    pub winner: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamScore {
    pub team_id: u32,
    pub total_points: f64,
    pub total_points_live: f64,
    pub total_projected_points_live: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RosterSlotEntry {
    pub player_pool_entry: PlayerPoolEntry,
    pub lineup_slot_id: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerPoolEntry {
    pub id: u64,
    pub on_team_id: u32,
    pub player: Player,
    pub applied_stat_total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Player {
    pub id: u64,
    pub full_name: String,
    pub default_position_id: u32,
    pub pro_team_id: u32,
    pub ownership: Ownership,
    pub stats: Vec<Stat>,
    pub injury_status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ownership {
    pub percent_owned: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stat {
    pub stat_source_id: u32,
    pub scoring_period_id: u32,
    pub applied_total: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProScheduleResponse {
    pub settings: ProScheduleSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProScheduleSettings {
    pub pro_teams: Vec<ProTeamInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProTeamInfo {
    pub id: u32,
    pub abbrev: String,
    pub bye_week: u32,
    pub name: String,
}

// ============================================================================
// Client
// ============================================================================

impl EspnFantasyClient {
    pub fn new(credentials: EspnCredentials, timeout: Duration) -> Self {
        Self::with_base_url(ESPN_FANTASY_BASE_URL, credentials, timeout)
    }

    pub fn with_base_url(base_url: &str, credentials: EspnCredentials, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn league_endpoint(&self) -> String {
        format!(
            "/seasons/{}/segments/0/leagues/{}",
            self.credentials.year, self.credentials.league_id
        )
    }

    /// League settings and status (`mSettings`).
    pub async fn league_settings(&self) -> Result<LeagueResponse, SourceError> {
        self.get(&self.league_endpoint(), &[("view", "mSettings".to_string())], None)
            .await
    }

    /// Teams with their overall records (`mTeam`).
    pub async fn league_teams(&self) -> Result<LeagueResponse, SourceError> {
        self.get(&self.league_endpoint(), &[("view", "mTeam".to_string())], None)
            .await
    }

    /// Matchups for a single matchup period (`mScoreboard`).
    pub async fn scoreboard(&self, week: u32) -> Result<LeagueResponse, SourceError> {
        let filter = scoreboard_filter(week);
        self.get(
            &self.league_endpoint(),
            &[("view", "mScoreboard".to_string())],
            Some(&filter),
        )
        .await
    }

    /// All rosters with per-week player stats (`mRoster`).
    pub async fn rosters(&self, week: u32) -> Result<LeagueResponse, SourceError> {
        self.get(
            &self.league_endpoint(),
            &[
                ("view", "mRoster".to_string()),
                ("scoringPeriodId", week.to_string()),
            ],
            None,
        )
        .await
    }

    /// NFL team schedules, used for bye weeks.
    pub async fn pro_schedule(&self) -> Result<ProScheduleResponse, SourceError> {
        let endpoint = format!("/seasons/{}", self.credentials.year);
        self.get(&endpoint, &[("view", "proTeamSchedules_wl".to_string())], None)
            .await
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
        fantasy_filter: Option<&str>,
    ) -> Result<T, SourceError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("ESPN GET {} {:?}", url, params);

        let mut request = self.client.get(&url).query(params).header(
            "Cookie",
            format!(
                "SWID={}; espn_s2={}",
                self.credentials.swid, self.credentials.espn_s2
            ),
        );
        if let Some(filter) = fantasy_filter {
            request = request.header("x-fantasy-filter", filter);
        }

        let resp = request.send().await?;
        if resp.status() != StatusCode::OK {
            return Err(SourceError::Status(resp.status().as_u16()));
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

fn scoreboard_filter(week: u32) -> String {
    serde_json::json!({
        "schedule": {
            "filterMatchupPeriodIds": { "value": [week] }
        }
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoreboard_filter_shape() {
        assert_eq!(
            scoreboard_filter(7),
            r#"{"schedule":{"filterMatchupPeriodIds":{"value":[7]}}}"#
        );
    }

    #[test]
    fn test_decode_settings_response() {
        let body = r#"{
            "id": 123456,
            "scoringPeriodId": 8,
            "seasonId": 2024,
            "segmentId": 0,
            "settings": {"name": "Dynasty League", "size": 6},
            "status": {
                "currentMatchupPeriod": 7,
                "finalScoringPeriod": 17,
                "firstScoringPeriod": 1,
                "isActive": true
            }
        }"#;
        let resp: LeagueResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.id, 123456);
        assert_eq!(resp.settings.name, "Dynasty League");
        assert_eq!(resp.status.current_matchup_period, 7);
        assert!(resp.teams.is_empty());
    }

    #[test]
    fn test_decode_roster_entry_with_missing_fields() {
        let body = r#"{
            "teams": [{
                "id": 4,
                "roster": {"entries": [{
                    "lineupSlotId": 23,
                    "playerPoolEntry": {
                        "id": 3139477,
                        "onTeamId": 4,
                        "player": {
                            "fullName": "Patrick Mahomes",
                            "defaultPositionId": 1,
                            "proTeamId": 12,
                            "injuryStatus": "QUESTIONABLE",
                            "stats": [{"statSourceId": 1, "scoringPeriodId": 8, "appliedTotal": 21.4}]
                        }
                    }
                }]}
            }]
        }"#;
        let resp: LeagueResponse = serde_json::from_str(body).unwrap();
        let entry = &resp.teams[0].roster.entries[0];
        assert_eq!(entry.lineup_slot_id, 23);
        assert_eq!(entry.player_pool_entry.player.full_name, "Patrick Mahomes");
        assert_eq!(
            entry.player_pool_entry.player.injury_status.as_deref(),
            Some("QUESTIONABLE")
        );
        assert_eq!(entry.player_pool_entry.player.ownership.percent_owned, 0.0);
    }

    #[test]
    fn test_decode_pro_schedule() {
        let body = r#"{"settings": {"proTeams": [
            {"id": 12, "abbrev": "KC", "byeWeek": 6, "name": "Chiefs"},
            {"id": 0, "abbrev": "FA", "byeWeek": 0, "name": "Free Agent"}
        ]}}"#;
        let resp: ProScheduleResponse = serde_json::from_str(body).unwrap();
        assert_eq!(resp.settings.pro_teams.len(), 2);
        assert_eq!(resp.settings.pro_teams[0].bye_week, 6);
    }
}
