// Shared models for the fantasy reporting services
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// League Metadata
// ============================================================================

/// Slow-changing league state. Owned by the metadata cache and handed out as
/// a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueMetadata {
    pub league_id: u64,
    pub name: String,
    pub current_week: u32,
    pub current_scoring_period: u32,
    pub season_id: u32,
    pub first_week: u32,
    pub last_week: u32,
    pub is_active: bool,
    pub last_updated: DateTime<Utc>,
}

// ============================================================================
// Standings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStanding {
    /// 1-based position after ranking. Sources leave this at 0.
    pub rank: u32,
    pub team_id: u32,
    pub name: String,
    pub abbreviation: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub points_for: f64,
    pub points_against: f64,
    pub win_percentage: f64,
    pub playoff_seed: u32,
}

// ============================================================================
// Scores
// ============================================================================

/// One matchup for a scoring week, as reported by the data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub match_id: u64,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home_score: f64,
    pub away_score: f64,
    pub home_projected: f64,
    pub away_projected: f64,
    pub is_completed: bool,
}

/// A score record with team ids replaced by display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupScore {
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
}

impl MatchupScore {
    pub fn new(home_team: &str, away_team: &str, home_score: f64, away_score: f64) -> Self {
        Self {
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            home_score,
            away_score,
        }
    }

    pub fn total(&self) -> f64 {
        self.home_score + self.away_score
    }

    /// Absolute score difference, at the 2-decimal precision scores carry.
    pub fn margin(&self) -> f64 {
        round2((self.home_score - self.away_score).abs())
    }

    /// Winner of the matchup. An exact tie goes to the home side.
    pub fn winner(&self) -> &str {
        if self.home_score >= self.away_score {
            &self.home_team
        } else {
            &self.away_team
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrophyCategory {
    HighScore,
    LowScore,
    BiggestWin,
    ClosestWin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trophy {
    pub category: TrophyCategory,
    pub team_name: String,
    pub value: f64,
}

/// Weekly results: matchups ordered by combined score plus the four trophies.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FinalScoreReport {
    pub matchups: Vec<MatchupScore>,
    pub trophies: Vec<Trophy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseGame {
    pub home_team: String,
    pub away_team: String,
    pub home_score: f64,
    pub away_score: f64,
    pub margin: f64,
}

// ============================================================================
// Players & Rosters
// ============================================================================

/// A rostered (or free-agent) player as seen by the who-has lookup. Built per
/// lookup and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCandidate {
    pub id: u64,
    pub full_name: String,
    /// `None` for free agents.
    pub owned_by_team_id: Option<u32>,
    pub position_code: u32,
    pub pro_team_code: u32,
    pub percent_owned: f64,
    pub lineup_slot: Option<u32>,
    pub points_value: f64,
    pub points_are_projected: bool,
    #[serde(default)]
    pub injury_status: Option<String>,
}

/// One player on a fantasy team's roster for a given week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player_id: u64,
    pub full_name: String,
    pub position_code: u32,
    pub pro_team_code: u32,
    pub lineup_slot: u32,
    pub injury_status: Option<String>,
    /// Points from an actual (not projected) stat line for the week, if any.
    pub actual_points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamRoster {
    pub team_id: u32,
    pub entries: Vec<RosterEntry>,
}

// ============================================================================
// Report views (plain data consumed by the formatters)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WhoHasResult {
    pub player_name: String,
    pub team_name: String,
    pub team_id: Option<u32>,
    pub found: bool,
    pub percent_owned: f64,
    pub position: String,
    pub pro_team: String,
    pub points: f64,
    pub is_projected: bool,
    pub lineup_slot: String,
}

impl WhoHasResult {
    pub fn not_found(query: &str) -> Self {
        Self {
            player_name: query.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerToMonitor {
    pub name: String,
    pub position: String,
    pub injury_status: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMonitorReport {
    pub team_name: String,
    pub players: Vec<PlayerToMonitor>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayersToMonitorReport {
    pub teams: Vec<TeamMonitorReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterPlayer {
    pub name: String,
    pub position: String,
    /// "IR", "BYE", "TBD" or the actual points with two decimals.
    pub points_label: String,
    pub is_starter: bool,
    pub lineup_slot: String,
    pub injury_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterView {
    pub team_name: String,
    /// Starters first (in lineup order), then bench.
    pub players: Vec<RosterPlayer>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Round to two decimal places, as scores are stored at ingestion.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Injury statuses that put a starter on the watch list.
pub fn is_monitored_status(status: &str) -> bool {
    matches!(status, "QUESTIONABLE" | "DOUBTFUL" | "OUT")
}
