//! Report orchestration.
//!
//! [`ReportingFacade`] resolves the current week through the metadata cache,
//! pulls what it needs from the league provider, runs aggregation or name
//! resolution and hands plain data to the formatters. Scheduled jobs and chat
//! commands both come through here, so a report reads the same either way.

use crate::formatters::{self, ScoreLine};
use fantasy_rust_core::aggregator;
use fantasy_rust_core::clock::Clock;
use fantasy_rust_core::error::ReportError;
use fantasy_rust_core::league_config::{LeagueConfig, UNKNOWN};
use fantasy_rust_core::matching::NameResolver;
use fantasy_rust_core::metadata_cache::MetadataCache;
use fantasy_rust_core::models::{
    is_monitored_status, MatchupScore, PlayerToMonitor, PlayersToMonitorReport, RosterPlayer,
    RosterView, ScoreRecord, TeamMonitorReport, TeamRoster, WhoHasResult,
};
use fantasy_rust_core::providers::LeagueDataProvider;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Reports that run on a timer as well as on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Standings,
    Scoreboard,
    Matchups,
    PlayersToMonitor,
    FinalScores,
    CloseGames,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standings => "standings",
            Self::Scoreboard => "scoreboard",
            Self::Matchups => "matchups",
            Self::PlayersToMonitor => "players_to_monitor",
            Self::FinalScores => "final_scores",
            Self::CloseGames => "close_games",
        }
    }
}

/// Starting lineup display order by slot label. Anything else sorts last.
const STARTER_ORDER: [&str; 7] = ["QB", "RB", "WR", "TE", "FLEX", "D/ST", "K"];

fn starter_rank(slot: &str) -> usize {
    STARTER_ORDER
        .iter()
        .position(|s| *s == slot)
        .unwrap_or(STARTER_ORDER.len())
}

pub struct ReportingFacade {
    provider: Arc<dyn LeagueDataProvider>,
    cache: Arc<MetadataCache>,
    clock: Arc<dyn Clock>,
    league: Arc<LeagueConfig>,
    players: NameResolver,
    teams: NameResolver,
}

impl ReportingFacade {
    pub fn new(
        provider: Arc<dyn LeagueDataProvider>,
        cache: Arc<MetadataCache>,
        clock: Arc<dyn Clock>,
        league: Arc<LeagueConfig>,
    ) -> Self {
        Self {
            provider,
            cache,
            clock,
            league,
            players: NameResolver::players(),
            teams: NameResolver::teams(),
        }
    }

    /// Render one of the scheduled report kinds.
    pub async fn render(&self, kind: ReportKind) -> Result<String, ReportError> {
        debug!("Rendering {} report", kind.as_str());
        match kind {
            ReportKind::Standings => self.standings().await,
            ReportKind::Scoreboard => self.current_scores().await,
            ReportKind::Matchups => self.matchups().await,
            ReportKind::PlayersToMonitor => self.players_to_monitor().await,
            ReportKind::FinalScores => self.final_score_report().await,
            ReportKind::CloseGames => self.close_games().await,
        }
    }

    pub async fn current_week(&self) -> Result<u32, ReportError> {
        let provider = Arc::clone(&self.provider);
        let week = self
            .cache
            .current_week(self.clock.as_ref(), move || async move {
                provider.fetch_league_metadata().await
            })
            .await
            .map_err(|e| ReportError::fetching("current week", e))?;
        debug!("Current week: {}", week);
        Ok(week)
    }

    pub async fn standings(&self) -> Result<String, ReportError> {
        let standings = self
            .provider
            .fetch_standings()
            .await
            .map_err(|e| ReportError::fetching("standings", e))?;
        let ranked = aggregator::rank_standings(standings);
        Ok(formatters::format_standings(&ranked))
    }

    pub async fn current_scores(&self) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let scores = self.scores(week, "current scores").await?;
        Ok(formatters::format_current_scores(week, &self.score_lines(&scores)))
    }

    pub async fn matchups(&self) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let scores = self.scores(week, "current scores").await?;
        info!("Matchups: {} for week {}", scores.len(), week);
        Ok(formatters::format_matchups(week, &self.score_lines(&scores)))
    }

    pub async fn final_score_report(&self) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let scores = self.scores(week, "matchups").await?;
        let report = aggregator::aggregate(&self.named_matchups(&scores));
        Ok(formatters::format_final_score_report(&report))
    }

    pub async fn close_games(&self) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let scores = self.scores(week, "current scores").await?;
        let games = aggregator::find_close_games(&self.named_matchups(&scores));
        Ok(formatters::format_close_games(&games))
    }

    pub async fn who_has(&self, query: &str) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let candidates = self
            .provider
            .fetch_roster_candidates(week)
            .await
            .map_err(|e| ReportError::fetching("league rosters", e))?;

        let names: Vec<(String, usize)> = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.full_name.clone(), i))
            .collect();

        let result = match self.players.resolve(query, &names) {
            Some(found) => {
                let player = &candidates[*found.payload];
                debug!(
                    "who_has '{}' -> {} ({:.2})",
                    query, player.full_name, found.similarity
                );
                WhoHasResult {
                    player_name: player.full_name.clone(),
                    team_name: player
                        .owned_by_team_id
                        .map(|id| self.league.team_name(id).to_string())
                        .unwrap_or_default(),
                    team_id: player.owned_by_team_id,
                    found: true,
                    percent_owned: player.percent_owned,
                    position: self.league.position(player.position_code).to_string(),
                    pro_team: self.league.pro_team(player.pro_team_code).to_string(),
                    points: player.points_value,
                    is_projected: player.points_are_projected,
                    lineup_slot: player
                        .lineup_slot
                        .map(|slot| self.league.lineup_slot(slot))
                        .unwrap_or(UNKNOWN)
                        .to_string(),
                }
            }
            None => WhoHasResult::not_found(query),
        };

        Ok(formatters::format_who_has(query, &result))
    }

    pub async fn players_to_monitor(&self) -> Result<String, ReportError> {
        let week = self.current_week().await?;
        let candidates = self
            .provider
            .fetch_roster_candidates(week)
            .await
            .map_err(|e| ReportError::fetching("league rosters", e))?;

        // Teams keep the order in which they first appear.
        let mut report = PlayersToMonitorReport::default();
        let mut index: HashMap<u32, usize> = HashMap::new();
        for player in &candidates {
            let Some(team_id) = player.owned_by_team_id else {
                continue;
            };
            let starting = player
                .lineup_slot
                .map(|slot| self.league.is_starting_slot(slot))
                .unwrap_or(false);
            let status = player.injury_status.as_deref().unwrap_or_default();
            if !starting || !is_monitored_status(status) {
                continue;
            }

            let slot = *index.entry(team_id).or_insert_with(|| {
                report.teams.push(TeamMonitorReport {
                    team_name: self.league.team_name(team_id).to_string(),
                    players: Vec::new(),
                });
                report.teams.len() - 1
            });
            report.teams[slot].players.push(PlayerToMonitor {
                name: player.full_name.clone(),
                position: self.league.position(player.position_code).to_string(),
                injury_status: status.to_string(),
            });
        }

        Ok(formatters::format_players_to_monitor(week, &report))
    }

    pub async fn team_roster(&self, query: &str) -> Result<String, ReportError> {
        let week = self.current_week().await?;

        let candidates = self.league.team_candidates();
        let Some(found) = self.teams.resolve(query, &candidates) else {
            return Ok(formatters::format_team_not_found(query));
        };
        let team_id = *found.payload;

        let roster = self
            .provider
            .fetch_team_roster(team_id, week)
            .await
            .map_err(|e| ReportError::fetching("team roster", e))?;
        let bye_weeks = self
            .provider
            .fetch_bye_weeks()
            .await
            .map_err(|e| ReportError::fetching("pro schedule", e))?;

        let view = self.roster_view(found.name, &roster, &bye_weeks, week);
        Ok(formatters::format_team_roster(&view))
    }

    async fn scores(&self, week: u32, what: &'static str) -> Result<Vec<ScoreRecord>, ReportError> {
        self.provider
            .fetch_scores(week)
            .await
            .map_err(|e| ReportError::fetching(what, e))
    }

    fn score_lines(&self, scores: &[ScoreRecord]) -> Vec<ScoreLine> {
        scores
            .iter()
            .map(|s| ScoreLine {
                home_team: self.league.team_name(s.home_team_id).to_string(),
                away_team: self.league.team_name(s.away_team_id).to_string(),
                home_score: s.home_score,
                away_score: s.away_score,
                home_projected: s.home_projected,
                away_projected: s.away_projected,
                is_completed: s.is_completed,
            })
            .collect()
    }

    fn named_matchups(&self, scores: &[ScoreRecord]) -> Vec<MatchupScore> {
        scores
            .iter()
            .map(|s| {
                MatchupScore::new(
                    self.league.team_name(s.home_team_id),
                    self.league.team_name(s.away_team_id),
                    s.home_score,
                    s.away_score,
                )
            })
            .collect()
    }

    fn roster_view(
        &self,
        team_name: &str,
        roster: &TeamRoster,
        bye_weeks: &HashMap<u32, u32>,
        week: u32,
    ) -> RosterView {
        let (mut starters, bench): (Vec<RosterPlayer>, Vec<RosterPlayer>) = roster
            .entries
            .iter()
            .map(|entry| {
                let injured_reserve = self.league.is_injured_reserve_slot(entry.lineup_slot)
                    || entry.injury_status.as_deref() == Some("INJURY_RESERVE");
                let points_label = if injured_reserve {
                    "IR".to_string()
                } else if bye_weeks.get(&entry.pro_team_code) == Some(&week) {
                    "BYE".to_string()
                } else if let Some(points) = entry.actual_points {
                    format!("{points:.2}")
                } else {
                    "TBD".to_string()
                };

                RosterPlayer {
                    name: entry.full_name.clone(),
                    position: self.league.position(entry.position_code).to_string(),
                    points_label,
                    is_starter: self.league.is_starting_slot(entry.lineup_slot),
                    lineup_slot: self.league.lineup_slot(entry.lineup_slot).to_string(),
                    injury_status: entry.injury_status.clone(),
                }
            })
            .partition(|p| p.is_starter);

        starters.sort_by_key(|p| starter_rank(&p.lineup_slot));
        starters.extend(bench);

        RosterView {
            team_name: team_name.to_string(),
            players: starters,
        }
    }
}
