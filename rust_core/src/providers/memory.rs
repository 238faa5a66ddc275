//! In-memory league provider.
//!
//! Serves fixed data and counts calls. Used for tests and for running the
//! reporting layer without network access.

use super::{LeagueDataProvider, SourceResult};
use crate::error::SourceError;
use crate::models::{LeagueMetadata, PlayerCandidate, ScoreRecord, TeamRoster, TeamStanding};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default)]
pub struct LeagueData {
    pub metadata: Option<LeagueMetadata>,
    pub standings: Vec<TeamStanding>,
    /// week -> matchups
    pub scores: HashMap<u32, Vec<ScoreRecord>>,
    /// week -> candidates
    pub candidates: HashMap<u32, Vec<PlayerCandidate>>,
    /// (team id, week) -> roster
    pub rosters: HashMap<(u32, u32), TeamRoster>,
    pub bye_weeks: HashMap<u32, u32>,
}

#[derive(Debug, Default)]
pub struct InMemoryLeagueProvider {
    data: RwLock<LeagueData>,
    failure: RwLock<Option<SourceError>>,
    metadata_calls: AtomicUsize,
    total_calls: AtomicUsize,
}

impl InMemoryLeagueProvider {
    pub fn new(data: LeagueData) -> Self {
        Self {
            data: RwLock::new(data),
            ..Default::default()
        }
    }

    /// Make every subsequent call fail with `err` (or succeed again with `None`).
    pub fn set_failure(&self, err: Option<SourceError>) {
        *self.failure.write() = err;
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> SourceResult<()> {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.read().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LeagueDataProvider for InMemoryLeagueProvider {
    async fn fetch_league_metadata(&self) -> SourceResult<LeagueMetadata> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.data
            .read()
            .metadata
            .clone()
            .ok_or_else(|| SourceError::Decode("no league metadata".to_string()))
    }

    async fn fetch_standings(&self) -> SourceResult<Vec<TeamStanding>> {
        self.check()?;
        Ok(self.data.read().standings.clone())
    }

    async fn fetch_scores(&self, week: u32) -> SourceResult<Vec<ScoreRecord>> {
        self.check()?;
        Ok(self.data.read().scores.get(&week).cloned().unwrap_or_default())
    }

    async fn fetch_roster_candidates(&self, week: u32) -> SourceResult<Vec<PlayerCandidate>> {
        self.check()?;
        Ok(self
            .data
            .read()
            .candidates
            .get(&week)
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_team_roster(&self, team_id: u32, week: u32) -> SourceResult<TeamRoster> {
        self.check()?;
        Ok(self
            .data
            .read()
            .rosters
            .get(&(team_id, week))
            .cloned()
            .unwrap_or(TeamRoster {
                team_id,
                entries: Vec::new(),
            }))
    }

    async fn fetch_bye_weeks(&self) -> SourceResult<HashMap<u32, u32>> {
        self.check()?;
        Ok(self.data.read().bye_weeks.clone())
    }

    fn provider_name(&self) -> &str {
        "in_memory"
    }
}
