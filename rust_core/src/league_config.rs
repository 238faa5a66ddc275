//! League lookup tables.
//!
//! This module provides:
//! - Team id -> display name for the configured league
//! - Position, pro team and lineup slot code tables
//! - JSON loading so a new league or season needs no rebuild
//!
//! The tables are plain data injected into the data source and the reporting
//! facade at construction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Label used for any code that is missing from a table.
pub const UNKNOWN: &str = "Unknown";

/// A lineup slot code and whether it counts toward the starting lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineupSlot {
    pub label: String,
    pub starter: bool,
}

impl LineupSlot {
    fn new(label: &str, starter: bool) -> Self {
        Self {
            label: label.to_string(),
            starter,
        }
    }
}

/// Lookup tables for one league and season.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Fantasy team id -> display name
    #[serde(default)]
    pub teams: BTreeMap<u32, String>,
    /// Default position id -> position code ("QB", "RB", ...)
    #[serde(default)]
    pub positions: BTreeMap<u32, String>,
    /// Pro team id -> abbreviation ("KC", "SF", ...)
    #[serde(default)]
    pub pro_teams: BTreeMap<u32, String>,
    /// Lineup slot id -> slot label and starter flag
    #[serde(default)]
    pub lineup_slots: BTreeMap<u32, LineupSlot>,
}

impl LeagueConfig {
    /// Standard NFL position, pro team and lineup slot codes with an empty team table.
    pub fn nfl_defaults() -> Self {
        let positions = [(1, "QB"), (2, "RB"), (3, "WR"), (4, "TE"), (5, "K"), (16, "D/ST")]
            .into_iter()
            .map(|(id, code)| (id, code.to_string()))
            .collect();

        let pro_teams = [
            (1, "ATL"),
            (2, "BUF"),
            (3, "CHI"),
            (4, "CIN"),
            (5, "CLE"),
            (6, "DAL"),
            (7, "DEN"),
            (8, "DET"),
            (9, "GB"),
            (10, "TEN"),
            (11, "IND"),
            (12, "KC"),
            (13, "LV"),
            (14, "LAR"),
            (15, "MIA"),
            (16, "MIN"),
            (17, "NE"),
            (18, "NO"),
            (19, "NYG"),
            (20, "NYJ"),
            (21, "PHI"),
            (22, "ARI"),
            (23, "PIT"),
            (24, "LAC"),
            (25, "SF"),
            (26, "SEA"),
            (27, "TB"),
            (28, "WSH"),
            (29, "CAR"),
            (30, "JAX"),
            (33, "BAL"),
            (34, "HOU"),
        ]
        .into_iter()
        .map(|(id, abbr)| (id, abbr.to_string()))
        .collect();

        let lineup_slots = [
            (0, LineupSlot::new("QB", true)),
            (2, LineupSlot::new("RB", true)),
            (4, LineupSlot::new("WR", true)),
            (6, LineupSlot::new("TE", true)),
            (16, LineupSlot::new("D/ST", true)),
            (17, LineupSlot::new("K", true)),
            (20, LineupSlot::new("Bench", false)),
            (21, LineupSlot::new("IR", false)),
            (23, LineupSlot::new("FLEX", true)),
        ]
        .into_iter()
        .collect();

        Self {
            teams: BTreeMap::new(),
            positions,
            pro_teams,
            lineup_slots,
        }
    }

    /// Load from a JSON file. Tables missing from the file fall back to the
    /// NFL defaults; the team table is taken as-is.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(path)?;
        let parsed: LeagueConfig = serde_json::from_str(&content)?;

        let mut config = Self::nfl_defaults();
        config.teams = parsed.teams;
        if !parsed.positions.is_empty() {
            config.positions = parsed.positions;
        }
        if !parsed.pro_teams.is_empty() {
            config.pro_teams = parsed.pro_teams;
        }
        if !parsed.lineup_slots.is_empty() {
            config.lineup_slots = parsed.lineup_slots;
        }
        Ok(config)
    }

    /// Builder-style team table replacement.
    pub fn with_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        self.teams = teams.into_iter().map(|(id, name)| (id, name.into())).collect();
        self
    }

    pub fn team_name(&self, team_id: u32) -> &str {
        self.teams.get(&team_id).map(String::as_str).unwrap_or(UNKNOWN)
    }

    pub fn position(&self, position_id: u32) -> &str {
        self.positions
            .get(&position_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn pro_team(&self, pro_team_id: u32) -> &str {
        self.pro_teams
            .get(&pro_team_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN)
    }

    pub fn lineup_slot(&self, slot_id: u32) -> &str {
        self.lineup_slots
            .get(&slot_id)
            .map(|s| s.label.as_str())
            .unwrap_or(UNKNOWN)
    }

    /// Unknown slots are treated as bench.
    pub fn is_starting_slot(&self, slot_id: u32) -> bool {
        self.lineup_slots
            .get(&slot_id)
            .map(|s| s.starter)
            .unwrap_or(false)
    }

    /// Slot id whose label is "IR", if the table has one.
    pub fn is_injured_reserve_slot(&self, slot_id: u32) -> bool {
        self.lineup_slot(slot_id) == "IR"
    }

    /// (display name, team id) pairs in team id order, for fuzzy lookup.
    pub fn team_candidates(&self) -> Vec<(String, u32)> {
        self.teams
            .iter()
            .map(|(id, name)| (name.clone(), *id))
            .collect()
    }
}
